//! Streaming downloads and archive extraction.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use tar::Archive;

/// Size of each chunk read from the response body.
pub const CHUNK_SIZE: usize = 1_048_576;

/// Download `url` into the file at `target`.
///
/// The body is streamed in [`CHUNK_SIZE`] chunks. No checksum or length
/// verification is done, and a partially written file is left in place if
/// the transfer fails. The transfer never times out.
pub fn download_file(url: &str, target: &Path) -> Result<u64> {
    download_file_with_timeout(url, target, None)
}

/// Like [`download_file`], but give up once `timeout` elapses while
/// connecting or waiting on the body.
pub fn download_file_with_timeout(
    url: &str,
    target: &Path,
    timeout: Option<Duration>,
) -> Result<u64> {
    println!("Downloading: {}", url);

    // The blocking client defaults to a 30s timeout; `None` disables it
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")?;

    let mut response = client
        .get(url)
        .send()
        .with_context(|| format!("failed to download {}", url))?;

    if !response.status().is_success() {
        bail!("failed to download {}: HTTP {}", url, response.status());
    }

    let progress = match response.content_length() {
        Some(len) => {
            let bar = ProgressBar::new(len);
            if let Ok(style) =
                ProgressStyle::with_template("{spinner} {bytes}/{total_bytes} {wide_bar}")
            {
                bar.set_style(style);
            }
            bar
        }
        None => ProgressBar::new_spinner(),
    };

    let mut file = File::create(target)
        .with_context(|| format!("failed to create file: {}", target.display()))?;

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut written = 0u64;
    loop {
        let n = response
            .read(&mut buf)
            .with_context(|| format!("failed to read response body from {}", url))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])
            .with_context(|| format!("failed to write file: {}", target.display()))?;
        written += n as u64;
        progress.inc(n as u64);
    }
    progress.finish_and_clear();

    tracing::debug!("wrote {} bytes to {}", written, target.display());
    Ok(written)
}

/// Extract a gzip-compressed tar archive into `dest`.
///
/// Entries that would land outside `dest` are skipped.
pub fn extract_tarball(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path)
        .with_context(|| format!("failed to open archive: {}", archive_path.display()))?;
    let mut archive = Archive::new(GzDecoder::new(BufReader::new(file)));

    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create destination directory: {}", dest.display()))?;

    for entry in archive
        .entries()
        .with_context(|| format!("failed to read archive: {}", archive_path.display()))?
    {
        let mut entry = entry.context("failed to read archive entry")?;
        let entry_path = entry
            .path()
            .context("failed to get entry path")?
            .into_owned();

        let unpacked = entry.unpack_in(dest).with_context(|| {
            format!("failed to extract {}", entry_path.display())
        })?;
        if !unpacked {
            tracing::warn!(
                "skipping archive entry outside destination: {}",
                entry_path.display()
            );
        }
    }

    Ok(())
}
