//! Test utilities for buildtools unit tests.
//!
//! Provides archive fixtures and helpers for fake executables. HTTP is
//! mocked with `mockito` directly in the tests that need it.

use flate2::write::GzEncoder;
use flate2::Compression;

/// Build a gzip-compressed tarball containing the given files.
pub fn gzip_tarball(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut tar_data = Vec::new();
    {
        let encoder = GzEncoder::new(&mut tar_data, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, contents) in files {
            let mut header = tar::Header::new_gnu();
            header.set_path(name).expect("invalid tar path");
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append(&header, *contents)
                .expect("failed to append tar entry");
        }
        builder
            .into_inner()
            .and_then(|gz| gz.finish())
            .expect("failed to finish tarball");
    }
    tar_data
}

/// Write an executable `sh` script, creating parent directories.
#[cfg(unix)]
pub fn write_script(path: &std::path::Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create script dir");
    }
    std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).expect("failed to write script");
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .expect("failed to mark script executable");
}
