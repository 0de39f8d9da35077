//! Relocating build artifacts between directory trees.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::fs::{glob_sorted, has_wildcard, move_path};

/// Moves files from under one root to under another.
///
/// Both roots are plain paths and need not exist when the mover is created.
#[derive(Debug, Clone)]
pub struct FileMover {
    source_root: PathBuf,
    destination_root: PathBuf,
}

impl FileMover {
    pub fn new(source_root: impl Into<PathBuf>, destination_root: impl Into<PathBuf>) -> Self {
        FileMover {
            source_root: source_root.into(),
            destination_root: destination_root.into(),
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    /// Move a single path, echoing the move.
    pub fn move_file(&self, src: &Path, dst: &Path) -> Result<PathBuf> {
        println!("move {} {}", src.display(), dst.display());
        move_path(src, dst)
    }

    /// Move `source_root/<src...>` to `destination_root/<dst...>`.
    ///
    /// A wildcard in the destination selects the lexicographically last
    /// match. A wildcard in the source moves every match to the destination.
    /// Returns the final location of each moved path.
    pub fn move_files<S, D>(&self, src: &[S], dst: &[D]) -> Result<Vec<PathBuf>>
    where
        S: AsRef<Path>,
        D: AsRef<Path>,
    {
        let src = join_segments(&self.source_root, src);
        let mut dst = join_segments(&self.destination_root, dst);

        if has_wildcard(&dst) {
            dst = glob_sorted(&dst)?
                .pop()
                .with_context(|| format!("no destination matches {}", dst.display()))?;
            tracing::debug!("resolved destination to {}", dst.display());
        }

        if has_wildcard(&src) {
            let matches = glob_sorted(&src)?;
            if matches.is_empty() {
                tracing::warn!("no files match {}", src.display());
            }
            matches
                .iter()
                .map(|path| self.move_file(path, &dst))
                .collect()
        } else {
            Ok(vec![self.move_file(&src, &dst)?])
        }
    }
}

fn join_segments<P: AsRef<Path>>(root: &Path, segments: &[P]) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in segments {
        path.push(segment);
    }
    path
}
