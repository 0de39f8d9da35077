//! Filesystem utilities.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use glob::glob;

/// Recursively copy a directory.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)
        .with_context(|| format!("failed to create directory: {}", dst.display()))?;

    for entry in fs::read_dir(src)
        .with_context(|| format!("failed to read directory: {}", src.display()))?
    {
        let entry = entry?;
        let ty = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if ty.is_dir() {
            copy_dir_all(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path).with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    src_path.display(),
                    dst_path.display()
                )
            })?;
        }
    }
    Ok(())
}

/// Ensure a directory exists, creating it and any missing parents.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Append text to a file, creating the file if it does not exist.
pub fn append_string(path: &Path, contents: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open file for appending: {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Resolve paths to absolute form.
///
/// Absolute paths are returned unchanged. Relative paths are joined onto
/// `root` (itself made absolute against the current directory) or onto the
/// current directory when no root is given, then normalized.
pub fn absolute_paths<P: AsRef<Path>>(paths: &[P], root: Option<&Path>) -> Result<Vec<PathBuf>> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let base = match root {
        Some(root) if root.is_absolute() => normalize_lexically(root),
        Some(root) => normalize_lexically(&cwd.join(root)),
        None => cwd,
    };

    Ok(paths
        .iter()
        .map(|p| {
            let p = p.as_ref();
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                normalize_lexically(&base.join(p))
            }
        })
        .collect())
}

/// Collapse `.` and `..` components without touching the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Whether a path contains a glob wildcard.
pub fn has_wildcard(path: &Path) -> bool {
    path.to_string_lossy().contains('*')
}

/// Expand a glob pattern into matching paths, sorted lexicographically.
pub fn glob_sorted(pattern: &Path) -> Result<Vec<PathBuf>> {
    let pattern_str = pattern.to_string_lossy();
    let mut results = Vec::new();

    for entry in glob(&pattern_str)
        .with_context(|| format!("invalid glob pattern: {}", pattern_str))?
    {
        match entry {
            Ok(path) => results.push(path),
            Err(e) => {
                tracing::warn!("glob error: {}", e);
            }
        }
    }

    results.sort();
    Ok(results)
}

/// Move a file or directory.
///
/// If `dst` is an existing directory, `src` is moved into it under its own
/// name; an entry of that name already in `dst` is an error. Otherwise
/// `src` is renamed to `dst`. When a plain rename is not possible (e.g.
/// across filesystems) the contents are copied and the source removed. Returns the final location.
pub fn move_path(src: &Path, dst: &Path) -> Result<PathBuf> {
    let target = if dst.is_dir() {
        let name = src
            .file_name()
            .with_context(|| format!("cannot move path without a file name: {}", src.display()))?;
        let target = dst.join(name);
        if target.exists() {
            bail!("destination path already exists: {}", target.display());
        }
        target
    } else {
        dst.to_path_buf()
    };

    let rename_err = match fs::rename(src, &target) {
        Ok(()) => return Ok(target),
        Err(e) => e,
    };

    if !src.exists() {
        return Err(rename_err)
            .with_context(|| format!("failed to move {} to {}", src.display(), target.display()));
    }

    tracing::debug!(
        "rename {} -> {} failed ({}), falling back to copy",
        src.display(),
        target.display(),
        rename_err
    );

    if src.is_dir() {
        if target.exists() {
            bail!("destination already exists: {}", target.display());
        }
        copy_dir_all(src, &target)?;
        fs::remove_dir_all(src)
            .with_context(|| format!("failed to remove directory: {}", src.display()))?;
    } else {
        fs::copy(src, &target).with_context(|| {
            format!("failed to copy {} to {}", src.display(), target.display())
        })?;
        fs::remove_file(src)
            .with_context(|| format!("failed to remove file: {}", src.display()))?;
    }

    Ok(target)
}
