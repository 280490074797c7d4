//! Atomic file replacement.
//!
//! Every document the engine writes (locale files, rewritten sources, the
//! cache) goes through [`write_atomic`]: the content lands in a sibling
//! `.tmp` file which is then renamed over the target. A failed write leaves
//! the target untouched and no temporary file behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `content` to `path` through a temporary file and a rename.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    write_atomic_with(path, content, |from, to| fs::rename(from, to))
}

/// [`write_atomic`] with an injectable rename, used to simulate failures.
///
/// A rename that fails with `AlreadyExists` is retried once after removing
/// the destination.
pub fn write_atomic_with<F>(path: &Path, content: &str, mut rename: F) -> Result<()>
where
    F: FnMut(&Path, &Path) -> io::Result<()>,
{
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let tmp = temp_path(path);
    let result = fs::write(&tmp, content)
        .with_context(|| format!("Failed to write temporary file: {}", tmp.display()))
        .and_then(|()| {
            match rename(&tmp, path) {
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    match fs::remove_file(path) {
                        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                        _ => rename(&tmp, path),
                    }
                }
                other => other,
            }
            .with_context(|| format!("Failed to replace file: {}", path.display()))
        });

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}
