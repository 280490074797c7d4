//! Source discovery.

use std::path::{Path, PathBuf};

use glob::{Pattern, glob};
use tracing::warn;
use walkdir::WalkDir;

use crate::config::TEST_FILE_PATTERNS;
use crate::core::extract::is_supported_file;

/// Patterns without `*` or `?` are literal paths relative to the root.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

#[derive(Debug, Default)]
pub struct ScanResult {
    /// Sorted paths, each joined onto the root.
    pub files: Vec<PathBuf>,
    pub skipped_count: usize,
}

/// Walk `root` (or the `includes` below it) collecting supported source
/// files that no exclude pattern matches.
pub fn scan_files(
    root: &Path,
    includes: &[String],
    excludes: &[String],
    ignore_test_files: bool,
) -> ScanResult {
    let mut result = ScanResult::default();

    let mut literal_excludes: Vec<PathBuf> = Vec::new();
    let mut glob_excludes: Vec<Pattern> = Vec::new();
    for p in excludes {
        if is_glob_pattern(p) {
            match Pattern::new(p) {
                Ok(pattern) => glob_excludes.push(pattern),
                Err(e) => warn!(pattern = %p, error = %e, "invalid exclude pattern"),
            }
        } else {
            literal_excludes.push(root.join(p));
        }
    }
    if ignore_test_files {
        glob_excludes.extend(TEST_FILE_PATTERNS.iter().filter_map(|p| Pattern::new(p).ok()));
    }

    let roots: Vec<PathBuf> = if includes.is_empty() {
        vec![root.to_path_buf()]
    } else {
        let mut paths = Vec::new();
        for inc in includes {
            if is_glob_pattern(inc) {
                let full = root.join(inc);
                match glob(&full.to_string_lossy()) {
                    Ok(entries) => paths.extend(entries.flatten()),
                    Err(e) => warn!(pattern = %inc, error = %e, "invalid include pattern"),
                }
            } else {
                let path = root.join(inc);
                if path.exists() {
                    paths.push(path);
                } else {
                    warn!(path = %path.display(), "include path does not exist");
                }
            }
        }
        paths
    };

    for dir in roots {
        for entry in WalkDir::new(&dir) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    result.skipped_count += 1;
                    warn!(error = %e, "cannot access path");
                    continue;
                }
            };
            let path = entry.path();
            let path_str = path.to_string_lossy();

            if literal_excludes.iter().any(|ex| path.starts_with(ex)) {
                continue;
            }
            if glob_excludes.iter().any(|p| p.matches(&path_str)) {
                continue;
            }
            if path.is_file() && is_supported_file(&path_str) {
                result.files.push(path.to_path_buf());
            }
        }
    }

    result.files.sort();
    result.files.dedup();
    result
}

/// `root`-relative path with forward slashes, used in keys, ids and reports.
pub fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
