//! Computes the extraction signature embedded in the binary.
//!
//! The reference cache stores this digest in its header, so any change to the
//! scanning or extraction sources invalidates caches written by older builds.

use std::{
    fs,
    path::{Path, PathBuf},
};

use sha2::{Digest, Sha256};

const SIGNATURE_DIRS: &[&str] = &[
    "src/core/extract",
    "src/core/parsers",
    "src/core/scan",
    "src/core/classify",
];

fn collect_sources(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_sources(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
}

fn main() {
    let mut files = Vec::new();
    for dir in SIGNATURE_DIRS {
        println!("cargo:rerun-if-changed={}", dir);
        collect_sources(Path::new(dir), &mut files);
    }
    files.sort();

    let mut hasher = Sha256::new();
    for file in &files {
        // Path separators differ across platforms; hash a normalized form.
        let name = file.to_string_lossy().replace('\\', "/");
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        if let Ok(content) = fs::read(file) {
            hasher.update(&content);
        }
        hasher.update([0u8]);
    }
    let digest = hex::encode(hasher.finalize());

    println!("cargo:rustc-env=LINGO_EXTRACTION_SIGNATURE={}", &digest[..16]);
}
