//! Reference cache.
//!
//! Per-file extraction results keyed by path and reused while the file's
//! `(mtime, size)` fingerprint is unchanged. The header pins everything that
//! can change extraction output; any difference discards the whole file.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
    time::UNIX_EPOCH,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::core::extract::{FileReferences, ParserAvailability};
use crate::fs_utils::write_atomic;

pub const CACHE_VERSION: u32 = 1;

/// Digest of the extraction sources this binary was built from.
pub const EXTRACTION_SIGNATURE: &str = env!("LINGO_EXTRACTION_SIGNATURE");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheHeader {
    pub version: u32,
    pub translation_identifier: String,
    pub config_hash: String,
    pub tool_version: String,
    pub parser_signature: String,
    pub parser_availability: ParserAvailability,
}

impl CacheHeader {
    /// Header expected by this build for `config`.
    pub fn current(config: &Config, availability: &ParserAvailability) -> Self {
        Self {
            version: CACHE_VERSION,
            translation_identifier: config.translation_identifier.clone(),
            config_hash: config.normalized_hash(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            parser_signature: EXTRACTION_SIGNATURE.to_string(),
            parser_availability: availability.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fingerprint {
    pub mtime_ms: u64,
    pub size: u64,
}

impl Fingerprint {
    pub fn of(path: &Path) -> Result<Self> {
        let metadata =
            fs::metadata(path).with_context(|| format!("Failed to stat {}", path.display()))?;
        let mtime_ms = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Ok(Self {
            mtime_ms,
            size: metadata.len(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntry {
    fingerprint: Fingerprint,
    #[serde(flatten)]
    references: FileReferences,
}

#[derive(Debug, Deserialize)]
struct CacheFile {
    header: CacheHeader,
    #[serde(default)]
    entries: BTreeMap<String, CacheEntry>,
}

#[derive(Serialize)]
struct CacheFileRef<'a> {
    header: &'a CacheHeader,
    entries: &'a BTreeMap<String, CacheEntry>,
}

#[derive(Debug)]
pub struct ReferenceCache {
    /// `None` disables persistence; lookups always miss.
    path: Option<PathBuf>,
    header: CacheHeader,
    entries: BTreeMap<String, CacheEntry>,
    dirty: bool,
}

impl ReferenceCache {
    pub fn disabled(header: CacheHeader) -> Self {
        Self {
            path: None,
            header,
            entries: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Load the cache at `path`. A missing, unreadable or corrupt file, or
    /// one written under a different header, starts empty.
    pub fn load(path: impl Into<PathBuf>, header: CacheHeader) -> Self {
        let path = path.into();
        let mut cache = Self {
            path: Some(path.clone()),
            header,
            entries: BTreeMap::new(),
            dirty: false,
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no reference cache");
                return cache;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read reference cache");
                return cache;
            }
        };

        match serde_json::from_str::<CacheFile>(&content) {
            Ok(file) if file.header == cache.header => {
                debug!(entries = file.entries.len(), "reference cache loaded");
                cache.entries = file.entries;
            }
            Ok(file) => {
                debug!(
                    stored = ?file.header,
                    expected = ?cache.header,
                    "reference cache header mismatch, discarding"
                );
                cache.dirty = true;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt reference cache, discarding");
                cache.dirty = true;
            }
        }
        cache
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored references for `file`, if its fingerprint is unchanged.
    pub fn lookup(&self, file: &str, fingerprint: Fingerprint) -> Option<&FileReferences> {
        if !self.is_enabled() {
            return None;
        }
        self.entries
            .get(file)
            .filter(|entry| entry.fingerprint == fingerprint)
            .map(|entry| &entry.references)
    }

    pub fn store(&mut self, file: String, fingerprint: Fingerprint, references: FileReferences) {
        if !self.is_enabled() {
            return;
        }
        self.entries.insert(
            file,
            CacheEntry {
                fingerprint,
                references,
            },
        );
        self.dirty = true;
    }

    /// Drop entries for files that no longer exist in the scan.
    pub fn retain(&mut self, files: &BTreeSet<String>) {
        let before = self.entries.len();
        self.entries.retain(|path, _| files.contains(path));
        if self.entries.len() != before {
            self.dirty = true;
        }
    }

    pub fn save(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }
        let json = serde_json::to_string(&CacheFileRef {
            header: &self.header,
            entries: &self.entries,
        })
        .context("Failed to serialize reference cache")?;
        write_atomic(path, &json)?;
        self.dirty = false;
        debug!(path = %path.display(), entries = self.entries.len(), "reference cache saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extract::TranslationReference;
    use crate::core::source::Position;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn header(config: &Config) -> CacheHeader {
        CacheHeader::current(config, &ParserAvailability::detect())
    }

    fn refs(key: &str) -> FileReferences {
        FileReferences {
            references: vec![TranslationReference {
                key: key.to_string(),
                file_path: "src/a.ts".to_string(),
                position: Position::new(1, 1),
                key_span: 2..9,
                fallback_literal: None,
            }],
            dynamic_key_warnings: Vec::new(),
        }
    }

    const PRINT: Fingerprint = Fingerprint {
        mtime_ms: 1_000,
        size: 42,
    };

    #[test]
    fn test_round_trip_and_fingerprint_check() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".lingo-cache.json");
        let config = Config::default();

        let mut cache = ReferenceCache::load(&path, header(&config));
        assert!(cache.is_empty());
        cache.store("src/a.ts".to_string(), PRINT, refs("nav.home"));
        cache.save().unwrap();

        let cache = ReferenceCache::load(&path, header(&config));
        assert_eq!(cache.lookup("src/a.ts", PRINT), Some(&refs("nav.home")));
        let touched = Fingerprint {
            mtime_ms: 2_000,
            ..PRINT
        };
        assert_eq!(cache.lookup("src/a.ts", touched), None);
    }

    #[test]
    fn test_header_change_discards_everything() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let config = Config::default();
        let mut cache = ReferenceCache::load(&path, header(&config));
        cache.store("src/a.ts".to_string(), PRINT, refs("nav.home"));
        cache.save().unwrap();

        let renamed = Config {
            translation_identifier: "i18n.t".to_string(),
            ..Config::default()
        };
        assert!(ReferenceCache::load(&path, header(&renamed)).is_empty());

        let other_config = Config {
            min_text_length: 5,
            ..Config::default()
        };
        assert!(ReferenceCache::load(&path, header(&other_config)).is_empty());

        let upgraded = CacheHeader {
            tool_version: "99.0.0".to_string(),
            ..header(&config)
        };
        assert!(ReferenceCache::load(&path, upgraded).is_empty());

        let resigned = CacheHeader {
            parser_signature: "0000".to_string(),
            ..header(&config)
        };
        assert!(ReferenceCache::load(&path, resigned).is_empty());
    }

    #[test]
    fn test_corrupt_cache_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{ not json").unwrap();

        let mut cache = ReferenceCache::load(&path, header(&Config::default()));
        assert!(cache.is_empty());
        cache.save().unwrap();
        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains("\"parserSignature\""));
    }

    #[test]
    fn test_disabled_cache_never_hits() {
        let mut cache = ReferenceCache::disabled(header(&Config::default()));
        cache.store("src/a.ts".to_string(), PRINT, refs("nav.home"));
        assert_eq!(cache.lookup("src/a.ts", PRINT), None);
        assert!(cache.save().is_ok());
    }

    #[test]
    fn test_retain_drops_deleted_files() {
        let dir = TempDir::new().unwrap();
        let mut cache = ReferenceCache::load(dir.path().join("c.json"), header(&Config::default()));
        cache.store("src/a.ts".to_string(), PRINT, refs("a"));
        cache.store("src/b.ts".to_string(), PRINT, refs("b"));
        cache.retain(&BTreeSet::from(["src/b.ts".to_string()]));
        assert_eq!(cache.len(), 1);
        assert!(cache.lookup("src/b.ts", PRINT).is_some());
    }
}
