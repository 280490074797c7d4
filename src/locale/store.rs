use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::document::{DocumentShape, KeyAction, LocaleDocument, RenameOutcome};
use crate::config::LocaleShape;
use crate::fs_utils::write_atomic;

#[derive(Debug, Error)]
pub enum LocaleStoreError {
    #[error("I/O error on {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Invalid JSON: {message}")]
    Parse { message: String },

    #[error("Root of a locale file must be an object")]
    NotAnObject,

    #[error("Duplicate mapping for key: {key}")]
    DuplicateMapping { key: String },

    #[error("Unknown locale: {locale}")]
    UnknownLocale { locale: String },
}

/// Changes written for one locale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
}

impl FlushStats {
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.updated == 0 && self.removed == 0
    }
}

struct LoadedLocale {
    path: PathBuf,
    original: LocaleDocument,
    current: LocaleDocument,
    stats: FlushStats,
}

/// Locale documents stored as `<dir>/<locale>.json`.
///
/// Each locale is loaded on first access and owned here until [`flush`],
/// which writes every changed document once.
///
/// [`flush`]: JsonLocaleStore::flush
pub struct JsonLocaleStore {
    dir: PathBuf,
    shape: LocaleShape,
    locales: BTreeMap<String, LoadedLocale>,
}

fn is_valid_locale_name(locale: &str) -> bool {
    !locale.is_empty()
        && locale
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl JsonLocaleStore {
    pub fn new(dir: impl Into<PathBuf>, shape: LocaleShape) -> Self {
        Self {
            dir: dir.into(),
            shape,
            locales: BTreeMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn locale_path(&self, locale: &str) -> PathBuf {
        self.dir.join(format!("{}.json", locale))
    }

    /// Locales with a `.json` file in the directory, sorted.
    pub fn available_locales(&self) -> Result<Vec<String>, LocaleStoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(LocaleStoreError::Io {
                    path: self.dir.clone(),
                    message: e.to_string(),
                });
            }
        };
        let mut locales: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .filter(|stem| is_valid_locale_name(stem))
            .collect();
        locales.sort();
        Ok(locales)
    }

    fn load(&mut self, locale: &str) -> Result<&mut LoadedLocale, LocaleStoreError> {
        if !is_valid_locale_name(locale) {
            return Err(LocaleStoreError::UnknownLocale {
                locale: locale.to_string(),
            });
        }
        if !self.locales.contains_key(locale) {
            let path = self.locale_path(locale);
            let mut document = match fs::read_to_string(&path) {
                Ok(content) => LocaleDocument::parse(&content)?,
                Err(e) if e.kind() == io::ErrorKind::NotFound => LocaleDocument::default(),
                Err(e) => {
                    return Err(LocaleStoreError::Io {
                        path,
                        message: e.to_string(),
                    });
                }
            };
            match self.shape {
                LocaleShape::Auto => {}
                LocaleShape::Flat => document.set_shape(DocumentShape::Flat),
                LocaleShape::Nested => document.set_shape(DocumentShape::Nested),
            }
            debug!(locale, path = %path.display(), keys = document.len(), "loaded locale");
            self.locales.insert(
                locale.to_string(),
                LoadedLocale {
                    path,
                    original: document.clone(),
                    current: document,
                    stats: FlushStats::default(),
                },
            );
        }
        self.locales
            .get_mut(locale)
            .ok_or_else(|| LocaleStoreError::UnknownLocale {
                locale: locale.to_string(),
            })
    }

    pub fn get(&mut self, locale: &str) -> Result<&LocaleDocument, LocaleStoreError> {
        Ok(&self.load(locale)?.current)
    }

    pub fn upsert(
        &mut self,
        locale: &str,
        key: &str,
        value: String,
    ) -> Result<KeyAction, LocaleStoreError> {
        let loaded = self.load(locale)?;
        let action = loaded.current.set(key, value);
        match action {
            KeyAction::Added => loaded.stats.added += 1,
            KeyAction::Updated => loaded.stats.updated += 1,
            KeyAction::Unchanged => {}
        }
        Ok(action)
    }

    pub fn remove(&mut self, locale: &str, key: &str) -> Result<bool, LocaleStoreError> {
        let loaded = self.load(locale)?;
        let removed = loaded.current.remove(key);
        if removed {
            loaded.stats.removed += 1;
        }
        Ok(removed)
    }

    pub fn rename_key(
        &mut self,
        locale: &str,
        from: &str,
        to: &str,
    ) -> Result<RenameOutcome, LocaleStoreError> {
        let loaded = self.load(locale)?;
        let outcome = loaded.current.rename(from, to);
        if outcome == RenameOutcome::Renamed && from != to {
            loaded.stats.updated += 1;
        }
        Ok(outcome)
    }

    /// Document as loaded and as it would be written, for loaded locales.
    pub fn snapshot(&self, locale: &str) -> Option<(&LocaleDocument, &LocaleDocument)> {
        self.locales
            .get(locale)
            .map(|loaded| (&loaded.original, &loaded.current))
    }

    /// Write every changed document. A failure affects only its own locale.
    pub fn flush(&mut self) -> BTreeMap<String, Result<FlushStats, LocaleStoreError>> {
        let mut results = BTreeMap::new();
        for (locale, loaded) in &mut self.locales {
            if loaded.current == loaded.original && loaded.path.exists() {
                continue;
            }
            if loaded.current.is_empty() && !loaded.path.exists() {
                continue;
            }
            let result = write_atomic(&loaded.path, &loaded.current.to_json_string())
                .map(|()| {
                    loaded.original = loaded.current.clone();
                    std::mem::take(&mut loaded.stats)
                })
                .map_err(|e| LocaleStoreError::Io {
                    path: loaded.path.clone(),
                    message: format!("{:#}", e),
                });
            results.insert(locale.clone(), result);
        }
        results
    }
}
