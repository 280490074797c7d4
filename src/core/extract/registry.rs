use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use super::ecma::EcmaExtractor;
use super::reference::FileReferences;
use super::sfc::SfcExtractor;
use crate::core::parsers::sfc::STRUCTURED_SFC_AVAILABLE;

/// Extensions handled by [`EcmaExtractor`].
pub const ECMA_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs"];
/// Extensions handled by [`SfcExtractor`].
pub const SFC_EXTENSIONS: &[&str] = &["vue"];

/// Produces the translation references of one file.
#[enum_dispatch]
pub trait ReferenceExtractor {
    fn extract(&self, file_path: &str, content: &str) -> Result<FileReferences>;
}

#[enum_dispatch(ReferenceExtractor)]
#[derive(Debug, Clone)]
pub enum Extractor {
    Ecma(EcmaExtractor),
    Sfc(SfcExtractor),
}

/// Which optional dialect parsers this build can use.
///
/// Stored in the cache header: a build that gains or loses the structured
/// component parser must not reuse the other build's results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParserAvailability(BTreeMap<String, bool>);

impl ParserAvailability {
    pub fn detect() -> Self {
        Self(BTreeMap::from([(
            "vue".to_string(),
            STRUCTURED_SFC_AVAILABLE,
        )]))
    }

    pub fn is_available(&self, dialect: &str) -> bool {
        self.0.get(dialect).copied().unwrap_or(false)
    }
}

/// Picks the extractor for a file by extension.
#[derive(Debug, Clone)]
pub struct ExtractorRegistry {
    ecma: Extractor,
    sfc: Extractor,
    availability: ParserAvailability,
}

impl ExtractorRegistry {
    pub fn new(identifier: &str, availability: ParserAvailability) -> Self {
        Self {
            ecma: EcmaExtractor {
                identifier: identifier.to_string(),
            }
            .into(),
            sfc: SfcExtractor {
                identifier: identifier.to_string(),
                structured: availability.is_available("vue"),
            }
            .into(),
            availability,
        }
    }

    pub fn availability(&self) -> &ParserAvailability {
        &self.availability
    }

    pub fn for_path(&self, path: &str) -> Option<&Extractor> {
        let ext = Path::new(path).extension()?.to_str()?;
        if ECMA_EXTENSIONS.contains(&ext) {
            Some(&self.ecma)
        } else if SFC_EXTENSIONS.contains(&ext) {
            Some(&self.sfc)
        } else {
            None
        }
    }

    /// Extract from a file with a supported extension; other files yield
    /// no references.
    pub fn extract(&self, path: &str, content: &str) -> Result<FileReferences> {
        match self.for_path(path) {
            Some(extractor) => extractor.extract(path, content),
            None => Ok(FileReferences::default()),
        }
    }
}

/// Whether the file is one the engine reads.
pub fn is_supported_file(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ECMA_EXTENSIONS.contains(&ext) || SFC_EXTENSIONS.contains(&ext))
}
