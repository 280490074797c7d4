//! Reference extractor.
//!
//! Finds every statically resolvable `t('key')` call in a file, records the
//! in-code fallback literal next to it, and reports calls whose key is
//! computed at runtime. Extraction is dispatched per dialect through
//! [`ExtractorRegistry`].

pub mod ecma;
pub mod reference;
pub mod registry;
pub mod sfc;

pub use ecma::{EcmaExtractor, is_translation_callee};
pub use reference::{DynamicKeyWarning, DynamicReason, FileReferences, TranslationReference};
pub use registry::{
    ECMA_EXTENSIONS, Extractor, ExtractorRegistry, ParserAvailability, ReferenceExtractor,
    SFC_EXTENSIONS, is_supported_file,
};
pub use sfc::{SfcExtractor, extract_lines};
