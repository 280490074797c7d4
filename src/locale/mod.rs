//! Locale store: per-locale JSON documents under the locales directory.

pub mod document;
pub mod store;

pub use document::{DocumentShape, KeyAction, LocaleDocument, RenameOutcome};
pub use store::{FlushStats, JsonLocaleStore, LocaleStoreError};
