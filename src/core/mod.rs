pub mod cache;
pub mod classify;
pub mod extract;
pub mod files;
pub mod keys;
pub mod parsers;
pub mod scan;
pub mod session;
pub mod source;
pub mod sync;
pub mod writer;

pub use session::{CacheStats, FileWarning, ReferenceScan, ScanSession};
