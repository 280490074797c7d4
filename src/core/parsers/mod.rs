//! Source parsers.
//!
//! - `jsx`: JS/TS/JSX/TSX modules and standalone expressions (swc)
//! - `sfc`: single-file components (script block location, template tree)

pub mod jsx;
pub mod sfc;
