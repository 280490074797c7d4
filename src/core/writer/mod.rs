//! Codemod writer: source rewrites for extracted text and renamed keys.

pub mod codemod;
pub mod rename;

pub use codemod::{
    CodemodOptions, FileRewrite, RewriteSkip, SkippedRewrite, assign_keys, locale_value,
    render_replacement, rewrite_source,
};
pub use rename::{KeyMapping, ReferenceRewrite, rename_keys, rewrite_references};
