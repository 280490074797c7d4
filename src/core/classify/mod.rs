//! Expression classifier and merge engine.
//!
//! Decides how a text-bearing expression becomes a translation call:
//! a plain literal is replaced, a static `+` chain is merged, and mixed
//! concatenations or templates become one interpolated message with named
//! parameters. The verdict is dialect-agnostic; the scanner and the codemod
//! writer share it.

pub mod analysis;
pub mod classifier;
pub mod naming;
pub mod shapes;

pub use analysis::{
    ConcatPattern, DynamicPart, ExpressionAnalysis, ExpressionType, Interpolation, MergeStrategy,
    Segment, SkipReason,
};
pub use classifier::{ClassifierOptions, classify};
