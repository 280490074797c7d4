use std::ops::Range;

use serde::Serialize;

use crate::core::classify::{ExpressionType, Interpolation, MergeStrategy};
use crate::core::source::Position;

/// What kind of node produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateKind {
    /// Markup text between tags.
    BareText,
    /// Static value of a translatable attribute.
    AttributeValue,
    /// Expression container, bound attribute or mustache interpolation.
    Expression,
    /// First argument of a translation-style call.
    CallArgument,
}

impl CandidateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BareText => "bare-text",
            Self::AttributeValue => "attribute-value",
            Self::Expression => "expression",
            Self::CallArgument => "call-argument",
        }
    }
}

/// Surface syntax the replacement must use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallSite {
    /// JSX/TSX markup: `{t('key')}`.
    Jsx,
    /// Plain script code: `t('key')`.
    Script,
    /// Component template: `{{ $t('key') }}`, `:title="$t('key')"`.
    Template,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateStatus {
    Pending,
    Applied,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionCandidate {
    pub id: String,
    pub file_path: String,
    pub position: Position,
    pub kind: CandidateKind,
    pub site: CallSite,
    /// Byte range in the file that a rewrite replaces.
    pub span: Range<usize>,
    /// Exact source text of `span` at scan time.
    pub raw_text: String,
    /// Message text; interpolations use `{name}` slots.
    pub normalized_text: String,
    /// Nearest enclosing tag name, or `t() call`.
    pub context: String,
    pub forced: bool,
    pub expression_type: Option<ExpressionType>,
    pub strategy: MergeStrategy,
    pub interpolation: Option<Interpolation>,
    pub suggested_key: Option<String>,
    pub hash: Option<String>,
    pub status: CandidateStatus,
}

/// Closed set of reasons a node was not turned into a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    Empty,
    BelowMinLength,
    NoLetters,
    InsufficientLetters,
    NonSentence,
    DeniedPattern,
    NonLiteral,
    DirectiveSkip,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::BelowMinLength => "below-min-length",
            Self::NoLetters => "no-letters",
            Self::InsufficientLetters => "insufficient-letters",
            Self::NonSentence => "non-sentence",
            Self::DeniedPattern => "denied-pattern",
            Self::NonLiteral => "non-literal",
            Self::DirectiveSkip => "directive-skip",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipLocation {
    pub file_path: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedCandidate {
    pub text: Option<String>,
    pub reason: RejectReason,
    pub location: Option<SkipLocation>,
    /// Extra detail, e.g. the classifier verdict behind `non-literal`.
    pub detail: Option<String>,
}
