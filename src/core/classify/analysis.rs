//! Classifier verdict types.

use serde::Serialize;

/// Shape of a text-bearing expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpressionType {
    /// `'Save'`
    SimpleString,
    /// `'Hello, ' + 'world'`
    StaticConcatenation,
    /// `'Count: ' + count`
    MixedConcatenation,
    /// `` `Save` ``
    SimpleTemplateLiteral,
    /// `` `Hello ${name}` ``
    TemplateWithExpressions,
    /// `ok ? 'Yes' : 'No'`
    ConditionalStrings,
    /// `label || 'Untitled'`
    LogicalWithFallback,
    /// `user.name`, `getLabel()`
    PureDynamic,
    /// JSON, SQL, format strings, numbers and other non-text values.
    NonTranslatable,
    Empty,
}

impl ExpressionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SimpleString => "simple-string",
            Self::StaticConcatenation => "static-concatenation",
            Self::MixedConcatenation => "mixed-concatenation",
            Self::SimpleTemplateLiteral => "simple-template-literal",
            Self::TemplateWithExpressions => "template-with-expressions",
            Self::ConditionalStrings => "conditional-strings",
            Self::LogicalWithFallback => "logical-with-fallback",
            Self::PureDynamic => "pure-dynamic",
            Self::NonTranslatable => "non-translatable",
            Self::Empty => "empty",
        }
    }
}

/// Where literal runs fall relative to dynamic runs in a mixed expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConcatPattern {
    /// `'Total: ' + n`
    StaticPrefix,
    /// `n + ' items'`
    DynamicPrefix,
    /// `'You have ' + n + ' items'`
    Sandwich,
    /// Any other alternation, e.g. `a + ' of ' + b`.
    Interleaved,
}

impl ConcatPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StaticPrefix => "static-prefix",
            Self::DynamicPrefix => "dynamic-prefix",
            Self::Sandwich => "sandwich",
            Self::Interleaved => "interleaved",
        }
    }
}

/// How a classified expression becomes a translation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Replace the literal with a key call.
    SimpleReplace,
    /// Concatenate all literals into one value behind one key call.
    MergeAndReplace,
    /// Replace each literal operand with its own key call (opt-in only).
    SeparateReplace,
    /// One key call whose value has `{name}` slots, plus a parameter object.
    Interpolation,
    /// Leave untouched and report.
    Skip,
    /// Leave untouched silently: there is no literal text.
    Preserve,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SimpleReplace => "simple-replace",
            Self::MergeAndReplace => "merge-and-replace",
            Self::SeparateReplace => "separate-replace",
            Self::Interpolation => "interpolation",
            Self::Skip => "skip",
            Self::Preserve => "preserve",
        }
    }

    pub fn rewrites(&self) -> bool {
        matches!(
            self,
            Self::SimpleReplace | Self::MergeAndReplace | Self::SeparateReplace | Self::Interpolation
        )
    }
}

/// Why a literal is not translatable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    JsonLike,
    SqlLike,
    FormatSpecifier,
    PhoneNumber,
    RegexLike,
    TranslationCall,
    NonStringLiteral,
    EmptyExpression,
    /// Conditional or fallback expression; its literals are handled one by one.
    PartialLiteral,
    /// Ternary where only one branch carries literal text.
    SingleLiteralBranch,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JsonLike => "json-like",
            Self::SqlLike => "sql-like",
            Self::FormatSpecifier => "format-specifier",
            Self::PhoneNumber => "phone-number",
            Self::RegexLike => "regex-like",
            Self::TranslationCall => "translation-call",
            Self::NonStringLiteral => "non-string-literal",
            Self::EmptyExpression => "empty-expression",
            Self::PartialLiteral => "partial-literal",
            Self::SingleLiteralBranch => "single-literal-branch",
        }
    }
}

/// A non-literal run of a mixed expression, exposed as a named parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DynamicPart {
    pub name: String,
    /// Source text of the expression.
    pub expression: String,
    /// Anything deeper than a bare identifier.
    pub is_complex: bool,
}

/// Ordered piece of a mixed expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Segment {
    Static(String),
    /// Index into `ExpressionAnalysis::dynamic_parts`.
    Dynamic(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpressionAnalysis {
    pub expression_type: ExpressionType,
    pub static_value: Option<String>,
    pub static_parts: Vec<String>,
    pub dynamic_parts: Vec<DynamicPart>,
    pub segments: Vec<Segment>,
    pub pattern: Option<ConcatPattern>,
    pub suggestion: MergeStrategy,
    pub skip_reason: Option<SkipReason>,
    pub is_complex: bool,
}

impl ExpressionAnalysis {
    pub(crate) fn new(expression_type: ExpressionType, suggestion: MergeStrategy) -> Self {
        Self {
            expression_type,
            static_value: None,
            static_parts: Vec::new(),
            dynamic_parts: Vec::new(),
            segments: Vec::new(),
            pattern: None,
            suggestion,
            skip_reason: None,
            is_complex: false,
        }
    }

    pub(crate) fn skipped(expression_type: ExpressionType, reason: SkipReason) -> Self {
        Self {
            skip_reason: Some(reason),
            ..Self::new(expression_type, MergeStrategy::Skip)
        }
    }

    pub fn is_extractable(&self) -> bool {
        self.suggestion.rewrites()
    }

    /// The `{name}` template and parameters of an interpolation verdict.
    pub fn interpolation(&self) -> Option<Interpolation> {
        if self.suggestion != MergeStrategy::Interpolation {
            return None;
        }
        Some(Interpolation {
            segments: self.segments.clone(),
            params: self.dynamic_parts.clone(),
        })
    }

    /// Text a translator would see: the static value, or the neutral
    /// interpolation template.
    pub fn message_text(&self) -> Option<String> {
        match self.suggestion {
            MergeStrategy::Interpolation => self.interpolation().map(|i| i.template()),
            MergeStrategy::SimpleReplace
            | MergeStrategy::MergeAndReplace
            | MergeStrategy::SeparateReplace => self.static_value.clone(),
            MergeStrategy::Skip | MergeStrategy::Preserve => None,
        }
    }
}

/// Interpolation template with named slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interpolation {
    pub segments: Vec<Segment>,
    pub params: Vec<DynamicPart>,
}

impl Interpolation {
    /// Template in the neutral `{name}` syntax.
    pub fn template(&self) -> String {
        self.render("{name}")
    }

    /// Template using a runtime placeholder format such as `{{name}}` or
    /// `%{name}`; the literal `name` in `format` is replaced by each slot name.
    pub fn render(&self, format: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Static(text) => out.push_str(text),
                Segment::Dynamic(index) => {
                    if let Some(param) = self.params.get(*index) {
                        out.push_str(&format.replacen("name", &param.name, 1));
                    }
                }
            }
        }
        out
    }

    /// Static text with every slot removed, for text-shape heuristics.
    pub fn static_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Static(text) => text.as_str(),
                Segment::Dynamic(_) => " ",
            })
            .collect()
    }
}
