//! Candidate scanner.
//!
//! Walks one source file, runs every text-bearing node through directives,
//! normalization, the classifier and the text heuristics, and returns the
//! accepted candidates plus a reason for every rejected node.

pub mod candidate;
pub mod directives;
pub mod jsx;
pub mod sfc;
pub mod text;

use std::ops::Range;

use anyhow::Result;

pub use candidate::{
    CallSite, CandidateKind, CandidateStatus, ExtractionCandidate, RejectReason, SkipLocation,
    SkippedCandidate,
};
pub use text::TextRules;

use crate::config::Config;
use crate::core::classify::{
    ClassifierOptions, ExpressionAnalysis, ExpressionType, Interpolation, MergeStrategy,
};
use crate::core::source::LineIndex;
use directives::{Directive, LineDirectives};

/// Label used as context for call-argument candidates.
pub const CALL_CONTEXT: &str = "t() call";

/// Scanner settings shared by every file of a run.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub rules: TextRules,
    pub translatable_attributes: Vec<String>,
    pub translation_identifier: String,
    pub scan_calls: bool,
    pub classifier: ClassifierOptions,
}

impl ScanOptions {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            rules: TextRules::from_config(config)?,
            translatable_attributes: config.translatable_attributes.clone(),
            translation_identifier: config.translation_identifier.clone(),
            scan_calls: config.scan_calls,
            classifier: ClassifierOptions {
                separate_static_concatenation: config.separate_concatenation,
            },
        })
    }

    /// `aria-*` in the list admits every ARIA attribute.
    pub fn is_translatable_attr(&self, name: &str) -> bool {
        self.translatable_attributes.iter().any(|attr| {
            attr == name
                || attr
                    .strip_suffix('*')
                    .is_some_and(|prefix| name.starts_with(prefix))
        })
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::from_config(&Config::default()).unwrap_or_else(|_| Self {
            rules: TextRules::default(),
            translatable_attributes: Vec::new(),
            translation_identifier: "t".to_string(),
            scan_calls: false,
            classifier: ClassifierOptions::default(),
        })
    }
}

/// Scanner output for one file.
#[derive(Debug, Default)]
pub struct FileScan {
    pub candidates: Vec<ExtractionCandidate>,
    pub skipped: Vec<SkippedCandidate>,
    /// Non-fatal notes, e.g. a degraded component scan.
    pub warnings: Vec<String>,
}

/// Scan one file. Parse failures are returned as errors so the caller can
/// record them and carry on with the remaining files.
pub fn scan_source(file_path: &str, content: &str, options: &ScanOptions) -> Result<FileScan> {
    if file_path.ends_with(".vue") {
        sfc::scan_component(file_path, content, options)
    } else {
        jsx::scan_module(file_path, content, options)
    }
}

/// A text-bearing node offered to the collector.
pub(crate) struct Offer {
    pub kind: CandidateKind,
    pub site: CallSite,
    /// File byte range that a rewrite would replace.
    pub span: Range<usize>,
    /// Message text before normalization.
    pub text: String,
    /// Text the heuristics judge; differs from `text` for interpolations.
    pub heuristic_text: Option<String>,
    pub context: String,
    pub markup: bool,
    pub marker: Option<Directive>,
    pub expression_type: Option<ExpressionType>,
    pub strategy: MergeStrategy,
    pub interpolation: Option<Interpolation>,
}

impl Offer {
    pub fn literal(
        kind: CandidateKind,
        site: CallSite,
        span: Range<usize>,
        text: String,
        context: String,
    ) -> Self {
        Self {
            kind,
            site,
            span,
            text,
            heuristic_text: None,
            context,
            markup: matches!(kind, CandidateKind::BareText | CandidateKind::AttributeValue),
            marker: None,
            expression_type: None,
            strategy: MergeStrategy::SimpleReplace,
            interpolation: None,
        }
    }

    pub fn with_marker(mut self, marker: Option<Directive>) -> Self {
        self.marker = marker;
        self
    }
}

/// Accumulates candidates and rejections for one file.
pub(crate) struct Collector<'a> {
    pub file_path: &'a str,
    pub content: &'a str,
    pub lines: LineIndex,
    pub directives: LineDirectives,
    pub options: &'a ScanOptions,
    pub out: FileScan,
}

impl<'a> Collector<'a> {
    pub fn new(file_path: &'a str, content: &'a str, options: &'a ScanOptions) -> Self {
        Self {
            file_path,
            content,
            lines: LineIndex::new(content),
            directives: LineDirectives::default(),
            options,
            out: FileScan::default(),
        }
    }

    pub fn add_comment(&mut self, range: Range<usize>, text: &str) {
        self.directives
            .add_comment(self.content, &self.lines, range, text);
    }

    fn location(&self, offset: usize) -> SkipLocation {
        SkipLocation {
            file_path: self.file_path.to_string(),
            position: self.lines.position(self.content, offset),
        }
    }

    pub fn reject(
        &mut self,
        offset: usize,
        text: Option<String>,
        reason: RejectReason,
        detail: Option<String>,
    ) {
        let location = self.location(offset);
        self.out.skipped.push(SkippedCandidate {
            text,
            reason,
            location: Some(location),
            detail,
        });
    }

    /// Run an offered node through directives and text rules.
    pub fn offer(&mut self, offer: Offer) {
        let Some(raw_text) = self.content.get(offer.span.clone()) else {
            self.reject(
                offer.span.start.min(self.content.len()),
                Some(offer.text.trim().to_string()),
                RejectReason::NonLiteral,
                Some(format!(
                    "span {}..{} is outside the source",
                    offer.span.start, offer.span.end
                )),
            );
            return;
        };
        let position = self.lines.position(self.content, offer.span.start);

        let directive = self.directives.get(position.line).or(offer.marker);
        if directive == Some(Directive::Skip) {
            self.reject(
                offer.span.start,
                Some(offer.text.trim().to_string()),
                RejectReason::DirectiveSkip,
                None,
            );
            return;
        }
        let forced = directive == Some(Directive::Force);

        let rules = &self.options.rules;
        let normalized = rules.normalize(&offer.text, offer.markup);
        let judged = offer
            .heuristic_text
            .as_deref()
            .map(|t| rules.normalize(t, offer.markup))
            .unwrap_or_else(|| normalized.clone());

        if let Err(reason) = rules.check(&judged, forced) {
            self.reject(offer.span.start, Some(normalized), reason, None);
            return;
        }
        if offer.kind == CandidateKind::CallArgument
            && !forced
            && !text::looks_like_sentence(&normalized)
        {
            self.reject(
                offer.span.start,
                Some(normalized),
                RejectReason::NonSentence,
                Some("call argument without whitespace".to_string()),
            );
            return;
        }

        self.out.candidates.push(ExtractionCandidate {
            id: format!("{}:{}", self.file_path, position),
            file_path: self.file_path.to_string(),
            position,
            kind: offer.kind,
            site: offer.site,
            span: offer.span,
            raw_text: raw_text.to_string(),
            normalized_text: normalized,
            context: offer.context,
            forced,
            expression_type: offer.expression_type,
            strategy: offer.strategy,
            interpolation: offer.interpolation,
            suggested_key: None,
            hash: None,
            status: CandidateStatus::Pending,
        });
    }

    /// Offer an expression given its classifier verdict.
    ///
    /// Returns `false` when the verdict is a conditional or fallback whose
    /// literal branches the caller should offer one by one.
    pub fn offer_analysis(
        &mut self,
        analysis: ExpressionAnalysis,
        site: CallSite,
        span: Range<usize>,
        context: &str,
        marker: Option<Directive>,
    ) -> bool {
        match analysis.expression_type {
            ExpressionType::ConditionalStrings | ExpressionType::LogicalWithFallback => false,
            ExpressionType::PureDynamic => {
                let text = self.content.get(span.clone()).map(str::to_string);
                self.reject(
                    span.start,
                    text,
                    RejectReason::NonLiteral,
                    Some(ExpressionType::PureDynamic.as_str().to_string()),
                );
                true
            }
            ExpressionType::Empty => {
                self.reject(span.start, None, RejectReason::Empty, None);
                true
            }
            ExpressionType::NonTranslatable => {
                let detail = analysis
                    .skip_reason
                    .map(|r| r.as_str().to_string())
                    .unwrap_or_else(|| ExpressionType::NonTranslatable.as_str().to_string());
                let text = analysis
                    .static_value
                    .clone()
                    .or_else(|| self.content.get(span.clone()).map(str::to_string));
                self.reject(span.start, text, RejectReason::NonSentence, Some(detail));
                true
            }
            _ => {
                let interpolation = analysis
                    .interpolation()
                    .map(|i| self.options.rules.normalize_interpolation(i));
                let text = match &interpolation {
                    Some(interpolation) => Some(interpolation.template()),
                    None => analysis.message_text(),
                };
                let Some(text) = text else {
                    let raw = self.content.get(span.clone()).map(str::to_string);
                    self.reject(
                        span.start,
                        raw,
                        RejectReason::NonLiteral,
                        Some(format!(
                            "{} without message text",
                            analysis.expression_type.as_str()
                        )),
                    );
                    return true;
                };
                let heuristic_text = interpolation.as_ref().map(|i| i.static_text());
                self.offer(Offer {
                    kind: CandidateKind::Expression,
                    site,
                    span,
                    text,
                    heuristic_text,
                    context: context.to_string(),
                    markup: false,
                    marker,
                    expression_type: Some(analysis.expression_type),
                    strategy: analysis.suggestion,
                    interpolation,
                });
                true
            }
        }
    }

    pub fn finish(mut self) -> FileScan {
        self.out
            .candidates
            .sort_by_key(|c| (c.span.start, c.span.end));
        self.out.skipped.sort_by_key(|s| {
            s.location
                .as_ref()
                .map(|l| l.position)
                .unwrap_or(crate::core::source::Position::new(0, 0))
        });
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_offer_outside_source_is_rejected() {
        let options = ScanOptions::default();
        let mut collector = Collector::new("src/A.tsx", "<p>Hi</p>\n", &options);
        collector.offer(Offer::literal(
            CandidateKind::BareText,
            CallSite::Jsx,
            40..52,
            "Stale text".to_string(),
            "p".to_string(),
        ));

        let scan = collector.finish();
        assert!(scan.candidates.is_empty());
        assert_eq!(scan.skipped.len(), 1);
        assert_eq!(scan.skipped[0].reason, RejectReason::NonLiteral);
        assert_eq!(scan.skipped[0].text.as_deref(), Some("Stale text"));
        assert!(
            scan.skipped[0]
                .detail
                .as_deref()
                .is_some_and(|d| d.contains("outside the source"))
        );
    }

    #[test]
    fn test_verdict_without_message_text_is_rejected() {
        let options = ScanOptions::default();
        let content = "const a = x + y;\n";
        let mut collector = Collector::new("src/a.ts", content, &options);
        // A rewriting verdict that carries no static value.
        let analysis = ExpressionAnalysis::new(
            ExpressionType::StaticConcatenation,
            MergeStrategy::MergeAndReplace,
        );

        assert!(collector.offer_analysis(analysis, CallSite::Script, 10..15, "script", None));

        let scan = collector.finish();
        assert!(scan.candidates.is_empty());
        assert_eq!(scan.skipped.len(), 1);
        assert_eq!(scan.skipped[0].reason, RejectReason::NonLiteral);
        assert_eq!(scan.skipped[0].text.as_deref(), Some("x + y"));
        assert_eq!(
            scan.skipped[0].detail.as_deref(),
            Some("static-concatenation without message text")
        );
    }

    #[test]
    fn test_template_whitespace_matches_message_text() {
        let content = "const A = ({ name }) => <p>{`Hello   ${name},\n    welcome`}</p>;\n";
        let scan = scan_source("src/A.tsx", content, &ScanOptions::default()).unwrap();

        assert_eq!(scan.candidates.len(), 1);
        let candidate = &scan.candidates[0];
        assert_eq!(candidate.normalized_text, "Hello {name}, welcome");
        assert_eq!(
            candidate.interpolation.as_ref().map(|i| i.template()),
            Some(candidate.normalized_text.clone())
        );
    }
}
