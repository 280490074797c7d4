//! Rewrites approved candidates into translation calls.

use serde::Serialize;

use crate::config::Config;
use crate::core::classify::{DynamicPart, MergeStrategy};
use crate::core::extract::ecma::target_name;
use crate::core::keys::{KeyContext, KeyGenerator};
use crate::core::scan::{CallSite, CandidateKind, CandidateStatus, ExtractionCandidate};

#[derive(Debug, Clone)]
pub struct CodemodOptions {
    pub identifier: String,
    /// Runtime placeholder syntax for locale values, e.g. `{{name}}`.
    pub interpolation_format: String,
}

impl CodemodOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            identifier: config.translation_identifier.clone(),
            interpolation_format: config.interpolation_format.clone(),
        }
    }

    /// Callee used inside component templates: `t` becomes `$t`.
    fn template_callee(&self) -> String {
        if self.identifier.starts_with('$') || self.identifier.contains('.') {
            self.identifier.clone()
        } else {
            format!("${}", target_name(&self.identifier))
        }
    }
}

/// Why a candidate was left in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RewriteSkip {
    /// The recorded span no longer holds the scanned text.
    SpanMismatch,
    /// Overlaps a candidate already rewritten.
    Overlap,
    /// The strategy does not rewrite or no key was assigned.
    NotApproved,
}

impl RewriteSkip {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpanMismatch => "span-mismatch",
            Self::Overlap => "overlap",
            Self::NotApproved => "not-approved",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRewrite {
    pub candidate_id: String,
    pub reason: RewriteSkip,
}

#[derive(Debug, Clone, Default)]
pub struct FileRewrite {
    pub content: String,
    /// `(key, locale value)` of every applied rewrite, in file order.
    pub entries: Vec<(String, String)>,
    pub skipped: Vec<SkippedRewrite>,
}

impl FileRewrite {
    pub fn applied(&self) -> usize {
        self.entries.len()
    }
}

/// Give every rewritable candidate its generated key.
pub fn assign_keys(candidates: &mut [ExtractionCandidate], generator: &KeyGenerator) {
    for candidate in candidates {
        if !candidate.strategy.rewrites() {
            continue;
        }
        let generated = generator.generate(
            &candidate.normalized_text,
            KeyContext {
                file_path: &candidate.file_path,
                kind: candidate.kind,
            },
        );
        candidate.suggested_key = Some(generated.key);
        candidate.hash = Some(generated.hash);
    }
}

/// Value stored in the locale for a candidate.
pub fn locale_value(candidate: &ExtractionCandidate, options: &CodemodOptions) -> String {
    match &candidate.interpolation {
        Some(interpolation) => interpolation.render(&options.interpolation_format),
        None => candidate.normalized_text.clone(),
    }
}

fn params_object(params: &[DynamicPart]) -> String {
    let fields: Vec<String> = params
        .iter()
        .map(|p| {
            if p.expression == p.name {
                p.name.clone()
            } else {
                format!("{}: {}", p.name, p.expression)
            }
        })
        .collect();
    format!("{{ {} }}", fields.join(", "))
}

fn key_call(callee: &str, key: &str, params: Option<&[DynamicPart]>) -> String {
    match params {
        Some(params) if !params.is_empty() => {
            format!("{}('{}', {})", callee, key, params_object(params))
        }
        _ => format!("{}('{}')", callee, key),
    }
}

/// Replacement text for `candidate` in its call-site syntax.
pub fn render_replacement(
    candidate: &ExtractionCandidate,
    key: &str,
    options: &CodemodOptions,
) -> String {
    let params = candidate
        .interpolation
        .as_ref()
        .filter(|_| candidate.strategy == MergeStrategy::Interpolation)
        .map(|i| i.params.as_slice());

    match (candidate.site, candidate.kind) {
        (_, CandidateKind::CallArgument) => format!("'{}'", key),
        (CallSite::Template, CandidateKind::BareText) => {
            format!("{{{{ {} }}}}", key_call(&options.template_callee(), key, None))
        }
        (CallSite::Template, CandidateKind::AttributeValue) => {
            let name = candidate
                .raw_text
                .split_once('=')
                .map(|(name, _)| name.trim())
                .unwrap_or(candidate.raw_text.as_str());
            format!(
                ":{}=\"{}\"",
                name,
                key_call(&options.template_callee(), key, None)
            )
        }
        (CallSite::Template, CandidateKind::Expression) => {
            key_call(&options.template_callee(), key, params)
        }
        (CallSite::Jsx, CandidateKind::BareText | CandidateKind::AttributeValue) => {
            format!("{{{}}}", key_call(&options.identifier, key, None))
        }
        (_, _) => key_call(&options.identifier, key, params),
    }
}

/// Apply every approved candidate of one file, last span first, so earlier
/// spans keep their offsets. Each span is re-read before replacement and
/// left alone when it no longer holds the scanned text.
pub fn rewrite_source(
    content: &str,
    candidates: &mut [ExtractionCandidate],
    options: &CodemodOptions,
) -> FileRewrite {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|a, b| {
        candidates[*b]
            .span
            .start
            .cmp(&candidates[*a].span.start)
            .then(candidates[*b].span.end.cmp(&candidates[*a].span.end))
    });

    let mut text = content.to_string();
    let mut rewrite = FileRewrite::default();
    // Start of the lowest span replaced so far.
    let mut floor = usize::MAX;

    for index in order {
        let candidate = &mut candidates[index];
        if candidate.status != CandidateStatus::Pending {
            continue;
        }
        let key = match (&candidate.suggested_key, candidate.strategy.rewrites()) {
            (Some(key), true) => key.clone(),
            _ => {
                rewrite.skipped.push(SkippedRewrite {
                    candidate_id: candidate.id.clone(),
                    reason: RewriteSkip::NotApproved,
                });
                candidate.status = CandidateStatus::Skipped;
                continue;
            }
        };

        let reason = if candidate.span.end > floor {
            Some(RewriteSkip::Overlap)
        } else if text.get(candidate.span.clone()) != Some(candidate.raw_text.as_str()) {
            Some(RewriteSkip::SpanMismatch)
        } else {
            None
        };
        if let Some(reason) = reason {
            rewrite.skipped.push(SkippedRewrite {
                candidate_id: candidate.id.clone(),
                reason,
            });
            candidate.status = CandidateStatus::Skipped;
            continue;
        }

        let replacement = render_replacement(candidate, &key, options);
        text.replace_range(candidate.span.clone(), &replacement);
        floor = candidate.span.start;
        candidate.status = CandidateStatus::Applied;
        rewrite.entries.push((key, locale_value(candidate, options)));
    }

    rewrite.entries.reverse();
    rewrite.content = text;
    rewrite
}
