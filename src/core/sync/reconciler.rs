//! Reconciliation of code references against locale documents.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::Result;
use serde::Serialize;

use super::diff::LocaleDiff;
use super::key_globs::{self, KeyGlob};
use super::placeholders::{PlaceholderPatterns, TokenDelta};
use crate::config::Config;
use crate::core::extract::{DynamicKeyWarning, TranslationReference};
use crate::core::keys::{KeyAudit, KeyGenerator, audit_keys};
use crate::locale::LocaleDocument;

/// Why a translation counts as empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyReason {
    /// The key is absent from the target locale.
    Missing,
    Null,
    Empty,
    Whitespace,
    /// A marker such as `TODO` or `TBD`.
    Marker,
}

impl EmptyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Null => "null",
            Self::Empty => "empty",
            Self::Whitespace => "whitespace",
            Self::Marker => "marker",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingKey {
    pub key: String,
    /// Code locations using the key.
    pub references: Vec<TranslationReference>,
}

impl MissingKey {
    /// First in-code fallback literal seen for the key.
    pub fn fallback_literal(&self) -> Option<&str> {
        self.references
            .iter()
            .find_map(|r| r.fallback_literal.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderIssue {
    pub locale: String,
    pub key: String,
    pub missing: Vec<String>,
    pub extra: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyValueViolation {
    pub locale: String,
    pub key: String,
    pub reason: EmptyReason,
    /// Default observed in code, e.g. `t('k') || 'Label'`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_literal: Option<String>,
}

/// Result of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub missing_keys: Vec<MissingKey>,
    pub unused_keys: Vec<String>,
    pub placeholder_issues: Vec<PlaceholderIssue>,
    pub empty_value_violations: Vec<EmptyValueViolation>,
    pub suspicious_keys: Vec<KeyAudit>,
    pub dynamic_key_warnings: Vec<DynamicKeyWarning>,
    pub diffs: Vec<LocaleDiff>,
}

impl SyncSummary {
    pub fn missing_key_names(&self) -> Vec<&str> {
        self.missing_keys.iter().map(|m| m.key.as_str()).collect()
    }
}

/// Reconciliation settings taken from the configuration.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub assumed_keys: BTreeSet<String>,
    pub dynamic_key_globs: Vec<KeyGlob>,
    pub placeholders: PlaceholderPatterns,
    /// Lowercased marker strings.
    pub empty_value_markers: Vec<String>,
    pub generator: KeyGenerator,
}

impl SyncOptions {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            assumed_keys: config.assumed_keys.iter().cloned().collect(),
            dynamic_key_globs: key_globs::compile(&config.dynamic_key_globs)?,
            placeholders: PlaceholderPatterns::new(&config.placeholder_formats)?,
            empty_value_markers: config
                .empty_value_markers
                .iter()
                .map(|m| m.trim().to_lowercase())
                .collect(),
            generator: KeyGenerator::from_config(config),
        })
    }

    fn is_dynamic(&self, key: &str) -> bool {
        key_globs::any_match(&self.dynamic_key_globs, key)
    }

    fn empty_reason(&self, value: Option<&str>) -> Option<EmptyReason> {
        let Some(value) = value else {
            return Some(EmptyReason::Null);
        };
        if value.is_empty() {
            return Some(EmptyReason::Empty);
        }
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Some(EmptyReason::Whitespace);
        }
        let lowered = trimmed.to_lowercase();
        if self.empty_value_markers.iter().any(|m| *m == lowered) {
            return Some(EmptyReason::Marker);
        }
        None
    }
}

/// Everything a reconciliation reads.
pub struct SyncInput<'a> {
    pub references: &'a [TranslationReference],
    pub dynamic_key_warnings: &'a [DynamicKeyWarning],
    pub source: &'a LocaleDocument,
    /// `(locale, document)` for every target locale.
    pub targets: &'a [(String, LocaleDocument)],
}

pub fn reconcile(input: &SyncInput<'_>, options: &SyncOptions) -> SyncSummary {
    let mut by_key: BTreeMap<&str, Vec<&TranslationReference>> = BTreeMap::new();
    for reference in input.references {
        by_key.entry(&reference.key).or_default().push(reference);
    }

    let used: BTreeSet<&str> = by_key
        .keys()
        .copied()
        .chain(options.assumed_keys.iter().map(String::as_str))
        .filter(|key| !options.is_dynamic(key))
        .collect();
    let defined: BTreeSet<&str> = input.source.keys().collect();

    let missing_keys = used
        .difference(&defined)
        .map(|key| MissingKey {
            key: key.to_string(),
            references: by_key
                .get(key)
                .map(|refs| refs.iter().map(|r| (*r).clone()).collect())
                .unwrap_or_default(),
        })
        .collect();

    let unused_keys = defined
        .difference(&used)
        .filter(|key| !options.is_dynamic(key) && !options.assumed_keys.contains(**key))
        .map(|key| key.to_string())
        .collect();

    let fallbacks: HashMap<&str, &str> = by_key
        .iter()
        .filter_map(|(key, refs)| {
            refs.iter()
                .find_map(|r| r.fallback_literal.as_deref())
                .map(|f| (*key, f))
        })
        .collect();

    let mut placeholder_issues = Vec::new();
    let mut empty_value_violations = Vec::new();
    for (locale, target) in input.targets {
        for (key, source_value) in input.source.iter() {
            let target_value = target.get(key);
            let reason = match target_value {
                None => Some(EmptyReason::Missing),
                Some(value) => options.empty_reason(value),
            };
            if let Some(reason) = reason {
                empty_value_violations.push(EmptyValueViolation {
                    locale: locale.clone(),
                    key: key.to_string(),
                    reason,
                    fallback_literal: fallbacks.get(key).map(|f| f.to_string()),
                });
                continue;
            }

            if let (Some(source_value), Some(Some(target_value))) = (source_value, target_value) {
                let delta = TokenDelta::between(
                    &options.placeholders.extract(source_value),
                    &options.placeholders.extract(target_value),
                );
                if !delta.is_empty() {
                    placeholder_issues.push(PlaceholderIssue {
                        locale: locale.clone(),
                        key: key.to_string(),
                        missing: delta.missing,
                        extra: delta.extra,
                    });
                }
            }
        }

        // Keys only the target defines are not translations of anything.
        for (key, value) in target.iter() {
            if input.source.contains_key(key) {
                continue;
            }
            if let Some(reason) = options.empty_reason(value) {
                empty_value_violations.push(EmptyValueViolation {
                    locale: locale.clone(),
                    key: key.to_string(),
                    reason,
                    fallback_literal: fallbacks.get(key).map(|f| f.to_string()),
                });
            }
        }
    }

    let origins: HashMap<String, String> = by_key
        .iter()
        .filter_map(|(key, refs)| refs.first().map(|r| (key.to_string(), r.file_path.clone())))
        .collect();
    let audited: Vec<(&str, Option<&str>)> = by_key
        .keys()
        .filter(|key| !input.source.contains_key(key))
        .map(|key| (*key, None))
        .chain(input.source.iter())
        .collect();
    let suspicious_keys = audit_keys(audited, &origins, &options.generator);

    let mut dynamic_key_warnings = input.dynamic_key_warnings.to_vec();
    dynamic_key_warnings.sort_by(|a, b| {
        a.file_path
            .cmp(&b.file_path)
            .then(a.position.cmp(&b.position))
    });

    SyncSummary {
        missing_keys,
        unused_keys,
        placeholder_issues,
        empty_value_violations,
        suspicious_keys,
        dynamic_key_warnings,
        diffs: Vec::new(),
    }
}
