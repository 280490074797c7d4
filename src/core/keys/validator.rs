use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;

use super::generator::{KeyContext, KeyGenerator};
use crate::core::scan::CandidateKind;

/// Why a key breaks the dot-delimited naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuspicionReason {
    /// `t('Save your changes')`: a sentence used as key.
    ContainsWhitespace,
    /// `t('save')`: a single word without a namespace.
    MissingNamespace,
    /// `a..b`, `.a`, `a.`
    EmptySegment,
    InvalidCharacters,
    /// The stored value repeats the key.
    ValueAsKey,
}

impl SuspicionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContainsWhitespace => "contains-whitespace",
            Self::MissingNamespace => "missing-namespace",
            Self::EmptySegment => "empty-segment",
            Self::InvalidCharacters => "invalid-characters",
            Self::ValueAsKey => "value-as-key",
        }
    }
}

impl fmt::Display for SuspicionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyVerdict {
    pub suspicious: bool,
    pub reason: Option<SuspicionReason>,
}

impl KeyVerdict {
    fn ok() -> Self {
        Self {
            suspicious: false,
            reason: None,
        }
    }

    fn flag(reason: SuspicionReason) -> Self {
        Self {
            suspicious: true,
            reason: Some(reason),
        }
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

/// Judge `key` against the naming convention, using its locale value when
/// one is known.
pub fn analyze_with_value(key: &str, value: Option<&str>) -> KeyVerdict {
    if key.chars().any(char::is_whitespace) {
        return KeyVerdict::flag(SuspicionReason::ContainsWhitespace);
    }
    if !key.contains('.') {
        return KeyVerdict::flag(SuspicionReason::MissingNamespace);
    }
    if key.split('.').any(str::is_empty) {
        return KeyVerdict::flag(SuspicionReason::EmptySegment);
    }
    if !key.chars().all(is_key_char) {
        return KeyVerdict::flag(SuspicionReason::InvalidCharacters);
    }
    if value.is_some_and(|v| v.trim() == key) {
        return KeyVerdict::flag(SuspicionReason::ValueAsKey);
    }
    KeyVerdict::ok()
}

/// Replacement for a suspicious key, generated from the text it stands for:
/// the locale value when there is a real one, otherwise the key itself.
pub fn suggest_fix(
    key: &str,
    value: Option<&str>,
    file_path: Option<&str>,
    generator: &KeyGenerator,
) -> String {
    let text = value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != key)
        .unwrap_or(key);
    generator
        .generate(
            text,
            KeyContext {
                file_path: file_path.unwrap_or(""),
                kind: CandidateKind::CallArgument,
            },
        )
        .key
}

/// One flagged key with its proposed replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyAudit {
    pub key: String,
    pub reason: SuspicionReason,
    /// `None` when the suggestion would collide with an existing key or
    /// with another suggestion.
    pub suggestion: Option<String>,
}

/// Audit every `(key, value)` entry of a source locale.
///
/// `origins` maps keys to the file of their first reference, which gives
/// suggestions a context path.
pub fn audit_keys<'a>(
    entries: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
    origins: &HashMap<String, String>,
    generator: &KeyGenerator,
) -> Vec<KeyAudit> {
    let entries: Vec<(&str, Option<&str>)> = entries.into_iter().collect();
    let existing: BTreeSet<&str> = entries.iter().map(|(k, _)| *k).collect();
    let mut claimed: BTreeSet<String> = BTreeSet::new();

    let mut audits = Vec::new();
    for (key, value) in entries {
        let verdict = analyze_with_value(key, value);
        let Some(reason) = verdict.reason else {
            continue;
        };
        let candidate = suggest_fix(key, value, origins.get(key).map(String::as_str), generator);
        let suggestion = if existing.contains(candidate.as_str()) || claimed.contains(&candidate) {
            None
        } else {
            claimed.insert(candidate.clone());
            Some(candidate)
        };
        audits.push(KeyAudit {
            key: key.to_string(),
            reason,
            suggestion,
        });
    }
    audits.sort_by(|a, b| a.key.cmp(&b.key));
    audits
}
