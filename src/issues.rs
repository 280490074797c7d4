//! Issue types for reconciliation and audit results.
//!
//! Each issue wraps the core value it reports and carries everything the
//! reporter needs: a location, a message, a severity and a rule name.

use std::cmp::Ordering;

use enum_dispatch::enum_dispatch;

use crate::core::FileWarning;
use crate::core::extract::DynamicKeyWarning;
use crate::core::keys::KeyAudit;
use crate::core::source::Position;
use crate::core::sync::{EmptyValueViolation, MissingKey, PlaceholderIssue, SyncSummary};

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of an issue, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    MissingKey,
    PlaceholderMismatch,
    UnusedKey,
    EmptyValue,
    SuspiciousKey,
    DynamicKey,
    ParseError,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::MissingKey => write!(f, "missing-key"),
            Rule::PlaceholderMismatch => write!(f, "placeholder-mismatch"),
            Rule::UnusedKey => write!(f, "unused-key"),
            Rule::EmptyValue => write!(f, "empty-value"),
            Rule::SuspiciousKey => write!(f, "suspicious-key"),
            Rule::DynamicKey => write!(f, "dynamic-key"),
            Rule::ParseError => write!(f, "parse-error"),
        }
    }
}

/// Where an issue points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLocation<'a> {
    /// A position in a source file.
    Source {
        file_path: &'a str,
        position: Position,
    },
    /// An entry of a locale document.
    Locale { locale: &'a str, key: &'a str },
    /// A whole file.
    File { path: &'a str },
}

// ============================================================
// Issue types without a core counterpart
// ============================================================

/// Key defined in the source locale but not used in code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusedKeyIssue {
    pub locale: String,
    pub key: String,
}

// ============================================================
// Report trait
// ============================================================

/// Common interface of every issue, dispatched through [`Issue`].
#[enum_dispatch]
pub trait Report {
    fn location(&self) -> ReportLocation<'_>;

    fn message(&self) -> String;

    fn report_severity(&self) -> Severity;

    fn report_rule(&self) -> Rule;

    fn details(&self) -> Option<String> {
        None
    }

    fn hint(&self) -> Option<String> {
        None
    }
}

impl Report for MissingKey {
    fn location(&self) -> ReportLocation<'_> {
        match self.references.first() {
            Some(r) => ReportLocation::Source {
                file_path: &r.file_path,
                position: r.position,
            },
            None => ReportLocation::File { path: &self.key },
        }
    }

    fn message(&self) -> String {
        self.key.clone()
    }

    fn report_severity(&self) -> Severity {
        Severity::Error
    }

    fn report_rule(&self) -> Rule {
        Rule::MissingKey
    }

    fn details(&self) -> Option<String> {
        match self.references.len() {
            0 => Some("assumed key not defined in the source locale".to_string()),
            1 => None,
            n => Some(format!("used in {} places", n)),
        }
    }

    fn hint(&self) -> Option<String> {
        self.fallback_literal()
            .map(|fallback| format!("in-code default: \"{}\"", fallback))
    }
}

impl Report for PlaceholderIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Locale {
            locale: &self.locale,
            key: &self.key,
        }
    }

    fn message(&self) -> String {
        self.key.clone()
    }

    fn report_severity(&self) -> Severity {
        Severity::Error
    }

    fn report_rule(&self) -> Rule {
        Rule::PlaceholderMismatch
    }

    fn details(&self) -> Option<String> {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("missing {}", self.missing.join(", ")));
        }
        if !self.extra.is_empty() {
            parts.push(format!("unexpected {}", self.extra.join(", ")));
        }
        Some(parts.join("; "))
    }
}

impl Report for UnusedKeyIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Locale {
            locale: &self.locale,
            key: &self.key,
        }
    }

    fn message(&self) -> String {
        self.key.clone()
    }

    fn report_severity(&self) -> Severity {
        Severity::Warning
    }

    fn report_rule(&self) -> Rule {
        Rule::UnusedKey
    }
}

impl Report for EmptyValueViolation {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Locale {
            locale: &self.locale,
            key: &self.key,
        }
    }

    fn message(&self) -> String {
        self.key.clone()
    }

    fn report_severity(&self) -> Severity {
        Severity::Warning
    }

    fn report_rule(&self) -> Rule {
        Rule::EmptyValue
    }

    fn details(&self) -> Option<String> {
        Some(format!("value is {}", self.reason.as_str()))
    }

    fn hint(&self) -> Option<String> {
        self.fallback_literal
            .as_ref()
            .map(|fallback| format!("in-code default: \"{}\"", fallback))
    }
}

/// Audits carry the source locale through [`SuspiciousKeyIssue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspiciousKeyIssue {
    pub locale: String,
    pub audit: KeyAudit,
}

impl Report for SuspiciousKeyIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Locale {
            locale: &self.locale,
            key: &self.audit.key,
        }
    }

    fn message(&self) -> String {
        self.audit.key.clone()
    }

    fn report_severity(&self) -> Severity {
        Severity::Warning
    }

    fn report_rule(&self) -> Rule {
        Rule::SuspiciousKey
    }

    fn details(&self) -> Option<String> {
        Some(self.audit.reason.to_string())
    }

    fn hint(&self) -> Option<String> {
        self.audit
            .suggestion
            .as_ref()
            .map(|s| format!("rename to \"{}\"", s))
    }
}

impl Report for DynamicKeyWarning {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source {
            file_path: &self.file_path,
            position: self.position,
        }
    }

    fn message(&self) -> String {
        self.expression.clone()
    }

    fn report_severity(&self) -> Severity {
        Severity::Info
    }

    fn report_rule(&self) -> Rule {
        Rule::DynamicKey
    }

    fn details(&self) -> Option<String> {
        Some(format!("{} key cannot be resolved statically", self.reason))
    }

    fn hint(&self) -> Option<String> {
        Some("cover it with a 'dynamicKeyGlobs' pattern".to_string())
    }
}

impl Report for FileWarning {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
        }
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn report_severity(&self) -> Severity {
        Severity::Warning
    }

    fn report_rule(&self) -> Rule {
        Rule::ParseError
    }
}

// ============================================================
// Issue enum
// ============================================================

#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq)]
pub enum Issue {
    MissingKey(MissingKey),
    PlaceholderMismatch(PlaceholderIssue),
    UnusedKey(UnusedKeyIssue),
    EmptyValue(EmptyValueViolation),
    SuspiciousKey(SuspiciousKeyIssue),
    DynamicKey(DynamicKeyWarning),
    ParseError(FileWarning),
}

impl Issue {
    fn sort_key(&self) -> (u8, &str, usize, usize) {
        match self.location() {
            ReportLocation::Source {
                file_path,
                position,
            } => (0, file_path, position.line, position.col),
            ReportLocation::Locale { locale, .. } => (1, locale, 0, 0),
            ReportLocation::File { path } => (2, path, 0, 0),
        }
    }
}

impl Eq for Issue {}

impl Ord for Issue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.report_rule().cmp(&other.report_rule()))
            .then_with(|| self.message().cmp(&other.message()))
    }
}

impl PartialOrd for Issue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ============================================================
// Severity counts
// ============================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl SeverityCounts {
    pub fn from_issues<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let mut counts = Self::default();
        for issue in issues {
            counts.add(issue.report_severity(), 1);
        }
        counts
    }

    fn add(&mut self, severity: Severity, n: usize) {
        match severity {
            Severity::Error => self.errors += n,
            Severity::Warning => self.warnings += n,
            Severity::Info => self.infos += n,
        }
    }

    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.infos
    }

    /// Most severe level present.
    pub fn highest(&self) -> Option<Severity> {
        if self.errors > 0 {
            Some(Severity::Error)
        } else if self.warnings > 0 {
            Some(Severity::Warning)
        } else if self.infos > 0 {
            Some(Severity::Info)
        } else {
            None
        }
    }
}

impl SyncSummary {
    /// Missing keys and placeholder mismatches are errors; unused keys,
    /// empty values and suspicious keys are warnings; dynamic keys are info.
    pub fn severity_counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        counts.add(
            Severity::Error,
            self.missing_keys.len() + self.placeholder_issues.len(),
        );
        counts.add(
            Severity::Warning,
            self.unused_keys.len() + self.empty_value_violations.len() + self.suspicious_keys.len(),
        );
        counts.add(Severity::Info, self.dynamic_key_warnings.len());
        counts
    }

    /// One issue per finding. Unused and suspicious keys point into
    /// `source_locale`.
    pub fn issues(&self, source_locale: &str) -> Vec<Issue> {
        let mut issues: Vec<Issue> = Vec::new();
        issues.extend(self.missing_keys.iter().cloned().map(Issue::from));
        issues.extend(self.placeholder_issues.iter().cloned().map(Issue::from));
        issues.extend(self.unused_keys.iter().map(|key| {
            Issue::from(UnusedKeyIssue {
                locale: source_locale.to_string(),
                key: key.clone(),
            })
        }));
        issues.extend(self.empty_value_violations.iter().cloned().map(Issue::from));
        issues.extend(self.suspicious_keys.iter().map(|audit| {
            Issue::from(SuspiciousKeyIssue {
                locale: source_locale.to_string(),
                audit: audit.clone(),
            })
        }));
        issues.extend(self.dynamic_key_warnings.iter().cloned().map(Issue::from));
        issues
    }
}

// ============================================================
// Tests
// ============================================================
