use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::core::source::Position;

/// A statically resolved use of a translation key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationReference {
    pub key: String,
    pub file_path: String,
    /// Position of the key literal.
    pub position: Position,
    /// Byte range of the key literal, quotes included.
    pub key_span: Range<usize>,
    /// In-code default, e.g. `t('k') || 'Label'`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_literal: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DynamicReason {
    /// `` t(`nav.${section}`) ``
    Template,
    /// `t('nav.' + section)`
    Binary,
    /// `t(key)`, `t(keys[i])`, ...
    Expression,
}

impl std::fmt::Display for DynamicReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DynamicReason::Template => write!(f, "template"),
            DynamicReason::Binary => write!(f, "binary"),
            DynamicReason::Expression => write!(f, "expression"),
        }
    }
}

/// A translation call whose key is not a literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicKeyWarning {
    pub file_path: String,
    pub position: Position,
    /// Source text of the key argument.
    pub expression: String,
    pub reason: DynamicReason,
}

/// Extractor output for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReferences {
    pub references: Vec<TranslationReference>,
    pub dynamic_key_warnings: Vec<DynamicKeyWarning>,
}

impl FileReferences {
    pub fn sort(&mut self) {
        self.references
            .sort_by(|a, b| a.key_span.start.cmp(&b.key_span.start).then(a.key.cmp(&b.key)));
        self.dynamic_key_warnings
            .sort_by(|a, b| a.position.cmp(&b.position));
    }

    pub fn extend(&mut self, other: FileReferences) {
        self.references.extend(other.references);
        self.dynamic_key_warnings.extend(other.dynamic_key_warnings);
    }
}
