//! Batch key renames across locales and code.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::core::extract::TranslationReference;
use crate::locale::{JsonLocaleStore, LocaleStoreError, RenameOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyMapping {
    pub from: String,
    pub to: String,
}

impl KeyMapping {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Validate the whole mapping set, then rename in every locale.
///
/// Duplicate sources, duplicate destinations and destinations that already
/// exist in any locale reject the batch before anything changes.
pub fn rename_keys(
    store: &mut JsonLocaleStore,
    locales: &[String],
    mappings: &[KeyMapping],
) -> Result<usize, LocaleStoreError> {
    let mut sources = BTreeSet::new();
    let mut destinations = BTreeSet::new();
    for mapping in mappings {
        if !sources.insert(mapping.from.as_str()) {
            return Err(LocaleStoreError::DuplicateMapping {
                key: mapping.from.clone(),
            });
        }
        if !destinations.insert(mapping.to.as_str()) {
            return Err(LocaleStoreError::DuplicateMapping {
                key: mapping.to.clone(),
            });
        }
    }

    for locale in locales {
        let document = store.get(locale)?;
        for mapping in mappings {
            // A destination freed by another mapping in the batch is not a
            // collision, but chains are refused to keep renames order-free.
            if mapping.from != mapping.to
                && (document.contains_key(&mapping.to) || sources.contains(mapping.to.as_str()))
            {
                return Err(LocaleStoreError::DuplicateMapping {
                    key: mapping.to.clone(),
                });
            }
        }
    }

    let mut renamed = 0;
    for locale in locales {
        for mapping in mappings {
            if store.rename_key(locale, &mapping.from, &mapping.to)? == RenameOutcome::Renamed {
                renamed += 1;
            }
        }
    }
    Ok(renamed)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceRewrite {
    pub content: String,
    pub applied: usize,
    /// References whose recorded literal no longer matched.
    pub stale: usize,
}

/// Rewrite the key literal of every reference covered by `mappings`,
/// keeping the original quote character.
pub fn rewrite_references(
    content: &str,
    references: &[TranslationReference],
    mappings: &[KeyMapping],
) -> ReferenceRewrite {
    let targets: BTreeMap<&str, &str> = mappings
        .iter()
        .map(|m| (m.from.as_str(), m.to.as_str()))
        .collect();

    let mut matching: Vec<&TranslationReference> = references
        .iter()
        .filter(|r| targets.contains_key(r.key.as_str()))
        .collect();
    matching.sort_by(|a, b| b.key_span.start.cmp(&a.key_span.start));

    let mut text = content.to_string();
    let mut result = ReferenceRewrite::default();
    for reference in matching {
        let Some(to) = targets.get(reference.key.as_str()) else {
            continue;
        };
        let Some(literal) = text.get(reference.key_span.clone()) else {
            result.stale += 1;
            continue;
        };
        let mut chars = literal.chars();
        let (Some(open), Some(close)) = (chars.next(), chars.next_back()) else {
            result.stale += 1;
            continue;
        };
        let body = &literal[open.len_utf8()..literal.len() - close.len_utf8()];
        if open != close || !matches!(open, '\'' | '"' | '`') || body != reference.key {
            result.stale += 1;
            continue;
        }
        let replacement = format!("{}{}{}", open, to, close);
        text.replace_range(reference.key_span.clone(), &replacement);
        result.applied += 1;
    }
    result.content = text;
    result
}
