//! Write semantics: which computed changes reach the locale store.

use std::collections::BTreeSet;

use serde::Serialize;

use super::humanize::humanize_key;
use super::reconciler::SyncSummary;
use crate::config::{Config, Retention, SeedPolicy};
use crate::locale::{JsonLocaleStore, LocaleStoreError};

#[derive(Debug, Clone, Default)]
pub struct WritePolicy {
    pub seed: SeedPolicy,
    pub retention: Retention,
    /// Also add missing keys to target locales, with empty values.
    pub seed_target_locales: bool,
    /// When set, only these keys are added or removed; a selected unused
    /// key is removed whatever the retention.
    pub selection: Option<BTreeSet<String>>,
}

impl WritePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            seed: config.seed_policy,
            retention: config.retention,
            seed_target_locales: config.seed_target_locales,
            selection: None,
        }
    }

    fn admits_addition(&self, key: &str) -> bool {
        self.selection.as_ref().is_none_or(|s| s.contains(key))
    }

    fn admits_removal(&self, key: &str) -> bool {
        match &self.selection {
            Some(selection) => selection.contains(key),
            None => self.retention == Retention::Prune,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedChanges {
    /// `(key, value)` added to the source locale.
    pub added: Vec<(String, String)>,
    pub removed: Vec<String>,
}

/// Stage additions and removals in the store. Nothing touches disk until
/// the store is flushed.
pub fn apply(
    store: &mut JsonLocaleStore,
    source_locale: &str,
    target_locales: &[String],
    summary: &SyncSummary,
    policy: &WritePolicy,
) -> Result<AppliedChanges, LocaleStoreError> {
    let mut applied = AppliedChanges::default();

    for missing in &summary.missing_keys {
        if !policy.admits_addition(&missing.key) {
            continue;
        }
        let value = match policy.seed {
            SeedPolicy::Humanize => missing
                .fallback_literal()
                .map(str::to_string)
                .unwrap_or_else(|| humanize_key(&missing.key)),
            SeedPolicy::Empty => String::new(),
        };
        store.upsert(source_locale, &missing.key, value.clone())?;
        if policy.seed_target_locales {
            for locale in target_locales {
                if store.get(locale)?.contains_key(&missing.key) {
                    continue;
                }
                store.upsert(locale, &missing.key, String::new())?;
            }
        }
        applied.added.push((missing.key.clone(), value));
    }

    for key in &summary.unused_keys {
        if !policy.admits_removal(key) {
            continue;
        }
        store.remove(source_locale, key)?;
        for locale in target_locales {
            store.remove(locale, key)?;
        }
        applied.removed.push(key.clone());
    }

    Ok(applied)
}
