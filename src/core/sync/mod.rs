//! Sync reconciler.
//!
//! Compares the keys used in code with the source locale, checks every
//! target locale against it, and optionally stages the resulting additions
//! and removals in the locale store, either to preview them as diffs or to
//! write them.

pub mod diff;
pub mod humanize;
pub mod key_globs;
pub mod placeholders;
pub mod plan;
pub mod reconciler;

use std::collections::BTreeMap;

use anyhow::Result;
use tracing::debug;

pub use diff::{LocaleDiff, locale_diff};
pub use humanize::humanize_key;
pub use key_globs::KeyGlob;
pub use placeholders::PlaceholderPatterns;
pub use plan::{AppliedChanges, WritePolicy};
pub use reconciler::{
    EmptyReason, EmptyValueViolation, MissingKey, PlaceholderIssue, SyncInput, SyncOptions,
    SyncSummary, reconcile,
};

use crate::config::Config;
use crate::core::extract::{DynamicKeyWarning, TranslationReference};
use crate::locale::{FlushStats, JsonLocaleStore, LocaleDocument, LocaleStoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Report only.
    #[default]
    Check,
    /// Stage changes and render them as diffs; nothing is written.
    Diff,
    /// Stage changes and flush them.
    Write,
}

#[derive(Debug, Clone, Default)]
pub struct SyncRequest {
    pub mode: SyncMode,
    pub policy: WritePolicy,
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub summary: SyncSummary,
    pub applied: Option<AppliedChanges>,
    pub flushed: BTreeMap<String, FlushStats>,
    /// Locales whose write failed; their files are unchanged.
    pub write_errors: Vec<(String, LocaleStoreError)>,
}

/// Target locales: the configured list, or every locale file except the
/// source.
pub fn target_locales(config: &Config, store: &JsonLocaleStore) -> Result<Vec<String>> {
    if !config.target_locales.is_empty() {
        return Ok(config
            .target_locales
            .iter()
            .filter(|l| **l != config.source_locale)
            .cloned()
            .collect());
    }
    Ok(store
        .available_locales()?
        .into_iter()
        .filter(|l| *l != config.source_locale)
        .collect())
}

pub fn run(
    store: &mut JsonLocaleStore,
    references: &[TranslationReference],
    dynamic_key_warnings: &[DynamicKeyWarning],
    config: &Config,
    request: &SyncRequest,
) -> Result<SyncReport> {
    let options = SyncOptions::from_config(config)?;
    let source_locale = config.source_locale.as_str();
    let targets = target_locales(config, store)?;

    let source = store.get(source_locale)?.clone();
    let target_docs: Vec<(String, LocaleDocument)> = targets
        .iter()
        .map(|locale| Ok((locale.clone(), store.get(locale)?.clone())))
        .collect::<Result<_, LocaleStoreError>>()?;

    let mut report = SyncReport {
        summary: reconcile(
            &SyncInput {
                references,
                dynamic_key_warnings,
                source: &source,
                targets: &target_docs,
            },
            &options,
        ),
        ..SyncReport::default()
    };
    debug!(
        missing = report.summary.missing_keys.len(),
        unused = report.summary.unused_keys.len(),
        "reconciled"
    );

    if request.mode == SyncMode::Check {
        return Ok(report);
    }

    let applied = plan::apply(
        store,
        source_locale,
        &targets,
        &report.summary,
        &request.policy,
    )?;
    report.applied = Some(applied);

    match request.mode {
        SyncMode::Diff => {
            report.summary.diffs = std::iter::once(source_locale)
                .chain(targets.iter().map(String::as_str))
                .filter_map(|locale| {
                    let (before, after) = store.snapshot(locale)?;
                    Some(locale_diff(locale, before, after))
                })
                .filter(|diff| !diff.is_empty())
                .collect();
        }
        SyncMode::Write => {
            for (locale, result) in store.flush() {
                match result {
                    Ok(stats) => {
                        report.flushed.insert(locale, stats);
                    }
                    Err(e) => report.write_errors.push((locale, e)),
                }
            }
        }
        SyncMode::Check => {}
    }

    Ok(report)
}
