use std::collections::BTreeSet;

use anyhow::Result;

use super::helper::{Workspace, write_error};
use super::{CommandResult, CommandSummary, SyncOutcome};
use crate::cli::args::SyncCommand;
use crate::config::Retention;
use crate::core::sync::{self, SyncMode, SyncRequest, WritePolicy};
use crate::issues::Issue;

pub fn sync(cmd: SyncCommand) -> Result<CommandResult> {
    let mut workspace = Workspace::open(&cmd.common)?;
    let scan = workspace.session.collect_references();
    let config = workspace.config().clone();

    let mut policy = WritePolicy::from_config(&config);
    if cmd.prune {
        policy.retention = Retention::Prune;
    }
    if let Some(seed) = cmd.seed {
        policy.seed = seed.into();
    }
    if !cmd.select.is_empty() {
        policy.selection = Some(cmd.select.iter().cloned().collect());
    }

    let mode = if cmd.write {
        SyncMode::Write
    } else if cmd.diff {
        SyncMode::Diff
    } else {
        SyncMode::Check
    };

    let report = sync::run(
        &mut workspace.store,
        &scan.references(),
        &scan.dynamic_key_warnings(),
        &config,
        &SyncRequest { mode, policy },
    )?;

    let mut issues = report.summary.issues(&config.source_locale);
    let errors: Vec<String> = report
        .write_errors
        .iter()
        .map(|(locale, e)| write_error(locale, e))
        .collect();

    // Findings a successful write resolved are no longer reported.
    if let Some(applied) = &report.applied
        && mode == SyncMode::Write
        && report.flushed.contains_key(&config.source_locale)
    {
        let added: BTreeSet<&str> = applied.added.iter().map(|(k, _)| k.as_str()).collect();
        let removed: BTreeSet<&str> = applied.removed.iter().map(String::as_str).collect();
        issues.retain(|issue| match issue {
            Issue::MissingKey(missing) => !added.contains(missing.key.as_str()),
            Issue::UnusedKey(unused) => !removed.contains(unused.key.as_str()),
            _ => true,
        });
    }

    workspace.finish(
        CommandSummary::Sync(SyncOutcome {
            mode,
            applied: report.applied,
            flushed: report.flushed,
            diffs: report.summary.diffs,
        }),
        issues,
        errors,
        cmd.common.fail_on,
    )
}
