use std::collections::HashMap;

use anyhow::Result;

use super::helper::{Workspace, flush_renamed, rewrite_code_references};
use super::{AuditSummary, CommandResult, CommandSummary};
use crate::cli::args::AuditCommand;
use crate::core::keys::{KeyGenerator, audit_keys};
use crate::core::writer::{KeyMapping, rename_keys};
use crate::issues::{Issue, SuspiciousKeyIssue};

pub fn audit(cmd: AuditCommand) -> Result<CommandResult> {
    let mut workspace = Workspace::open(&cmd.common)?;
    let config = workspace.config().clone();
    let scan = workspace.session.collect_references();

    let mut origins: HashMap<String, String> = HashMap::new();
    for reference in scan.references() {
        origins
            .entry(reference.key)
            .or_insert(reference.file_path);
    }

    let source = workspace.store.get(&config.source_locale)?.clone();
    let audits = audit_keys(
        source.iter(),
        &origins,
        &KeyGenerator::from_config(&config),
    );
    let fixable: Vec<KeyMapping> = audits
        .iter()
        .filter_map(|a| a.suggestion.as_ref().map(|s| KeyMapping::new(&a.key, s)))
        .collect();

    let mut errors = Vec::new();
    let mut renamed = 0;
    let mut references_rewritten = 0;
    let mut fixed = false;
    if cmd.fix && !fixable.is_empty() {
        let locales = workspace.locales()?;
        renamed = rename_keys(&mut workspace.store, &locales, &fixable)?;
        let flush_errors = flush_renamed(&mut workspace.store);
        if flush_errors.is_empty() {
            references_rewritten =
                rewrite_code_references(&workspace, &scan, &fixable, &mut errors);
            fixed = true;
        } else {
            errors.extend(flush_errors);
        }
    }

    let issues: Vec<Issue> = audits
        .into_iter()
        .filter(|a| !(fixed && a.suggestion.is_some()))
        .map(|audit| {
            Issue::from(SuspiciousKeyIssue {
                locale: config.source_locale.clone(),
                audit,
            })
        })
        .collect();

    workspace.finish(
        CommandSummary::Audit(AuditSummary {
            fixable,
            is_fix: cmd.fix,
            renamed,
            references_rewritten,
        }),
        issues,
        errors,
        cmd.common.fail_on,
    )
}
