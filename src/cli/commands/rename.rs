use anyhow::{Result, bail};

use super::helper::{Workspace, flush_renamed, rewrite_code_references};
use super::{CommandResult, CommandSummary, RenameSummary};
use crate::cli::args::RenameCommand;
use crate::core::writer::{KeyMapping, rename_keys};

/// The rename is validated and staged in every case; only `--write`
/// flushes locales and rewrites code.
pub fn rename(cmd: RenameCommand) -> Result<CommandResult> {
    let mut workspace = Workspace::open(&cmd.common)?;
    let mapping = KeyMapping::new(&cmd.from, &cmd.to);
    let all_locales = workspace.locales()?;

    let mut locales = Vec::new();
    for locale in &all_locales {
        if workspace.store.get(locale)?.contains_key(&mapping.from) {
            locales.push(locale.clone());
        }
    }
    if locales.is_empty() {
        bail!("Key '{}' not found in any locale", mapping.from);
    }

    let mappings = [mapping];
    rename_keys(&mut workspace.store, &all_locales, &mappings)?;

    let scan = workspace.session.collect_references();
    let references = scan
        .references()
        .iter()
        .filter(|r| r.key == mappings[0].from)
        .count();

    let mut errors = Vec::new();
    let mut references_rewritten = 0;
    if cmd.write {
        let flush_errors = flush_renamed(&mut workspace.store);
        if flush_errors.is_empty() {
            references_rewritten =
                rewrite_code_references(&workspace, &scan, &mappings, &mut errors);
        } else {
            errors.extend(flush_errors);
        }
    }

    let [mapping] = mappings;
    workspace.finish(
        CommandSummary::Rename(RenameSummary {
            mapping,
            locales,
            references,
            references_rewritten,
            is_write: cmd.write,
        }),
        Vec::new(),
        errors,
        cmd.common.fail_on,
    )
}
