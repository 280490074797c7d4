use std::{collections::BTreeMap, fs};

use anyhow::Result;
use tracing::debug;

use super::helper::{Workspace, split_flush};
use super::{CommandResult, CommandSummary, FileChange, TransformSummary};
use crate::cli::args::TransformCommand;
use crate::core::keys::KeyGenerator;
use crate::core::scan::ExtractionCandidate;
use crate::core::writer::{CodemodOptions, assign_keys, rewrite_source};
use crate::fs_utils::write_atomic;
use crate::locale::KeyAction;

/// Rewrites are computed for every file first. With `--write` the source
/// locale is flushed before any source file changes, so a failed locale
/// write leaves the code untouched.
pub fn transform(cmd: TransformCommand) -> Result<CommandResult> {
    let mut workspace = Workspace::open(&cmd.common)?;
    let config = workspace.config().clone();
    let options = CodemodOptions::from_config(&config);

    let mut candidates = workspace.session.scan_candidates();
    assign_keys(&mut candidates, &KeyGenerator::from_config(&config));

    let mut by_file: BTreeMap<String, Vec<ExtractionCandidate>> = BTreeMap::new();
    for candidate in candidates {
        by_file
            .entry(candidate.file_path.clone())
            .or_default()
            .push(candidate);
    }

    let mut errors = Vec::new();
    let mut files = Vec::new();
    let mut rewritten: Vec<(String, String)> = Vec::new();
    let mut keys_added = 0;

    for (file_path, mut candidates) in by_file {
        let path = workspace.session.resolve(&file_path);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                errors.push(format!("failed to read {}: {}", file_path, e));
                continue;
            }
        };

        let rewrite = rewrite_source(&content, &mut candidates, &options);
        debug!(
            file = %file_path,
            applied = rewrite.applied(),
            skipped = rewrite.skipped.len(),
            "rewrite planned"
        );
        for (key, value) in &rewrite.entries {
            if workspace
                .store
                .upsert(&config.source_locale, key, value.clone())?
                == KeyAction::Added
            {
                keys_added += 1;
            }
        }
        if rewrite.applied() > 0 {
            rewritten.push((file_path.clone(), rewrite.content));
        }
        files.push(FileChange {
            file_path,
            candidates,
            skipped: rewrite.skipped,
        });
    }

    if cmd.write {
        let (_, flush_errors) = split_flush(workspace.store.flush());
        if flush_errors.is_empty() {
            for (file_path, content) in &rewritten {
                if let Err(e) = write_atomic(&workspace.session.resolve(file_path), content) {
                    errors.push(format!("{:#}", e));
                }
            }
        } else {
            errors.extend(flush_errors);
        }
    }

    workspace.finish(
        CommandSummary::Transform(TransformSummary {
            files,
            keys_added,
            is_write: cmd.write,
        }),
        Vec::new(),
        errors,
        cmd.common.fail_on,
    )
}
