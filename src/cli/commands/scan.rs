use anyhow::Result;

use super::helper::Workspace;
use super::{CommandResult, CommandSummary, ScanSummary};
use crate::cli::args::ScanCommand;
use crate::core::keys::KeyGenerator;
use crate::core::writer::assign_keys;

pub fn scan(cmd: ScanCommand) -> Result<CommandResult> {
    let mut workspace = Workspace::open(&cmd.common)?;
    let mut candidates = workspace.session.scan_candidates();
    assign_keys(
        &mut candidates,
        &KeyGenerator::from_config(workspace.config()),
    );

    let skipped = if cmd.explain {
        workspace.session.skip_log().to_vec()
    } else {
        Vec::new()
    };

    workspace.finish(
        CommandSummary::Scan(ScanSummary {
            candidates,
            skipped,
            explain: cmd.explain,
        }),
        Vec::new(),
        Vec::new(),
        cmd.common.fail_on,
    )
}
