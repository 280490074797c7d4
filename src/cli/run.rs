//! Dispatches parsed arguments to the command handlers.

use std::env;

use anyhow::{Context, Result};

use super::{
    args::{Arguments, Command},
    commands::{
        audit::audit, init::init, rename::rename, scan::scan, sync::sync, transform::transform,
    },
    exit_status::ExitStatus,
    report,
};

pub fn run(Arguments { command }: Arguments) -> Result<ExitStatus> {
    let result = match command {
        Some(Command::Scan(cmd)) => scan(cmd)?,
        Some(Command::Transform(cmd)) => transform(cmd)?,
        Some(Command::Sync(cmd)) => sync(cmd)?,
        Some(Command::Audit(cmd)) => audit(cmd)?,
        Some(Command::Rename(cmd)) => rename(cmd)?,
        Some(Command::Init) => {
            let cwd = env::current_dir().context("Failed to determine working directory")?;
            return init(&cwd);
        }
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    };

    report::print(&result);
    Ok(result.exit_status())
}
