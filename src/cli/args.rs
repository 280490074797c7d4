//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `scan`: List extraction candidates (`--explain` adds rejected nodes)
//! - `transform`: Rewrite candidates into translation calls
//! - `sync`: Reconcile code references with locale files
//! - `audit`: Flag keys that break the naming convention
//! - `rename`: Rename a key in every locale and in code
//! - `init`: Initialize a `.lingorc.json` configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

use crate::config::SeedPolicy;
use crate::issues::Severity;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn verbose(&self) -> bool {
        self.common().is_some_and(|common| common.verbose)
    }

    fn common(&self) -> Option<&CommonArgs> {
        match self.command.as_ref()? {
            Command::Scan(cmd) => Some(&cmd.common),
            Command::Transform(cmd) => Some(&cmd.common),
            Command::Sync(cmd) => Some(&cmd.common),
            Command::Audit(cmd) => Some(&cmd.common),
            Command::Rename(cmd) => Some(&cmd.common),
            Command::Init => None,
        }
    }
}

/// Lowest severity that makes the run fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FailOn {
    #[default]
    Error,
    Warning,
    Info,
    Never,
}

impl FailOn {
    pub fn threshold(self) -> Option<Severity> {
        match self {
            FailOn::Error => Some(Severity::Error),
            FailOn::Warning => Some(Severity::Warning),
            FailOn::Info => Some(Severity::Info),
            FailOn::Never => None,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Source code root directory (overrides config file)
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Locale files directory (overrides config file)
    #[arg(long)]
    pub locales_dir: Option<PathBuf>,

    /// Source locale (overrides config file)
    #[arg(long)]
    pub source_locale: Option<String>,

    /// Ignore and do not update the reference cache
    #[arg(long)]
    pub no_cache: bool,

    /// Lowest severity that fails the run
    #[arg(long, value_enum, default_value_t = FailOn::Error)]
    pub fail_on: FailOn,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct ScanCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Also list rejected nodes with the reason
    #[arg(long)]
    pub explain: bool,
}

#[derive(Debug, Args)]
pub struct TransformCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Rewrite files and add keys to the source locale (default is dry-run)
    #[arg(long)]
    pub write: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeedArg {
    Humanize,
    Empty,
}

impl From<SeedArg> for SeedPolicy {
    fn from(seed: SeedArg) -> Self {
        match seed {
            SeedArg::Humanize => SeedPolicy::Humanize,
            SeedArg::Empty => SeedPolicy::Empty,
        }
    }
}

#[derive(Debug, Args)]
pub struct SyncCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Write the computed changes to the locale files
    #[arg(long, conflicts_with = "diff")]
    pub write: bool,

    /// Print the changes as unified diffs without writing
    #[arg(long)]
    pub diff: bool,

    /// Remove keys that are no longer used in code
    #[arg(long)]
    pub prune: bool,

    /// Value written for new keys
    #[arg(long, value_enum)]
    pub seed: Option<SeedArg>,

    /// Restrict changes to these keys
    /// Can be specified multiple times: --select a.b --select c.d
    #[arg(long = "select", value_name = "KEY")]
    pub select: Vec<String>,
}

#[derive(Debug, Args)]
pub struct AuditCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Rename suspicious keys to their suggested replacement
    #[arg(long)]
    pub fix: bool,
}

#[derive(Debug, Args)]
pub struct RenameCommand {
    /// Current key
    pub from: String,

    /// New key
    pub to: String,

    #[command(flatten)]
    pub common: CommonArgs,

    /// Apply the rename (default is dry-run)
    #[arg(long)]
    pub write: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List hard-coded text that should become translation keys
    Scan(ScanCommand),
    /// Replace hard-coded text with translation calls
    Transform(TransformCommand),
    /// Reconcile translation keys used in code with the locale files
    Sync(SyncCommand),
    /// Check translation keys against the naming convention
    Audit(AuditCommand),
    /// Rename a translation key in every locale file and in code
    Rename(RenameCommand),
    /// Initialize a new .lingorc.json configuration file
    Init,
}
