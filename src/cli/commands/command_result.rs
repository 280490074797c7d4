use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cli::args::FailOn;
use crate::cli::exit_status::ExitStatus;
use crate::core::scan::{ExtractionCandidate, SkippedCandidate};
use crate::core::sync::{AppliedChanges, LocaleDiff, SyncMode};
use crate::core::writer::{KeyMapping, SkippedRewrite};
use crate::issues::{Issue, SeverityCounts};
use crate::locale::FlushStats;

#[derive(Debug)]
pub enum CommandSummary {
    Scan(ScanSummary),
    Transform(TransformSummary),
    Sync(SyncOutcome),
    Audit(AuditSummary),
    Rename(RenameSummary),
}

#[derive(Debug)]
pub struct ScanSummary {
    pub candidates: Vec<ExtractionCandidate>,
    /// Filled only with `--explain`.
    pub skipped: Vec<SkippedCandidate>,
    pub explain: bool,
}

#[derive(Debug)]
pub struct FileChange {
    pub file_path: String,
    /// Candidates with their final status.
    pub candidates: Vec<ExtractionCandidate>,
    pub skipped: Vec<SkippedRewrite>,
}

impl FileChange {
    pub fn applied(&self) -> impl Iterator<Item = &ExtractionCandidate> {
        self.candidates
            .iter()
            .filter(|c| c.status == crate::core::scan::CandidateStatus::Applied)
    }
}

#[derive(Debug)]
pub struct TransformSummary {
    pub files: Vec<FileChange>,
    /// Keys added to the source locale.
    pub keys_added: usize,
    pub is_write: bool,
}

#[derive(Debug)]
pub struct SyncOutcome {
    pub mode: SyncMode,
    pub applied: Option<AppliedChanges>,
    pub flushed: BTreeMap<String, FlushStats>,
    pub diffs: Vec<LocaleDiff>,
}

#[derive(Debug)]
pub struct AuditSummary {
    /// Suspicious keys that have a suggested replacement.
    pub fixable: Vec<KeyMapping>,
    pub is_fix: bool,
    /// Locale entries renamed with `--fix`.
    pub renamed: usize,
    pub references_rewritten: usize,
}

#[derive(Debug)]
pub struct RenameSummary {
    pub mapping: KeyMapping,
    /// Locales that hold the key.
    pub locales: Vec<String>,
    pub references: usize,
    pub references_rewritten: usize,
    pub is_write: bool,
}

/// Result of running a lingo command.
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    /// Findings, sorted.
    pub issues: Vec<Issue>,
    pub fail_on: FailOn,
    /// Failures that make the command itself fail, such as an unwritable
    /// locale file.
    pub errors: Vec<String>,
    /// Project root; source lines are read relative to it.
    pub root: PathBuf,
    /// Locale directory, as shown in issue locations.
    pub locales_dir: String,
    pub source_files_checked: usize,
    pub locale_files_checked: usize,
}

impl CommandResult {
    pub fn counts(&self) -> SeverityCounts {
        SeverityCounts::from_issues(&self.issues)
    }

    pub fn exit_status(&self) -> ExitStatus {
        if !self.errors.is_empty() {
            return ExitStatus::Error;
        }
        ExitStatus::from_severity(self.counts().highest(), self.fail_on)
    }
}
