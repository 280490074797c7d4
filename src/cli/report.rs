//! Report formatting and printing utilities.
//!
//! Issues are displayed in cargo-style format. Separate from core logic to
//! allow lingo to be used as a library.

use std::{
    collections::HashMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use super::commands::{
    AuditSummary, CommandResult, CommandSummary, RenameSummary, ScanSummary, SyncOutcome,
    TransformSummary,
};
use crate::core::sync::SyncMode;
use crate::issues::{Issue, Report, ReportLocation, Severity, SeverityCounts};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Longest candidate text shown before truncation.
const MAX_TEXT_DISPLAY: usize = 60;

/// Where issue locations are resolved.
pub struct ReportContext<'a> {
    pub root: &'a Path,
    pub locales_dir: &'a str,
}

/// Lazily loaded source lines, keyed by root-relative path.
struct SourceLines<'a> {
    root: &'a Path,
    files: HashMap<String, Option<Vec<String>>>,
}

impl<'a> SourceLines<'a> {
    fn new(root: &'a Path) -> Self {
        Self {
            root,
            files: HashMap::new(),
        }
    }

    fn line(&mut self, file_path: &str, line: usize) -> Option<&str> {
        let root = self.root;
        self.files
            .entry(file_path.to_string())
            .or_insert_with(|| {
                fs::read_to_string(root.join(file_path))
                    .ok()
                    .map(|content| content.lines().map(str::to_string).collect())
            })
            .as_ref()?
            .get(line.checked_sub(1)?)
            .map(String::as_str)
    }
}

pub fn print(result: &CommandResult) {
    print_command_output(&result.summary);

    let ctx = ReportContext {
        root: &result.root,
        locales_dir: &result.locales_dir,
    };
    report_to(&result.issues, &ctx, &mut io::stdout().lock());

    for error in &result.errors {
        eprintln!("{} {}", "error:".bold().red(), error);
    }

    if result.issues.is_empty() && result.errors.is_empty() {
        print_success(result.source_files_checked, result.locale_files_checked);
    }
}

/// Print issues to a custom writer, sorted, followed by a summary line.
pub fn report_to<W: Write>(issues: &[Issue], ctx: &ReportContext<'_>, writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    let mut sorted = issues.to_vec();
    sorted.sort();

    let max_line_width = sorted
        .iter()
        .filter_map(|i| match i.location() {
            ReportLocation::Source { position, .. } => Some(position.line),
            _ => None,
        })
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1);

    let mut lines = SourceLines::new(ctx.root);
    for issue in &sorted {
        print_issue(issue, ctx, &mut lines, writer, max_line_width);
    }

    print_summary(SeverityCounts::from_issues(&sorted), writer);
}

fn severity_label(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
        Severity::Info => "info".bold().cyan(),
    }
}

fn locale_file(ctx: &ReportContext<'_>, locale: &str) -> String {
    PathBuf::from(ctx.locales_dir)
        .join(format!("{}.json", locale))
        .to_string_lossy()
        .replace('\\', "/")
}

fn print_issue<W: Write>(
    issue: &Issue,
    ctx: &ReportContext<'_>,
    lines: &mut SourceLines<'_>,
    writer: &mut W,
    max_line_width: usize,
) {
    let severity = issue.report_severity();
    let _ = writeln!(
        writer,
        "{}: \"{}\"  {}",
        severity_label(severity),
        issue.message(),
        issue.report_rule().to_string().dimmed().cyan()
    );

    match issue.location() {
        ReportLocation::Source {
            file_path,
            position,
        } => {
            let _ = writeln!(
                writer,
                "  {} {}:{}:{}",
                "-->".blue(),
                file_path,
                position.line,
                position.col
            );
            if let Some(source_line) = lines.line(file_path, position.line) {
                print_source_line(writer, source_line, position.line, position.col, severity, max_line_width);
            }
        }
        ReportLocation::Locale { locale, .. } => {
            let _ = writeln!(writer, "  {} {}", "-->".blue(), locale_file(ctx, locale));
        }
        ReportLocation::File { path } => {
            let _ = writeln!(writer, "  {} {}", "-->".blue(), path);
        }
    }

    if let Some(details) = issue.details() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "note:".bold(),
            details,
            width = max_line_width
        );
    }

    if let Some(hint) = issue.hint() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "hint:".bold().cyan(),
            hint,
            width = max_line_width
        );
    }

    let _ = writeln!(writer);
}

fn print_source_line<W: Write>(
    writer: &mut W,
    source_line: &str,
    line: usize,
    col: usize,
    severity: Severity,
    max_line_width: usize,
) {
    let caret = match severity {
        Severity::Error => "^".red(),
        Severity::Warning => "^".yellow(),
        Severity::Info => "^".cyan(),
    };
    let _ = writeln!(
        writer,
        "{:>width$} {}",
        "",
        "|".blue(),
        width = max_line_width
    );
    let _ = writeln!(
        writer,
        "{:>width$} {} {}",
        line.to_string().blue(),
        "|".blue(),
        source_line,
        width = max_line_width
    );

    // Caret pointing to the column (col is 1-based)
    let prefix: String = source_line.chars().take(col.saturating_sub(1)).collect();
    let caret_padding = UnicodeWidthStr::width(prefix.as_str());
    let _ = writeln!(
        writer,
        "{:>width$} {} {:>padding$}{}",
        "",
        "|".blue(),
        "",
        caret,
        width = max_line_width,
        padding = caret_padding
    );
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

fn print_summary<W: Write>(counts: SeverityCounts, writer: &mut W) {
    if counts.total() == 0 {
        return;
    }
    let _ = writeln!(
        writer,
        "{} {} ({}, {}, {})",
        FAILURE_MARK.red(),
        plural(counts.total(), "problem", "problems"),
        plural(counts.errors, "error", "errors").red(),
        plural(counts.warnings, "warning", "warnings").yellow(),
        plural(counts.infos, "info", "infos").cyan()
    );
}

/// Print a success message when no issues are found.
pub fn print_success(source_files: usize, locale_files: usize) {
    print_success_to(source_files, locale_files, &mut io::stdout().lock());
}

pub fn print_success_to<W: Write>(source_files: usize, locale_files: usize, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Checked {} source {}, {} locale {} - no issues found",
            source_files,
            if source_files == 1 { "file" } else { "files" },
            locale_files,
            if locale_files == 1 { "file" } else { "files" }
        )
        .green()
    );
}

fn truncate(text: &str) -> String {
    let single_line = text.replace('\n', "\\n");
    if single_line.chars().count() <= MAX_TEXT_DISPLAY {
        return single_line;
    }
    let cut: String = single_line.chars().take(MAX_TEXT_DISPLAY).collect();
    format!("{}…", cut)
}

// ============================================================
// Command output
// ============================================================

fn print_command_output(summary: &CommandSummary) {
    match summary {
        CommandSummary::Scan(summary) => print_scan(summary),
        CommandSummary::Transform(summary) => print_transform(summary),
        CommandSummary::Sync(summary) => print_sync(summary),
        CommandSummary::Audit(summary) => print_audit(summary),
        CommandSummary::Rename(summary) => print_rename(summary),
    }
}

fn print_scan(summary: &ScanSummary) {
    for candidate in &summary.candidates {
        println!(
            "{}: \"{}\"  {}",
            "candidate".bold().green(),
            truncate(&candidate.normalized_text),
            candidate.kind.as_str().dimmed().cyan()
        );
        println!(
            "  {} {}:{}",
            "-->".blue(),
            candidate.file_path,
            candidate.position
        );
        if let Some(key) = &candidate.suggested_key {
            println!("   {} {} {}", "=".blue(), "key:".bold(), key);
        } else if let Some(kind) = candidate.expression_type {
            println!(
                "   {} {} {} (not rewritten)",
                "=".blue(),
                "note:".bold(),
                kind.as_str()
            );
        }
        println!();
    }

    if summary.explain {
        for skipped in &summary.skipped {
            let location = skipped
                .location
                .as_ref()
                .map(|l| format!("{}:{}", l.file_path, l.position))
                .unwrap_or_default();
            println!(
                "{}: \"{}\"  {}  {} {}",
                "skipped".bold().dimmed(),
                truncate(skipped.text.as_deref().unwrap_or("")),
                skipped.reason.as_str().cyan(),
                "-->".blue(),
                location
            );
            if let Some(detail) = &skipped.detail {
                println!("   {} {} {}", "=".blue(), "note:".bold(), detail);
            }
        }
        if !summary.skipped.is_empty() {
            println!();
        }
    }

    let files = summary
        .candidates
        .iter()
        .map(|c| c.file_path.as_str())
        .collect::<std::collections::BTreeSet<_>>()
        .len();
    println!(
        "Found {} in {}.",
        plural(summary.candidates.len(), "candidate", "candidates"),
        plural(files, "file", "files")
    );
    if !summary.explain {
        println!("Run with {} to see rejected text.", "--explain".cyan());
    }
}

fn print_transform(summary: &TransformSummary) {
    let mut applied_total = 0;
    let mut file_count = 0;
    for file in &summary.files {
        let applied: Vec<_> = file.applied().collect();
        if !applied.is_empty() {
            file_count += 1;
            applied_total += applied.len();
            println!("{}", file.file_path.bold());
            for candidate in applied {
                println!(
                    "  {:>7}  \"{}\" {} {}",
                    candidate.position.to_string().dimmed(),
                    truncate(&candidate.normalized_text),
                    "->".blue(),
                    candidate.suggested_key.as_deref().unwrap_or("")
                );
            }
        }
        for skipped in &file.skipped {
            println!(
                "  {} {}  {}",
                "skipped".dimmed(),
                skipped.candidate_id,
                skipped.reason.as_str().cyan()
            );
        }
    }

    if applied_total == 0 {
        println!("Nothing to transform.");
        return;
    }
    if summary.is_write {
        println!(
            "{} {} in {}, added {} to the source locale.",
            "Replaced".green().bold(),
            plural(applied_total, "text", "texts"),
            plural(file_count, "file", "files"),
            plural(summary.keys_added, "key", "keys")
        );
    } else {
        println!(
            "{} {} in {}.",
            "Would replace".yellow().bold(),
            plural(applied_total, "text", "texts"),
            plural(file_count, "file", "files")
        );
        println!("Run with {} to apply these changes.", "--write".cyan());
    }
}

fn print_sync(summary: &SyncOutcome) {
    match summary.mode {
        SyncMode::Check => {}
        SyncMode::Diff => {
            for diff in &summary.diffs {
                for line in diff.unified.lines() {
                    if line.starts_with("+++") || line.starts_with("---") {
                        println!("{}", line.bold());
                    } else if line.starts_with('+') {
                        println!("{}", line.green());
                    } else if line.starts_with('-') {
                        println!("{}", line.red());
                    } else if line.starts_with("@@") {
                        println!("{}", line.cyan());
                    } else {
                        println!("{}", line);
                    }
                }
                println!(
                    "{} {}: +{} -{}",
                    "Would update".yellow().bold(),
                    diff.locale,
                    diff.added.len(),
                    diff.removed.len()
                );
                println!();
            }
            if summary.diffs.is_empty() {
                println!("Locale files are up to date.");
            } else {
                println!("Run with {} to write these changes.", "--write".cyan());
            }
        }
        SyncMode::Write => {
            for (locale, stats) in &summary.flushed {
                println!(
                    "{} {}: +{} -{} ~{}",
                    "Updated".green().bold(),
                    locale,
                    stats.added,
                    stats.removed,
                    stats.updated
                );
            }
            if summary.flushed.is_empty() {
                println!("Locale files are up to date.");
            }
        }
    }
}

fn print_audit(summary: &AuditSummary) {
    if summary.fixable.is_empty() {
        return;
    }
    if summary.is_fix {
        println!(
            "{} {} across locales, rewrote {}.",
            "Renamed".green().bold(),
            plural(summary.renamed, "entry", "entries"),
            plural(summary.references_rewritten, "reference", "references")
        );
    } else {
        for mapping in &summary.fixable {
            println!("  {} {} {}", mapping.from, "->".blue(), mapping.to);
        }
        println!(
            "{} {}.",
            "Would rename".yellow().bold(),
            plural(summary.fixable.len(), "key", "keys")
        );
        println!("Run with {} to rename them.", "--fix".cyan());
    }
}

fn print_rename(summary: &RenameSummary) {
    let target = format!(
        "'{}' {} '{}'",
        summary.mapping.from,
        "->".blue(),
        summary.mapping.to
    );
    if summary.is_write {
        println!(
            "{} {} in {} ({}), rewrote {}.",
            "Renamed".green().bold(),
            target,
            plural(summary.locales.len(), "locale", "locales"),
            summary.locales.join(", "),
            plural(summary.references_rewritten, "reference", "references")
        );
    } else {
        println!(
            "{} {} in {} ({}) and {}.",
            "Would rename".yellow().bold(),
            target,
            plural(summary.locales.len(), "locale", "locales"),
            summary.locales.join(", "),
            plural(summary.references, "reference", "references")
        );
        println!("Run with {} to apply the rename.", "--write".cyan());
    }
}

// ============================================================
// Tests
// ============================================================
