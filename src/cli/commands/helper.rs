use std::{collections::BTreeMap, env, fs, path::Path};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::{CommandResult, CommandSummary};
use crate::cli::args::{CommonArgs, FailOn};
use crate::config::{Config, find_config_file, load_config};
use crate::core::sync::target_locales;
use crate::core::writer::{KeyMapping, rewrite_references};
use crate::core::{ReferenceScan, ScanSession};
use crate::fs_utils::write_atomic;
use crate::issues::Issue;
use crate::locale::{FlushStats, JsonLocaleStore, LocaleStoreError};

/// Scan session and locale store of the project around the working directory.
pub struct Workspace {
    pub session: ScanSession,
    pub store: JsonLocaleStore,
}

impl Workspace {
    pub fn open(common: &CommonArgs) -> Result<Self> {
        let cwd = env::current_dir().context("Failed to determine working directory")?;
        let root = find_config_file(&cwd)
            .and_then(|path| path.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| cwd.clone());

        let loaded = load_config(&cwd)?;
        let config = apply_overrides(loaded.config, common);
        config.validate()?;
        debug!(root = %root.display(), from_file = loaded.from_file, "configuration loaded");

        let store = JsonLocaleStore::new(root.join(&config.locales_dir), config.locale_shape);
        let session = ScanSession::new(config, root, !common.no_cache)?;
        Ok(Self { session, store })
    }

    pub fn config(&self) -> &Config {
        self.session.config()
    }

    /// Source locale followed by every target locale.
    pub fn locales(&self) -> Result<Vec<String>> {
        let config = self.session.config();
        let mut locales = vec![config.source_locale.clone()];
        locales.extend(target_locales(config, &self.store)?);
        Ok(locales)
    }

    pub fn finish(
        &self,
        summary: CommandSummary,
        mut issues: Vec<Issue>,
        errors: Vec<String>,
        fail_on: FailOn,
    ) -> Result<CommandResult> {
        issues.extend(
            self.session
                .warnings()
                .iter()
                .cloned()
                .map(Issue::ParseError),
        );
        issues.sort();

        Ok(CommandResult {
            summary,
            issues,
            fail_on,
            errors,
            root: self.session.root().to_path_buf(),
            locales_dir: self
                .config()
                .locales_dir
                .trim_start_matches("./")
                .trim_end_matches('/')
                .to_string(),
            source_files_checked: self.session.files().len(),
            locale_files_checked: self.locales()?.len(),
        })
    }
}

fn apply_overrides(mut config: Config, common: &CommonArgs) -> Config {
    if let Some(source_root) = &common.source_root {
        config.source_root = path_string(source_root);
    }
    if let Some(locales_dir) = &common.locales_dir {
        config.locales_dir = path_string(locales_dir);
    }
    if let Some(source_locale) = &common.source_locale {
        config.source_locale = source_locale.clone();
    }
    config
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Split flush results into written stats and error messages.
pub fn split_flush(
    results: BTreeMap<String, Result<FlushStats, LocaleStoreError>>,
) -> (BTreeMap<String, FlushStats>, Vec<String>) {
    let mut written = BTreeMap::new();
    let mut errors = Vec::new();
    for (locale, result) in results {
        match result {
            Ok(stats) => {
                written.insert(locale, stats);
            }
            Err(e) => errors.push(write_error(&locale, &e)),
        }
    }
    (written, errors)
}

/// Flush renamed keys. When some locales fail, the error list also names the
/// locales already written, since code references are then left unchanged.
pub fn flush_renamed(store: &mut JsonLocaleStore) -> Vec<String> {
    let (written, mut errors) = split_flush(store.flush());
    if !errors.is_empty() && !written.is_empty() {
        let locales: Vec<&str> = written.keys().map(String::as_str).collect();
        warn!(written = ?locales, "rename flushed only partially");
        errors.push(format!(
            "{} already {} the new keys; code references were left unchanged",
            plural_locales(&locales),
            if locales.len() == 1 { "uses" } else { "use" }
        ));
    }
    errors
}

fn plural_locales(locales: &[&str]) -> String {
    let quoted: Vec<String> = locales.iter().map(|l| format!("'{}'", l)).collect();
    match quoted.as_slice() {
        [one] => format!("locale {}", one),
        _ => format!("locales {}", quoted.join(", ")),
    }
}

pub fn write_error(locale: &str, error: &LocaleStoreError) -> String {
    format!("failed to write locale '{}': {}", locale, error)
}

/// Rewrite key literals in every scanned file that references a renamed key.
/// Returns the number of literals rewritten; failures are appended to `errors`.
pub fn rewrite_code_references(
    workspace: &Workspace,
    scan: &ReferenceScan,
    mappings: &[KeyMapping],
    errors: &mut Vec<String>,
) -> usize {
    let mut rewritten = 0;
    for (file_path, file) in &scan.files {
        if !file
            .references
            .iter()
            .any(|r| mappings.iter().any(|m| m.from == r.key))
        {
            continue;
        }
        let path = workspace.session.resolve(file_path);
        let result = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", file_path))
            .and_then(|content| {
                let rewrite = rewrite_references(&content, &file.references, mappings);
                if rewrite.stale > 0 {
                    warn!(file = %file_path, stale = rewrite.stale, "stale references left unchanged");
                }
                if rewrite.applied > 0 {
                    write_atomic(&path, &rewrite.content)?;
                }
                Ok(rewrite.applied)
            });
        match result {
            Ok(applied) => rewritten += applied,
            Err(e) => errors.push(format!("{:#}", e)),
        }
    }
    rewritten
}
