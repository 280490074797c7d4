//! Scan session: discovered files, the reference cache and per-run
//! diagnostics, owned by one value that every command threads through.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::core::cache::{CacheHeader, Fingerprint, ReferenceCache};
use crate::core::extract::{
    DynamicKeyWarning, ExtractorRegistry, FileReferences, ParserAvailability, TranslationReference,
};
use crate::core::files::{display_path, scan_files};
use crate::core::scan::{ExtractionCandidate, ScanOptions, SkippedCandidate, scan_source};

/// A file that could not be read or parsed. The run carries on without it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileWarning {
    pub file_path: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

/// References of every scanned file, keyed by root-relative path.
#[derive(Debug, Default)]
pub struct ReferenceScan {
    pub files: BTreeMap<String, FileReferences>,
}

impl ReferenceScan {
    pub fn references(&self) -> Vec<TranslationReference> {
        self.files
            .values()
            .flat_map(|f| f.references.iter().cloned())
            .collect()
    }

    pub fn dynamic_key_warnings(&self) -> Vec<DynamicKeyWarning> {
        self.files
            .values()
            .flat_map(|f| f.dynamic_key_warnings.iter().cloned())
            .collect()
    }
}

enum Lookup {
    Hit(FileReferences),
    Miss(Fingerprint, FileReferences),
}

fn lookup_file(
    cache: &ReferenceCache,
    registry: &ExtractorRegistry,
    name: &str,
    path: &Path,
) -> Result<Lookup> {
    let fingerprint = Fingerprint::of(path)?;
    if let Some(hit) = cache.lookup(name, fingerprint) {
        return Ok(Lookup::Hit(hit.clone()));
    }
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", name))?;
    let mut references = registry.extract(name, &content)?;
    references.sort();
    Ok(Lookup::Miss(fingerprint, references))
}

pub struct ScanSession {
    config: Config,
    root: PathBuf,
    files: Vec<PathBuf>,
    registry: ExtractorRegistry,
    scan_options: ScanOptions,
    cache: ReferenceCache,
    stats: CacheStats,
    skip_log: Vec<SkippedCandidate>,
    warnings: Vec<FileWarning>,
    inaccessible_paths: usize,
}

impl ScanSession {
    /// Discover source files under `root` joined with `sourceRoot` and open
    /// the reference cache unless `use_cache` is false.
    pub fn new(config: Config, root: impl Into<PathBuf>, use_cache: bool) -> Result<Self> {
        let root = root.into();
        let availability = ParserAvailability::detect();
        let registry = ExtractorRegistry::new(&config.translation_identifier, availability.clone());
        let scan_options = ScanOptions::from_config(&config)?;

        let header = CacheHeader::current(&config, &availability);
        let cache = if use_cache && config.cache {
            ReferenceCache::load(root.join(&config.cache_file), header)
        } else {
            ReferenceCache::disabled(header)
        };

        let source_root = match config.source_root.trim_start_matches("./") {
            "" | "." => root.clone(),
            relative => root.join(relative),
        };
        let discovered = scan_files(
            &source_root,
            &config.includes,
            &config.excludes,
            config.ignore_test_files,
        );
        debug!(
            files = discovered.files.len(),
            root = %source_root.display(),
            "source files discovered"
        );

        Ok(Self {
            config,
            root,
            files: discovered.files,
            registry,
            scan_options,
            cache,
            stats: CacheStats::default(),
            skip_log: Vec::new(),
            warnings: Vec::new(),
            inaccessible_paths: discovered.skipped_count,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn locales_dir(&self) -> PathBuf {
        self.root.join(&self.config.locales_dir)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.stats
    }

    pub fn skip_log(&self) -> &[SkippedCandidate] {
        &self.skip_log
    }

    pub fn warnings(&self) -> &[FileWarning] {
        &self.warnings
    }

    pub fn inaccessible_paths(&self) -> usize {
        self.inaccessible_paths
    }

    /// Absolute path of a root-relative display path.
    pub fn resolve(&self, file_path: &str) -> PathBuf {
        self.root.join(file_path)
    }

    fn display(&self, path: &Path) -> String {
        display_path(&self.root, path)
    }

    /// Extract references from every discovered file, reusing cached
    /// results for files whose fingerprint is unchanged.
    pub fn collect_references(&mut self) -> ReferenceScan {
        let jobs: Vec<(String, &PathBuf)> =
            self.files.iter().map(|p| (self.display(p), p)).collect();
        let cache = &self.cache;
        let registry = &self.registry;

        let results: Vec<(String, Result<Lookup>)> = jobs
            .par_iter()
            .map(|(name, path)| (name.clone(), lookup_file(cache, registry, name, path)))
            .collect();

        let mut scan = ReferenceScan::default();
        for (name, result) in results {
            match result {
                Ok(Lookup::Hit(references)) => {
                    self.stats.hits += 1;
                    scan.files.insert(name, references);
                }
                Ok(Lookup::Miss(fingerprint, references)) => {
                    self.stats.misses += 1;
                    self.cache
                        .store(name.clone(), fingerprint, references.clone());
                    scan.files.insert(name, references);
                }
                Err(e) => {
                    debug!(file = %name, error = %e, "extraction failed");
                    self.warnings.push(FileWarning {
                        file_path: name,
                        message: format!("{:#}", e),
                    });
                }
            }
        }

        let known: BTreeSet<String> = jobs.into_iter().map(|(name, _)| name).collect();
        self.cache.retain(&known);
        if let Err(e) = self.cache.save() {
            warn!(error = %e, "failed to save reference cache");
        }
        debug!(
            hits = self.stats.hits,
            misses = self.stats.misses,
            "references collected"
        );
        scan
    }

    /// Run the candidate scanner over every discovered file. Rejected nodes
    /// go to the session's skip log.
    pub fn scan_candidates(&mut self) -> Vec<ExtractionCandidate> {
        let options = &self.scan_options;
        let results: Vec<_> = self
            .files
            .par_iter()
            .map(|path| {
                let name = display_path(&self.root, path);
                let result = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", name))
                    .and_then(|content| scan_source(&name, &content, options));
                (name, result)
            })
            .collect();

        let mut candidates = Vec::new();
        for (name, result) in results {
            match result {
                Ok(scan) => {
                    candidates.extend(scan.candidates);
                    self.skip_log.extend(scan.skipped);
                    self.warnings
                        .extend(scan.warnings.into_iter().map(|message| FileWarning {
                            file_path: name.clone(),
                            message,
                        }));
                }
                Err(e) => self.warnings.push(FileWarning {
                    file_path: name,
                    message: format!("{:#}", e),
                }),
            }
        }

        candidates.sort_by(|a, b| {
            a.file_path
                .cmp(&b.file_path)
                .then(a.span.start.cmp(&b.span.start))
        });
        candidates
    }
}
