use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const CONFIG_FILE_NAME: &str = ".lingorc.json";

pub const TEST_FILE_PATTERNS: &[&str] = &[
    "**/*.test.tsx",
    "**/*.test.ts",
    "**/*.test.jsx",
    "**/*.test.js",
    "**/*.spec.tsx",
    "**/*.spec.ts",
    "**/*.spec.jsx",
    "**/*.spec.js",
    "**/__tests__/**",
];

/// What happens to keys present in the source locale but unused in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Retention {
    #[default]
    Keep,
    Prune,
}

/// Default value written for a newly added key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedPolicy {
    #[default]
    Humanize,
    Empty,
}

/// On-disk layout of locale documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocaleShape {
    /// Keep whatever each document already uses.
    #[default]
    Auto,
    Flat,
    Nested,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_source_locale")]
    pub source_locale: String,
    /// Empty means every other locale document found in `localesDir`.
    #[serde(default)]
    pub target_locales: Vec<String>,
    #[serde(default = "default_locales_dir")]
    pub locales_dir: String,
    #[serde(default = "default_source_root")]
    pub source_root: String,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,
    #[serde(default = "default_true")]
    pub ignore_test_files: bool,

    #[serde(default = "default_translation_identifier")]
    pub translation_identifier: String,
    #[serde(default = "default_translatable_attributes")]
    pub translatable_attributes: Vec<String>,
    #[serde(default)]
    pub scan_calls: bool,
    #[serde(default = "default_min_text_length")]
    pub min_text_length: usize,
    #[serde(default)]
    pub deny_patterns: Vec<String>,
    #[serde(default)]
    pub allow_patterns: Vec<String>,
    #[serde(default = "default_true")]
    pub decode_entities: bool,
    #[serde(default)]
    pub preserve_newlines: bool,
    /// Replace each literal of a static concatenation separately instead of
    /// merging the chain into one message.
    #[serde(default)]
    pub separate_concatenation: bool,

    #[serde(default = "default_placeholder_formats")]
    pub placeholder_formats: Vec<String>,
    #[serde(default = "default_interpolation_format")]
    pub interpolation_format: String,
    #[serde(default = "default_empty_value_markers")]
    pub empty_value_markers: Vec<String>,
    #[serde(default)]
    pub dynamic_key_globs: Vec<String>,
    #[serde(default)]
    pub assumed_keys: Vec<String>,
    #[serde(default)]
    pub retention: Retention,
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    #[serde(default)]
    pub seed_target_locales: bool,

    #[serde(default = "default_key_namespace")]
    pub key_namespace: String,
    #[serde(default = "default_key_hash_length")]
    pub key_hash_length: usize,

    #[serde(default = "default_true")]
    pub cache: bool,
    #[serde(default = "default_cache_file")]
    pub cache_file: String,
    #[serde(default)]
    pub locale_shape: LocaleShape,
}

fn default_source_locale() -> String {
    "en".to_string()
}

fn default_locales_dir() -> String {
    "./locales".to_string()
}

fn default_source_root() -> String {
    "./".to_string()
}

fn default_excludes() -> Vec<String> {
    ["**/node_modules/**", "**/dist/**", "**/.git/**"]
        .map(String::from)
        .to_vec()
}

fn default_true() -> bool {
    true
}

fn default_translation_identifier() -> String {
    "t".to_string()
}

fn default_translatable_attributes() -> Vec<String> {
    [
        "placeholder",
        "title",
        "alt",
        "label",
        "aria-label",
        "aria-description",
        "aria-placeholder",
        "aria-roledescription",
        "aria-valuetext",
    ]
    .map(String::from)
    .to_vec()
}

fn default_min_text_length() -> usize {
    2
}

fn default_placeholder_formats() -> Vec<String> {
    ["{{name}}", "{name}", "%{name}"].map(String::from).to_vec()
}

fn default_interpolation_format() -> String {
    "{{name}}".to_string()
}

fn default_empty_value_markers() -> Vec<String> {
    ["todo", "tbd", "fixme", "translate me"]
        .map(String::from)
        .to_vec()
}

fn default_key_namespace() -> String {
    "app".to_string()
}

fn default_key_hash_length() -> usize {
    6
}

fn default_cache_file() -> String {
    ".lingo-cache.json".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_locale: default_source_locale(),
            target_locales: Vec::new(),
            locales_dir: default_locales_dir(),
            source_root: default_source_root(),
            includes: Vec::new(),
            excludes: default_excludes(),
            ignore_test_files: true,
            translation_identifier: default_translation_identifier(),
            translatable_attributes: default_translatable_attributes(),
            scan_calls: false,
            min_text_length: default_min_text_length(),
            deny_patterns: Vec::new(),
            allow_patterns: Vec::new(),
            decode_entities: true,
            preserve_newlines: false,
            separate_concatenation: false,
            placeholder_formats: default_placeholder_formats(),
            interpolation_format: default_interpolation_format(),
            empty_value_markers: default_empty_value_markers(),
            dynamic_key_globs: Vec::new(),
            assumed_keys: Vec::new(),
            retention: Retention::Keep,
            seed_policy: SeedPolicy::Humanize,
            seed_target_locales: false,
            key_namespace: default_key_namespace(),
            key_hash_length: default_key_hash_length(),
            cache: true,
            cache_file: default_cache_file(),
            locale_shape: LocaleShape::Auto,
        }
    }
}

impl Config {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.excludes {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'excludes': \"{}\"", pattern))?;
        }

        // Patterns without wildcards are literal directory paths.
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        for (field, patterns) in [
            ("denyPatterns", &self.deny_patterns),
            ("allowPatterns", &self.allow_patterns),
        ] {
            for pattern in patterns {
                Regex::new(pattern).with_context(|| {
                    format!("Invalid regular expression in '{}': \"{}\"", field, pattern)
                })?;
            }
        }

        if !(4..=16).contains(&self.key_hash_length) {
            bail!(
                "'keyHashLength' must be between 4 and 16, got {}",
                self.key_hash_length
            );
        }

        if self.key_namespace.is_empty()
            || !self
                .key_namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            bail!(
                "'keyNamespace' must be a non-empty identifier, got \"{}\"",
                self.key_namespace
            );
        }

        if !self.interpolation_format.contains("name") {
            bail!(
                "'interpolationFormat' must contain the token 'name', got \"{}\"",
                self.interpolation_format
            );
        }
        for format in &self.placeholder_formats {
            if !format.contains("name") || format == "name" {
                bail!(
                    "Entries of 'placeholderFormats' must wrap the token 'name', got \"{}\"",
                    format
                );
            }
        }

        if self.translation_identifier.is_empty() {
            bail!("'translationIdentifier' must not be empty");
        }

        Ok(())
    }

    /// SHA-256 of the canonical JSON form of the effective configuration.
    pub fn normalized_hash(&self) -> String {
        let canonical = serde_json::to_string(self).unwrap_or_default();
        hex::encode(Sha256::digest(canonical.as_bytes()))
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source_locale, "en");
        assert_eq!(config.translation_identifier, "t");
        assert_eq!(config.retention, Retention::Keep);
        assert_eq!(config.key_hash_length, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let json = r#"{
              "sourceLocale": "de",
              "targetLocales": ["en", "fr"],
              "excludes": ["**/dist/**"],
              "translatableAttributes": ["placeholder"],
              "retention": "prune",
              "seedPolicy": "empty",
              "localeShape": "nested"
          }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.source_locale, "de");
        assert_eq!(config.target_locales, vec!["en", "fr"]);
        assert_eq!(config.excludes, vec!["**/dist/**"]);
        assert_eq!(config.translatable_attributes, vec!["placeholder"]);
        assert_eq!(config.retention, Retention::Prune);
        assert_eq!(config.seed_policy, SeedPolicy::Empty);
        assert_eq!(config.locale_shape, LocaleShape::Nested);
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{ "scanCalls": true }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert!(config.scan_calls);
        assert_eq!(config.excludes, default_excludes());
        assert_eq!(
            config.translatable_attributes,
            default_translatable_attributes()
        );
        assert_eq!(config.interpolation_format, "{{name}}");
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("src").join("components");
        fs::create_dir_all(&sub_dir).unwrap();

        let config_path = dir.path().join(CONFIG_FILE_NAME);
        File::create(&config_path).unwrap();

        let found = find_config_file(&sub_dir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        assert!(find_config_file(dir.path()).is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "localesDir": "./i18n" }"#,
        )
        .unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(result.from_file);
        assert_eq!(result.config.locales_dir, "./i18n");
    }

    #[test]
    fn test_load_config_default_when_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(!result.from_file);
        assert_eq!(result.config.locales_dir, "./locales");
    }

    #[test]
    fn test_validate_invalid_exclude_pattern() {
        let config = Config {
            excludes: vec!["[invalid".to_string()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("excludes"));
    }

    #[test]
    fn test_validate_literal_include_with_brackets() {
        let config = Config {
            includes: vec!["app/[locale]".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_regex() {
        let config = Config {
            deny_patterns: vec!["(unclosed".to_string()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("denyPatterns"));
    }

    #[test]
    fn test_validate_hash_length_bounds() {
        for (length, ok) in [(3, false), (4, true), (16, true), (17, false)] {
            let config = Config {
                key_hash_length: length,
                ..Default::default()
            };
            assert_eq!(config.validate().is_ok(), ok, "length {}", length);
        }
    }

    #[test]
    fn test_validate_interpolation_format() {
        let config = Config {
            interpolation_format: "{{value}}".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_with_invalid_value_fails() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "keyHashLength": 40 }"#,
        )
        .unwrap();

        assert!(load_config(dir.path()).is_err());
    }

    #[test]
    fn test_normalized_hash_tracks_changes() {
        let base = Config::default();
        let same = Config::default();
        let changed = Config {
            translation_identifier: "i18n".to_string(),
            ..Default::default()
        };

        assert_eq!(base.normalized_hash(), same.normalized_hash());
        assert_ne!(base.normalized_hash(), changed.normalized_hash());
        assert_eq!(base.normalized_hash().len(), 64);
    }
}
