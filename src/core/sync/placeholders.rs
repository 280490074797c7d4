use std::collections::BTreeSet;

use anyhow::{Result, bail};
use regex::Regex;

/// Placeholder syntaxes recognised in locale values, built from formats
/// such as `{{name}}` or `%{name}`.
#[derive(Debug, Clone)]
pub struct PlaceholderPatterns {
    patterns: Vec<Regex>,
}

impl PlaceholderPatterns {
    pub fn new(formats: &[String]) -> Result<Self> {
        let patterns = formats
            .iter()
            .map(|format| compile_format(format))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Placeholder names used in `value`, across every format.
    pub fn extract(&self, value: &str) -> BTreeSet<String> {
        self.patterns
            .iter()
            .flat_map(|re| re.captures_iter(value))
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }
}

fn compile_format(format: &str) -> Result<Regex> {
    let Some((prefix, suffix)) = format.split_once("name") else {
        bail!("Placeholder format '{}' must contain 'name'", format);
    };
    if prefix.is_empty() && suffix.is_empty() {
        bail!("Placeholder format '{}' needs delimiters", format);
    }
    let pattern = format!(
        r"{}\s*([A-Za-z_$][\w$.]*)\s*{}",
        regex::escape(prefix),
        regex::escape(suffix)
    );
    Ok(Regex::new(&pattern)?)
}

/// Token asymmetry between a source value and its translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenDelta {
    /// In the source value but not the translation.
    pub missing: Vec<String>,
    /// In the translation but not the source value.
    pub extra: Vec<String>,
}

impl TokenDelta {
    pub fn between(source: &BTreeSet<String>, target: &BTreeSet<String>) -> Self {
        Self {
            missing: source.difference(target).cloned().collect(),
            extra: target.difference(source).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn defaults() -> PlaceholderPatterns {
        PlaceholderPatterns::new(&[
            "{{name}}".to_string(),
            "{name}".to_string(),
            "%{name}".to_string(),
        ])
        .unwrap()
    }

    fn names(value: &str) -> Vec<String> {
        defaults().extract(value).into_iter().collect()
    }

    #[test]
    fn test_extract() {
        assert_eq!(names("Hello {{ name }}, you have {count} items"), vec!["count", "name"]);
        assert_eq!(names("%{user.name} joined"), vec!["user.name"]);
        assert!(names("No tokens here {}").is_empty());
    }

    #[test]
    fn test_delta() {
        let patterns = defaults();
        let delta = TokenDelta::between(
            &patterns.extract("{name} has {count} new messages"),
            &patterns.extract("{nom} a {count} nouveaux messages"),
        );
        assert_eq!(delta.missing, vec!["name"]);
        assert_eq!(delta.extra, vec!["nom"]);
        assert!(
            TokenDelta::between(&patterns.extract("{a}"), &patterns.extract("x {a}")).is_empty()
        );
    }

    #[test]
    fn test_invalid_format() {
        assert!(PlaceholderPatterns::new(&["{x}".to_string()]).is_err());
        assert!(PlaceholderPatterns::new(&["name".to_string()]).is_err());
    }
}
