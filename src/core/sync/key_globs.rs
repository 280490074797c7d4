//! Key globs for dynamically built keys.
//!
//! `nav.*` allows every key one segment below `nav`; `errors.**` allows any
//! depth. Inside a segment `*` matches zero or more characters, so
//! `form.*_label` matches `form.email_label`.

use anyhow::{Result, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGlob {
    pattern: String,
    segments: Vec<String>,
}

impl KeyGlob {
    pub fn new(pattern: &str) -> Result<Self> {
        let segments: Vec<String> = pattern.split('.').map(str::to_string).collect();
        if pattern.is_empty() || segments.iter().any(String::is_empty) {
            bail!("Invalid key glob: '{}'", pattern);
        }
        Ok(Self {
            pattern: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, key: &str) -> bool {
        let key_segments: Vec<&str> = key.split('.').collect();
        let pattern: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        matches_segments(&pattern, &key_segments)
    }
}

/// Compile every pattern, failing on the first invalid one.
pub fn compile(patterns: &[String]) -> Result<Vec<KeyGlob>> {
    patterns.iter().map(|p| KeyGlob::new(p)).collect()
}

pub fn any_match(globs: &[KeyGlob], key: &str) -> bool {
    globs.iter().any(|g| g.matches(key))
}

fn matches_segments(pattern: &[&str], key: &[&str]) -> bool {
    match pattern.split_first() {
        None => key.is_empty(),
        Some((&"**", rest)) => (0..=key.len()).any(|skip| matches_segments(rest, &key[skip..])),
        Some((first, rest)) => match key.split_first() {
            Some((segment, key_rest)) => {
                segment_matches(first, segment) && matches_segments(rest, key_rest)
            }
            None => false,
        },
    }
}

/// Match a single segment; `*` matches 0 or more characters.
fn segment_matches(pattern: &str, text: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if !pattern.contains('*') {
        return pattern == text;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !text.starts_with(first) || !text.ends_with(last) || first.len() + last.len() > text.len() {
        return false;
    }

    let mut pos = first.len();
    let end = text.len() - last.len();
    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        match text[pos..end].find(part) {
            Some(found) => pos += found + part.len(),
            None => return false,
        }
    }
    true
}
