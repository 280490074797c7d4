//! Deterministic key generation.
//!
//! `Save changes` found in `src/components/UserProfile.tsx` becomes
//! `app.components.user-profile.save-changes-3f9a1c`: namespace, a context
//! path from the file location, a slug of the text and a digest of
//! `(text, file path)`. Nothing here depends on time, process or run order.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::core::scan::CandidateKind;

const MAX_SLUG_TOKENS: usize = 6;
const CONTEXT_DEPTH: usize = 2;
const PREVIEW_CHARS: usize = 40;

/// Path segments that carry no context.
const IGNORED_SEGMENTS: &[&str] = &["", ".", "src", "index"];

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "of", "to", "and", "or", "in", "on", "for", "is", "are", "be",
];

/// Where the text was found.
#[derive(Debug, Clone, Copy)]
pub struct KeyContext<'a> {
    pub file_path: &'a str,
    pub kind: CandidateKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedKey {
    pub key: String,
    pub hash: String,
    /// Short human-readable label for listings.
    pub preview: String,
}

#[derive(Debug, Clone)]
pub struct KeyGenerator {
    namespace: String,
    hash_length: usize,
}

impl KeyGenerator {
    pub fn new(namespace: impl Into<String>, hash_length: usize) -> Self {
        Self {
            namespace: namespace.into(),
            hash_length,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.key_namespace, config.key_hash_length)
    }

    pub fn generate(&self, text: &str, ctx: KeyContext<'_>) -> GeneratedKey {
        let hash = digest(text, ctx.file_path, self.hash_length);

        let mut slug = slug(text);
        if slug.is_empty() {
            slug.push_str("text");
        }

        let mut segments: Vec<String> = Vec::with_capacity(CONTEXT_DEPTH + 2);
        if !self.namespace.is_empty() {
            segments.push(self.namespace.clone());
        }
        segments.extend(context_path(ctx.file_path));
        segments.push(format!("{}-{}", slug, hash));

        GeneratedKey {
            key: segments.join("."),
            hash,
            preview: format!("{}: {}", ctx.kind.as_str(), preview(text)),
        }
    }
}

/// Lowercase words of `text`, split at non-letters and at camel-case and
/// acronym transitions (`HTMLParser` → `html`, `parser`).
pub fn tokenize(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphabetic() {
            flush(&mut current, &mut tokens);
            continue;
        }
        if let Some(&prev) = i.checked_sub(1).and_then(|p| chars.get(p)) {
            let next = chars.get(i + 1).copied();
            let camel = prev.is_lowercase() && c.is_uppercase();
            let acronym_end = prev.is_uppercase()
                && c.is_uppercase()
                && next.is_some_and(|n| n.is_lowercase());
            if camel || acronym_end {
                flush(&mut current, &mut tokens);
            }
        }
        current.extend(c.to_lowercase());
    }
    flush(&mut current, &mut tokens);
    tokens
}

fn flush(current: &mut String, tokens: &mut Vec<String>) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

/// Kebab-case slug of the significant ASCII tokens of `text`.
pub fn slug(text: &str) -> String {
    let tokens: Vec<String> = tokenize(text)
        .into_iter()
        .filter(|t| t.chars().all(|c| c.is_ascii_lowercase()))
        .collect();
    let significant: Vec<&String> = tokens
        .iter()
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .collect();
    let chosen: Vec<&str> = if significant.is_empty() {
        tokens.iter().map(String::as_str).collect()
    } else {
        significant.into_iter().map(String::as_str).collect()
    };
    chosen
        .into_iter()
        .take(MAX_SLUG_TOKENS)
        .collect::<Vec<_>>()
        .join("-")
}

/// Last directory and file stem of `file_path`, kebab-cased.
pub fn context_path(file_path: &str) -> Vec<String> {
    let path = Path::new(file_path).with_extension("");
    let segments: Vec<String> = path
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .filter(|s| !IGNORED_SEGMENTS.contains(s) && *s != "..")
        .map(slug)
        .filter(|s| !s.is_empty())
        .collect();
    let skip = segments.len().saturating_sub(CONTEXT_DEPTH);
    segments.into_iter().skip(skip).collect()
}

fn digest(text: &str, file_path: &str, length: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update([0u8]);
    hasher.update(file_path.replace('\\', "/").as_bytes());
    let mut hex = hex::encode(hasher.finalize());
    hex.truncate(length);
    hex
}

fn preview(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= PREVIEW_CHARS {
        collapsed
    } else {
        let cut: String = collapsed.chars().take(PREVIEW_CHARS - 1).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx(file_path: &str) -> KeyContext<'_> {
        KeyContext {
            file_path,
            kind: CandidateKind::BareText,
        }
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Save changes!"), vec!["save", "changes"]);
        assert_eq!(tokenize("userProfile"), vec!["user", "profile"]);
        assert_eq!(tokenize("HTMLParser ready"), vec!["html", "parser", "ready"]);
        assert_eq!(tokenize("Step 2 of 3"), vec!["step", "of"]);
    }

    #[test]
    fn test_slug_drops_stop_words_and_caps_length() {
        assert_eq!(slug("Go to the settings page"), "go-settings-page");
        assert_eq!(
            slug("one two three four five six seven eight"),
            "one-two-three-four-five-six"
        );
        assert_eq!(slug("of the"), "of-the");
        assert_eq!(slug("保存"), "");
    }

    #[test]
    fn test_context_path() {
        assert_eq!(
            context_path("src/components/UserProfile.tsx"),
            vec!["components", "user-profile"]
        );
        assert_eq!(
            context_path("src/pages/settings/index.vue"),
            vec!["pages", "settings"]
        );
        assert_eq!(context_path("App.vue"), vec!["app"]);
        assert!(context_path("").is_empty());
    }

    #[test]
    fn test_generate_shape() {
        let generator = KeyGenerator::new("app", 6);
        let generated = generator.generate("Save changes", ctx("src/components/UserProfile.tsx"));
        assert_eq!(generated.hash.len(), 6);
        assert_eq!(
            generated.key,
            format!("app.components.user-profile.save-changes-{}", generated.hash)
        );
        assert_eq!(generated.preview, "bare-text: Save changes");
    }

    #[test]
    fn test_generate_is_deterministic() {
        let generator = KeyGenerator::new("app", 8);
        let a = generator.generate("Welcome back", ctx("src/Home.tsx"));
        let b = KeyGenerator::new("app", 8).generate("Welcome back", ctx("src/Home.tsx"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_digest_depends_on_text_and_path() {
        let generator = KeyGenerator::new("app", 6);
        let base = generator.generate("Welcome", ctx("src/Home.tsx"));
        let other_path = generator.generate("Welcome", ctx("src/About.tsx"));
        let other_text = generator.generate("Welcome!", ctx("src/Home.tsx"));
        assert_ne!(base.hash, other_path.hash);
        assert_ne!(base.hash, other_text.hash);
    }

    #[test]
    fn test_non_latin_text_gets_placeholder_slug() {
        let generator = KeyGenerator::new("app", 6);
        let generated = generator.generate("保存する", ctx("src/Home.tsx"));
        assert!(generated.key.starts_with("app.home.text-"));
    }

    #[test]
    fn test_preview_truncates() {
        let long = "word ".repeat(20);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS);
        assert!(p.ends_with('…'));
    }
}
