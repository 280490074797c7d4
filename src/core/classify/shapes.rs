//! Literal shapes that look like strings but are not user-facing text.

use std::sync::LazyLock;

use regex::Regex;

use super::analysis::SkipReason;

static SQL_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)^\s*(select\s+.+\s+from\b|insert\s+into\b|update\s+\w+\s+set\b|delete\s+from\b|create\s+(table|index)\b|drop\s+table\b|alter\s+table\b)",
    )
    .unwrap()
});
static FORMAT_SPECIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%(\d+\$)?[-+0#]*\d*(\.\d+)?[sdifuxXeEgGcop@]").unwrap());
static PHONE_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[\d\s().-]{7,}$").unwrap());
static REGEX_SLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/.+/[dgimsuy]*$").unwrap());
static TRANSLATION_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(\$?t|i18n\.t|\$i18n\.t)\(\s*['"`][^'"`]+['"`]\s*(,.*)?\)\s*$"#).unwrap()
});

/// Returns why `text` is not translatable, or `None` when it may be text.
pub fn non_translatable_reason(text: &str) -> Option<SkipReason> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if is_json_like(trimmed) {
        return Some(SkipReason::JsonLike);
    }
    if SQL_LIKE.is_match(trimmed) {
        return Some(SkipReason::SqlLike);
    }
    if TRANSLATION_CALL.is_match(trimmed) {
        return Some(SkipReason::TranslationCall);
    }
    if FORMAT_SPECIFIER.is_match(trimmed) {
        return Some(SkipReason::FormatSpecifier);
    }
    if is_regex_like(trimmed) {
        return Some(SkipReason::RegexLike);
    }
    if PHONE_LIKE.is_match(trimmed) && trimmed.chars().filter(char::is_ascii_digit).count() >= 7 {
        return Some(SkipReason::PhoneNumber);
    }
    None
}

fn is_json_like(text: &str) -> bool {
    let object = text.starts_with('{') && text.ends_with('}') && text.contains(':');
    let array = text.starts_with('[')
        && text.ends_with(']')
        && (text.contains('"') || text.contains(',') || text.len() == 2);
    if !(object || array) {
        return false;
    }
    // Loose object literals (`{ a: 1 }`) are not valid JSON but are still data.
    serde_json::from_str::<serde_json::Value>(text).is_ok() || (object && text.contains('"'))
}

fn is_regex_like(text: &str) -> bool {
    if text.starts_with('^') && text.ends_with('$') && text.len() > 2 {
        return true;
    }
    if REGEX_SLASHES.is_match(text) && !text.contains(' ') {
        return true;
    }
    text.starts_with("(?:") || text.starts_with("(?=") || text.starts_with("(?!")
}
