//! Text normalization and the "meaningful text" heuristic.

use std::borrow::Cow;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use super::candidate::RejectReason;
use crate::config::Config;
use crate::core::classify::{Interpolation, Segment};

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").unwrap());
static HORIZONTAL_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]+").unwrap());
static BLANK_AROUND_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" ?\n ?").unwrap());
static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3,4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap());
static LOCALE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2,3}(?:[-_][A-Za-z]{2,4})?$").unwrap());
static SCREAMING_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9]*(?:_[A-Z0-9]+)+$").unwrap());
static IDENTIFIER_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z0-9]+(?:[-_.:/][a-z0-9]+)+|[a-z]+[A-Z][A-Za-z0-9]*)$").unwrap()
});
static URL_OR_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[a-z][a-z0-9+.-]*://|/|\./|\.\./|mailto:)\S*$").unwrap());
static EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Minimum share of letters among non-space characters.
const MIN_LETTER_RATIO: f64 = 0.25;

/// Text acceptance rules derived from configuration.
#[derive(Debug, Clone)]
pub struct TextRules {
    pub min_length: usize,
    pub deny: Vec<Regex>,
    pub allow: Vec<Regex>,
    pub decode_entities: bool,
    pub preserve_newlines: bool,
}

impl Default for TextRules {
    fn default() -> Self {
        Self {
            min_length: 2,
            deny: Vec::new(),
            allow: Vec::new(),
            decode_entities: true,
            preserve_newlines: false,
        }
    }
}

impl TextRules {
    pub fn from_config(config: &Config) -> Result<Self> {
        let compile = |patterns: &[String], field: &str| -> Result<Vec<Regex>> {
            patterns
                .iter()
                .map(|p| {
                    Regex::new(p).with_context(|| {
                        format!("Invalid regular expression in '{}': \"{}\"", field, p)
                    })
                })
                .collect()
        };
        Ok(Self {
            min_length: config.min_text_length,
            deny: compile(&config.deny_patterns, "denyPatterns")?,
            allow: compile(&config.allow_patterns, "allowPatterns")?,
            decode_entities: config.decode_entities,
            preserve_newlines: config.preserve_newlines,
        })
    }

    /// Decode (for markup) and collapse whitespace.
    pub fn normalize(&self, text: &str, markup: bool) -> String {
        let decoded = if markup && self.decode_entities {
            decode_entities(text)
        } else {
            Cow::Borrowed(text)
        };
        collapse_whitespace(&decoded, self.preserve_newlines)
    }

    /// Collapse whitespace in the static segments the same way
    /// [`normalize`](Self::normalize) does, so the rendered template matches
    /// the normalized message text.
    pub fn normalize_interpolation(&self, mut interpolation: Interpolation) -> Interpolation {
        let last = interpolation.segments.len().saturating_sub(1);
        for (index, segment) in interpolation.segments.iter_mut().enumerate() {
            let Segment::Static(text) = segment else {
                continue;
            };
            let mut collapsed = collapse_runs(text, self.preserve_newlines);
            if index == 0 {
                collapsed = collapsed.trim_start().to_string();
            }
            if index == last {
                collapsed = collapsed.trim_end().to_string();
            }
            *text = collapsed;
        }
        interpolation
            .segments
            .retain(|s| !matches!(s, Segment::Static(text) if text.is_empty()));
        interpolation
    }

    /// Decide whether normalized `text` is worth extracting.
    pub fn check(&self, text: &str, forced: bool) -> Result<(), RejectReason> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(RejectReason::Empty);
        }
        if forced {
            return Ok(());
        }
        if trimmed.chars().count() < self.min_length {
            return Err(RejectReason::BelowMinLength);
        }
        if self.deny.iter().any(|re| re.is_match(trimmed)) {
            return Err(RejectReason::DeniedPattern);
        }
        if self.allow.iter().any(|re| re.is_match(trimmed)) {
            return Ok(());
        }
        meaningful_text(trimmed)
    }
}

/// Default text-shape heuristic.
pub fn meaningful_text(text: &str) -> Result<(), RejectReason> {
    let without_entities = ENTITY.replace_all(text, "");
    let letters = without_entities.chars().filter(|c| c.is_alphabetic()).count();
    if letters == 0 {
        return Err(RejectReason::NoLetters);
    }

    if HEX_COLOR.is_match(text)
        || LOCALE_CODE.is_match(text)
        || SCREAMING_CASE.is_match(text)
        || IDENTIFIER_LIKE.is_match(text)
        || URL_OR_PATH.is_match(text)
        || EMAIL.is_match(text)
    {
        return Err(RejectReason::NonSentence);
    }

    let has_cjk = text.chars().any(is_cjk);
    let visible = without_entities
        .chars()
        .filter(|c| !c.is_whitespace())
        .count();
    let ratio = letters as f64 / visible.max(1) as f64;
    if !has_cjk && (letters < 2 || ratio < MIN_LETTER_RATIO) {
        return Err(RejectReason::InsufficientLetters);
    }

    let min_run = if has_cjk { 1 } else { 2 };
    if longest_letter_run(&without_entities) < min_run {
        return Err(RejectReason::InsufficientLetters);
    }

    Ok(())
}

/// Call arguments without internal whitespace look like structured keys.
pub fn looks_like_sentence(text: &str) -> bool {
    text.trim().contains(char::is_whitespace) || text.chars().any(is_cjk)
}

fn longest_letter_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c.is_alphabetic() {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3040..=0x30FF     // kana
        | 0x3400..=0x4DBF   // CJK extension A
        | 0x4E00..=0x9FFF   // CJK unified
        | 0xAC00..=0xD7AF   // hangul
        | 0xF900..=0xFAFF)
}

/// Collapse runs of whitespace to one space. With `preserve_newlines`, only
/// horizontal runs collapse and line breaks are normalized to `\n`.
pub fn collapse_whitespace(text: &str, preserve_newlines: bool) -> String {
    collapse_runs(text, preserve_newlines).trim().to_string()
}

/// [`collapse_whitespace`] without trimming the ends.
fn collapse_runs(text: &str, preserve_newlines: bool) -> String {
    if preserve_newlines {
        let unified = text.replace("\r\n", "\n").replace('\r', "\n");
        let collapsed = HORIZONTAL_WS.replace_all(&unified, " ");
        return BLANK_AROUND_NEWLINE
            .replace_all(&collapsed, "\n")
            .into_owned();
    }
    WHITESPACE_RUN.replace_all(text, " ").into_owned()
}

/// Decode named and numeric HTML entities. Unknown names are kept verbatim.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    ENTITY.replace_all(text, |caps: &regex::Captures| {
        let body = &caps[1];
        let decoded = if let Some(hex) = body
            .strip_prefix("#x")
            .or_else(|| body.strip_prefix("#X"))
        {
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
        } else if let Some(dec) = body.strip_prefix('#') {
            dec.parse::<u32>().ok().and_then(char::from_u32)
        } else {
            named_entity(body)
        };
        match decoded {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    })
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "hellip" => '…',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "laquo" => '«',
        "raquo" => '»',
        "times" => '×',
        "middot" => '·',
        "bull" => '•',
        "deg" => '°',
        "euro" => '€',
        "pound" => '£',
        "yen" => '¥',
        "cent" => '¢',
        _ => return None,
    };
    Some(c)
}
