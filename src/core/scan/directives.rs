//! Skip/force directives.
//!
//! A comment containing `lingo-skip` or `lingo-force` applies to its own line
//! when code precedes it there, otherwise to the next line:
//!
//! ```text
//! // lingo-skip
//! <p>Not extracted</p>
//! <p>Always extracted</p> {/* lingo-force */}
//! ```
//!
//! Elements can carry `data-i18n-skip` / `data-i18n-force`; these cover
//! text up to [`MAX_DIRECTIVE_DEPTH`] elements below the marked one.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::source::LineIndex;

pub const SKIP_MARKER_ATTR: &str = "data-i18n-skip";
pub const FORCE_MARKER_ATTR: &str = "data-i18n-force";

/// How many enclosing elements are searched for a marker attribute.
pub const MAX_DIRECTIVE_DEPTH: usize = 3;

static DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\blingo-(skip|force)\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Skip,
    Force,
}

impl Directive {
    pub fn from_comment(text: &str) -> Option<Self> {
        DIRECTIVE
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| match m.as_str() {
                "skip" => Self::Skip,
                _ => Self::Force,
            })
    }

    pub fn from_marker_attr(name: &str) -> Option<Self> {
        match name {
            SKIP_MARKER_ATTR => Some(Self::Skip),
            FORCE_MARKER_ATTR => Some(Self::Force),
            _ => None,
        }
    }
}

/// Directives keyed by the line they apply to.
#[derive(Debug, Default)]
pub struct LineDirectives {
    by_line: HashMap<usize, Directive>,
}

impl LineDirectives {
    /// Register a comment spanning `range` (file byte offsets) with body `text`.
    pub fn add_comment(
        &mut self,
        content: &str,
        lines: &LineIndex,
        range: std::ops::Range<usize>,
        text: &str,
    ) {
        let Some(directive) = Directive::from_comment(text) else {
            return;
        };
        let start_line = lines.line(range.start);
        let before = content
            .get(lines.line_start(range.start)..range.start)
            .unwrap_or_default()
            .trim();

        // `{/* ... */}` on its own line is a standalone JSX comment.
        let target = if before.is_empty() || before == "{" {
            lines.line(range.end) + 1
        } else {
            start_line
        };
        // Skip wins over force on the same line.
        let entry = self.by_line.entry(target).or_insert(directive);
        if directive == Directive::Skip {
            *entry = Directive::Skip;
        }
    }

    pub fn get(&self, line: usize) -> Option<Directive> {
        self.by_line.get(&line).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.by_line.is_empty()
    }
}

/// Nearest marker directive among the innermost [`MAX_DIRECTIVE_DEPTH`] frames.
pub fn marker_directive(stack: &[Option<Directive>]) -> Option<Directive> {
    stack
        .iter()
        .rev()
        .take(MAX_DIRECTIVE_DEPTH)
        .find_map(|d| *d)
}
