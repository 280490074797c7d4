//! Source positions shared by every dialect.
//!
//! Scanning and extraction record byte spans into the original file text and
//! convert them to 1-based line/column pairs through a `LineIndex`. Keeping
//! spans as byte ranges lets the codemod writer re-verify them before editing.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use swc_common::{BytePos, Span};

/// 1-based line and column (column counted in characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Index of line start byte offsets for O(log n) position lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    offsets: Vec<usize>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut offsets = vec![0];
        for (i, c) in content.char_indices() {
            if c == '\n' {
                offsets.push(i + 1);
            }
        }
        Self { offsets }
    }

    /// 1-based line number containing `offset`.
    pub fn line(&self, offset: usize) -> usize {
        match self.offsets.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }

    pub fn position(&self, content: &str, offset: usize) -> Position {
        let line = self.line(offset);
        let start = self.offsets[line - 1];
        let end = offset.min(content.len());
        let col = content
            .get(start..end)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(0);
        Position::new(line, col + 1)
    }

    /// Byte offset where the line containing `offset` begins.
    pub fn line_start(&self, offset: usize) -> usize {
        self.offsets[self.line(offset) - 1]
    }

    /// Text of a 1-based line without its line terminator.
    pub fn line_text<'a>(&self, content: &'a str, line: usize) -> &'a str {
        if line == 0 || line > self.offsets.len() {
            return "";
        }
        let start = self.offsets[line - 1];
        let end = self
            .offsets
            .get(line)
            .map(|next| next.saturating_sub(1))
            .unwrap_or(content.len());
        content
            .get(start..end)
            .map(|text| text.trim_end_matches('\r'))
            .unwrap_or("")
    }

    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }
}

/// Maps swc spans of a parsed fragment back to byte ranges of the host file.
///
/// A fragment is either a whole file (`file_offset == 0`) or a slice of it
/// parsed on its own, such as a `<script>` block or a template expression.
#[derive(Debug, Clone, Copy)]
pub struct Snippets<'a> {
    text: &'a str,
    start_pos: BytePos,
    file_offset: usize,
}

impl<'a> Snippets<'a> {
    pub fn new(text: &'a str, start_pos: BytePos, file_offset: usize) -> Self {
        Self {
            text,
            start_pos,
            file_offset,
        }
    }

    /// Byte range of `span` within the fragment text.
    pub fn local(&self, span: Span) -> Range<usize> {
        let lo = span.lo.0.saturating_sub(self.start_pos.0) as usize;
        let hi = span.hi.0.saturating_sub(self.start_pos.0) as usize;
        lo.min(self.text.len())..hi.min(self.text.len())
    }

    /// Byte range of `span` within the host file.
    pub fn file_range(&self, span: Span) -> Range<usize> {
        let local = self.local(span);
        local.start + self.file_offset..local.end + self.file_offset
    }

    /// Source text covered by `span`.
    pub fn text(&self, span: Span) -> &'a str {
        self.text.get(self.local(span)).unwrap_or("")
    }

    pub fn file_offset(&self) -> usize {
        self.file_offset
    }
}
