use anyhow::{Result, anyhow, bail};
use std::collections::HashMap;
use swc_common::{
    BytePos, FileName, Globals, SourceFile, SourceMap, Spanned,
    comments::{Comment, SingleThreadedComments},
    sync::Lrc,
};
use swc_ecma_ast::{Expr, Module};
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};

use crate::core::source::Snippets;

/// Map of byte positions to comments.
pub type CommentMap = HashMap<BytePos, Vec<Comment>>;

/// Thread-safe extracted comments from SingleThreadedComments.
/// Extracted during parsing and stored independently of swc types.
#[derive(Debug, Clone, Default)]
pub struct ExtractedComments {
    pub leading: CommentMap,
    pub trailing: CommentMap,
}

impl ExtractedComments {
    /// Extract comments from SingleThreadedComments.
    /// This must be called before SingleThreadedComments is dropped.
    pub fn from_swc(comments: &SingleThreadedComments) -> Self {
        let (leading, trailing) = comments.borrow_all();
        Self {
            leading: leading.iter().map(|(k, v)| (*k, v.clone())).collect(),
            trailing: trailing.iter().map(|(k, v)| (*k, v.clone())).collect(),
        }
    }

    /// Every comment once, in source order.
    pub fn all(&self) -> Vec<&Comment> {
        let mut all: Vec<&Comment> = self
            .leading
            .values()
            .chain(self.trailing.values())
            .flatten()
            .collect();
        all.sort_by_key(|c| c.span.lo);
        all.dedup_by_key(|c| c.span.lo);
        all
    }
}

/// ECMAScript flavour, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcmaFlavor {
    TypeScript,
    Tsx,
    JavaScript,
}

impl EcmaFlavor {
    pub fn from_path(path: &str) -> Self {
        let ext = path.rsplit('.').next().unwrap_or_default();
        match ext {
            "ts" | "mts" | "cts" => Self::TypeScript,
            "tsx" => Self::Tsx,
            _ => Self::JavaScript,
        }
    }

    fn syntax(self) -> Syntax {
        match self {
            Self::TypeScript => Syntax::Typescript(TsSyntax {
                tsx: false,
                decorators: true,
                ..Default::default()
            }),
            Self::Tsx => Syntax::Typescript(TsSyntax {
                tsx: true,
                decorators: true,
                ..Default::default()
            }),
            Self::JavaScript => Syntax::Es(EsSyntax {
                jsx: true,
                decorators: true,
                ..Default::default()
            }),
        }
    }
}

pub struct ParsedSource {
    pub module: Module,
    pub source_file: Lrc<SourceFile>,
    pub comments: ExtractedComments,
    /// Byte offset of the parsed text inside its host file.
    pub file_offset: usize,
}

impl ParsedSource {
    pub fn snippets<'a>(&self, text: &'a str) -> Snippets<'a> {
        Snippets::new(text, self.source_file.start_pos, self.file_offset)
    }
}

pub struct ParsedExpr {
    pub expr: Box<Expr>,
    pub source_file: Lrc<SourceFile>,
    pub file_offset: usize,
}

impl ParsedExpr {
    pub fn snippets<'a>(&self, text: &'a str) -> Snippets<'a> {
        Snippets::new(text, self.source_file.start_pos, self.file_offset)
    }
}

/// Parse a JS/TS/JSX/TSX module.
///
/// `file_offset` is the position of `code` within the host file; it is
/// non-zero when parsing an embedded `<script>` block.
pub fn parse_module(
    code: &str,
    file_path: &str,
    flavor: EcmaFlavor,
    file_offset: usize,
) -> Result<ParsedSource> {
    use swc_common::GLOBALS;

    // Wrap in GLOBALS.set() for thread safety
    GLOBALS.set(&Globals::new(), || {
        let source_map: Lrc<SourceMap> = Default::default();
        let source_file = source_map
            .new_source_file(FileName::Real(file_path.into()).into(), code.to_string());

        let comments = SingleThreadedComments::default();
        let mut parser = Parser::new(
            flavor.syntax(),
            StringInput::from(&*source_file),
            Some(&comments),
        );

        let module = parser
            .parse_module()
            .map_err(|e| anyhow!("Failed to parse {}: {:?}", file_path, e))?;

        // Extract comments immediately (before SingleThreadedComments drops)
        let extracted_comments = ExtractedComments::from_swc(&comments);

        Ok(ParsedSource {
            module,
            source_file,
            comments: extracted_comments,
            file_offset,
        })
    })
}

/// Parse a standalone expression, such as a template binding or a scanned
/// expression span handed back to the codemod writer.
pub fn parse_expression(code: &str, file_offset: usize) -> Result<ParsedExpr> {
    use swc_common::GLOBALS;

    GLOBALS.set(&Globals::new(), || {
        let source_map: Lrc<SourceMap> = Default::default();
        let source_file =
            source_map.new_source_file(FileName::Anon.into(), code.to_string());

        let syntax = Syntax::Typescript(TsSyntax {
            tsx: false,
            ..Default::default()
        });
        let mut parser = Parser::new(syntax, StringInput::from(&*source_file), None);

        let expr = parser
            .parse_expr()
            .map_err(|e| anyhow!("Failed to parse expression: {:?}", e))?;

        // `a(); b()` parses as `a()`; anything left over is an error.
        let end = (expr.span().hi - source_file.start_pos).0 as usize;
        if !code[end.min(code.len())..].trim().is_empty() {
            bail!("unexpected input after expression: {}", code[end.min(code.len())..].trim());
        }

        Ok(ParsedExpr {
            expr,
            source_file,
            file_offset,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flavor_from_path() {
        assert_eq!(EcmaFlavor::from_path("a/b.tsx"), EcmaFlavor::Tsx);
        assert_eq!(EcmaFlavor::from_path("a/b.ts"), EcmaFlavor::TypeScript);
        assert_eq!(EcmaFlavor::from_path("a/b.jsx"), EcmaFlavor::JavaScript);
        assert_eq!(EcmaFlavor::from_path("a/b.mjs"), EcmaFlavor::JavaScript);
    }

    #[test]
    fn test_parse_tsx_module() {
        let code = "export const A = () => <div title=\"Hi\">Hello</div>;";
        let parsed = parse_module(code, "a.tsx", EcmaFlavor::Tsx, 0).unwrap();
        assert_eq!(parsed.module.body.len(), 1);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let result = parse_module("const = ;", "broken.ts", EcmaFlavor::TypeScript, 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_expression_spans() {
        let code = "'Count: ' + count";
        let parsed = parse_expression(code, 10).unwrap();
        let snippets = parsed.snippets(code);
        use swc_common::Spanned;
        assert_eq!(snippets.text(parsed.expr.span()), code);
        assert_eq!(snippets.file_range(parsed.expr.span()), 10..27);
    }

    #[test]
    fn test_comments_are_collected() {
        let code = "// lingo-skip\nconst a = 1; /* trailing */";
        let parsed = parse_module(code, "a.ts", EcmaFlavor::TypeScript, 0).unwrap();
        let texts: Vec<String> = parsed
            .comments
            .all()
            .iter()
            .map(|c| c.text.to_string())
            .collect();
        assert!(texts.iter().any(|t| t.contains("lingo-skip")));
    }
}
