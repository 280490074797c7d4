//! Single-file component (`.vue`) parsing.
//!
//! Script blocks are located textually and handed to the ECMAScript parser.
//! The template block is parsed into an owned markup tree by tree-sitter-html
//! when the `sfc` feature is compiled in; callers check
//! [`STRUCTURED_SFC_AVAILABLE`] and fall back to line-oriented extraction
//! otherwise.

use std::ops::Range;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::jsx::EcmaFlavor;

/// Whether the structured template parser is compiled into this build.
pub const STRUCTURED_SFC_AVAILABLE: bool = cfg!(feature = "sfc");

static SCRIPT_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<script\b([^>]*)>").unwrap());
static SCRIPT_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</script\s*>").unwrap());
static LANG_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"lang\s*=\s*["']?([A-Za-z]+)"#).unwrap());

/// A `<script>` block of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBlock {
    /// Byte range of the block content (between the tags).
    pub range: Range<usize>,
    pub flavor: EcmaFlavor,
}

/// Locate every `<script>` block in a component file.
pub fn script_blocks(text: &str) -> Vec<ScriptBlock> {
    let mut blocks = Vec::new();
    let mut search_from = 0;

    while let Some(open) = SCRIPT_OPEN.captures_at(text, search_from) {
        let Some(whole) = open.get(0) else {
            break;
        };
        let attrs = open.get(1).map(|m| m.as_str()).unwrap_or_default();
        let content_start = whole.end();
        let Some(close) = SCRIPT_CLOSE.find_at(text, content_start) else {
            break;
        };

        let flavor = match LANG_ATTR
            .captures(attrs)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_ascii_lowercase())
            .as_deref()
        {
            Some("ts") => EcmaFlavor::TypeScript,
            Some("tsx") => EcmaFlavor::Tsx,
            _ => EcmaFlavor::JavaScript,
        };

        blocks.push(ScriptBlock {
            range: content_start..close.start(),
            flavor,
        });
        search_from = close.end();
    }

    blocks
}

/// Owned markup tree produced from the component template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Element(MarkupElement),
    /// Character data; may contain `{{ }}` interpolations and entities.
    Text { range: Range<usize> },
    Comment { range: Range<usize> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupElement {
    pub tag: String,
    /// Byte range of the whole element.
    pub range: Range<usize>,
    pub attrs: Vec<MarkupAttr>,
    pub children: Vec<MarkupNode>,
}

impl MarkupElement {
    pub fn attr(&self, name: &str) -> Option<&MarkupAttr> {
        self.attrs.iter().find(|a| a.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupAttr {
    pub name: String,
    /// Byte range of the whole attribute (`name="value"`).
    pub range: Range<usize>,
    /// Byte range of the value without quotes.
    pub value: Option<Range<usize>>,
}

impl MarkupAttr {
    pub fn value_text<'a>(&self, source: &'a str) -> Option<&'a str> {
        self.value.clone().and_then(|r| source.get(r))
    }

    /// Bound (`:x`, `v-bind:x`) or directive (`v-if`, `@click`) attributes
    /// carry expressions instead of literal text.
    pub fn is_expression(&self) -> bool {
        self.name.starts_with(':')
            || self.name.starts_with('@')
            || self.name.starts_with("v-")
            || self.name.starts_with('#')
    }

    /// Attribute name with any binding prefix removed.
    pub fn bare_name(&self) -> &str {
        self.name
            .strip_prefix("v-bind:")
            .or_else(|| self.name.strip_prefix(':'))
            .unwrap_or(&self.name)
    }
}

/// Parse the top-level `<template>` of a component into markup nodes.
///
/// Returns the template's children, or an empty list when the component
/// has no template. Fails when the structured parser is not compiled in or
/// reports a syntax error, so callers can degrade to the text fallback.
pub fn parse_template(source: &str) -> Result<Vec<MarkupNode>> {
    structured::parse_template(source)
}

#[cfg(feature = "sfc")]
mod structured {
    use anyhow::{Result, anyhow, bail};
    use tree_sitter::{Node, Parser};

    use super::{MarkupAttr, MarkupElement, MarkupNode};

    pub fn parse_template(source: &str) -> Result<Vec<MarkupNode>> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_html::LANGUAGE.into())
            .map_err(|e| anyhow!("Failed to load HTML grammar: {}", e))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow!("HTML parser returned no tree"))?;
        let root = tree.root_node();

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            if child.kind() != "element" {
                continue;
            }
            let element = convert_element(child, source);
            if element.tag == "template" {
                if child.has_error() {
                    bail!("Template contains markup the structured parser cannot read");
                }
                return Ok(element.children);
            }
        }
        Ok(Vec::new())
    }

    fn convert_element(node: Node, source: &str) -> MarkupElement {
        let mut tag = String::new();
        let mut attrs = Vec::new();
        let mut children: Vec<MarkupNode> = Vec::new();

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "start_tag" | "self_closing_tag" => {
                    let mut tag_cursor = child.walk();
                    for part in child.named_children(&mut tag_cursor) {
                        match part.kind() {
                            "tag_name" => tag = source[part.byte_range()].to_string(),
                            "attribute" => attrs.push(convert_attr(part, source)),
                            _ => {}
                        }
                    }
                }
                "end_tag" => {}
                "element" | "script_element" | "style_element" => {
                    children.push(MarkupNode::Element(convert_element(child, source)));
                }
                "comment" => children.push(MarkupNode::Comment {
                    range: child.byte_range(),
                }),
                "text" | "entity" => push_text(&mut children, child.byte_range(), source),
                _ => {}
            }
        }

        MarkupElement {
            tag,
            range: node.byte_range(),
            attrs,
            children,
        }
    }

    /// The grammar splits text around entities and trims it; merge adjacent
    /// runs back into one text node.
    fn push_text(children: &mut Vec<MarkupNode>, range: std::ops::Range<usize>, source: &str) {
        if let Some(MarkupNode::Text { range: last }) = children.last_mut()
            && source
                .get(last.end..range.start)
                .is_some_and(|gap| gap.trim().is_empty())
        {
            last.end = range.end;
            return;
        }
        children.push(MarkupNode::Text { range });
    }

    fn convert_attr(node: Node, source: &str) -> MarkupAttr {
        let mut name = String::new();
        let mut value = None;

        let mut cursor = node.walk();
        for part in node.named_children(&mut cursor) {
            match part.kind() {
                "attribute_name" => name = source[part.byte_range()].to_string(),
                "attribute_value" => value = Some(part.byte_range()),
                "quoted_attribute_value" => {
                    let mut inner_cursor = part.walk();
                    let inner = part
                        .named_children(&mut inner_cursor)
                        .find(|n| n.kind() == "attribute_value");
                    value = Some(match inner {
                        Some(inner) => inner.byte_range(),
                        // Empty quotes: zero-width range just inside them.
                        None => part.start_byte() + 1..part.start_byte() + 1,
                    });
                }
                _ => {}
            }
        }

        MarkupAttr {
            name,
            range: node.byte_range(),
            value,
        }
    }
}

#[cfg(not(feature = "sfc"))]
mod structured {
    use anyhow::{Result, bail};

    use super::MarkupNode;

    pub fn parse_template(_source: &str) -> Result<Vec<MarkupNode>> {
        bail!("structured component parser is not available in this build")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_blocks() {
        let text = "<template><p>Hi</p></template>\n<script setup lang=\"ts\">\nconst a = 1;\n</script>\n";
        let blocks = script_blocks(text);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].flavor, EcmaFlavor::TypeScript);
        assert_eq!(&text[blocks[0].range.clone()], "\nconst a = 1;\n");
    }

    #[test]
    fn test_multiple_script_blocks() {
        let text = "<script>export default {}</script>\n<script setup>const b = 2</script>";
        let blocks = script_blocks(text);

        assert_eq!(blocks.len(), 2);
        assert_eq!(&text[blocks[1].range.clone()], "const b = 2");
        assert_eq!(blocks[1].flavor, EcmaFlavor::JavaScript);
    }

    #[test]
    fn test_attr_helpers() {
        let attr = MarkupAttr {
            name: ":title".to_string(),
            range: 0..10,
            value: Some(8..9),
        };
        assert!(attr.is_expression());
        assert_eq!(attr.bare_name(), "title");

        let plain = MarkupAttr {
            name: "placeholder".to_string(),
            range: 0..10,
            value: None,
        };
        assert!(!plain.is_expression());
    }

    #[cfg(feature = "sfc")]
    #[test]
    fn test_parse_template_tree() {
        let source = r#"<template>
  <div title="Greeting">
    <p>Terms &amp; Conditions</p>
    <!-- note -->
  </div>
</template>
<script>export default {}</script>
"#;
        let nodes = parse_template(source).unwrap();
        let MarkupNode::Element(div) = nodes
            .iter()
            .find(|n| matches!(n, MarkupNode::Element(_)))
            .unwrap()
        else {
            unreachable!()
        };
        assert_eq!(div.tag, "div");
        let title = div.attr("title").unwrap();
        assert_eq!(title.value_text(source), Some("Greeting"));

        let MarkupNode::Element(p) = div
            .children
            .iter()
            .find(|n| matches!(n, MarkupNode::Element(_)))
            .unwrap()
        else {
            unreachable!()
        };
        let MarkupNode::Text { range } = &p.children[0] else {
            unreachable!()
        };
        assert_eq!(&source[range.clone()], "Terms &amp; Conditions");
        assert!(
            div.children
                .iter()
                .any(|n| matches!(n, MarkupNode::Comment { .. }))
        );
    }

    #[cfg(not(feature = "sfc"))]
    #[test]
    fn test_parse_template_unavailable() {
        assert!(parse_template("<template><p>x</p></template>").is_err());
    }
}
