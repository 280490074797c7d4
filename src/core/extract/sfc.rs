//! Translation-call extraction for single-file components.
//!
//! The structured path parses every `<script>` block and every template
//! expression (mustaches and bound attributes) with swc. When the template
//! parser is unavailable, or any part of the structured path fails, the
//! whole file goes through [`extract_lines`] instead.

use std::ops::Range;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use tracing::debug;

use super::ecma::{CallCollector, target_name};
use super::reference::{DynamicKeyWarning, DynamicReason, FileReferences, TranslationReference};
use super::registry::ReferenceExtractor;
use crate::core::parsers::jsx::{parse_expression, parse_module};
use crate::core::parsers::sfc::{MarkupNode, parse_template, script_blocks};
use crate::core::source::LineIndex;

static MUSTACHE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{\{(.*?)\}\}").unwrap());

/// `) || 'Label'` following a key literal, possibly after more arguments.
static TRAILING_FALLBACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:,[^()]*)?\)\s*(?:\|\||\?\?)\s*(?:'([^'\\]*)'|"([^"\\]*)")"#).unwrap()
});

/// Attributes whose values are not plain expressions.
const NON_EXPRESSION_ATTRS: &[&str] = &["v-for", "v-slot"];

#[derive(Debug, Clone)]
pub struct SfcExtractor {
    pub identifier: String,
    /// Whether the structured template parser may be used.
    pub structured: bool,
}

impl ReferenceExtractor for SfcExtractor {
    fn extract(&self, file_path: &str, content: &str) -> Result<FileReferences> {
        if self.structured {
            match extract_structured(file_path, content, &self.identifier) {
                Ok(refs) => return Ok(refs),
                Err(e) => {
                    debug!(file = file_path, error = %e, "structured extraction failed, using line fallback");
                }
            }
        }
        extract_lines(file_path, content, &self.identifier)
    }
}

fn extract_structured(file_path: &str, content: &str, identifier: &str) -> Result<FileReferences> {
    let lines = LineIndex::new(content);
    let mut out = FileReferences::default();

    for block in script_blocks(content) {
        let code = &content[block.range.clone()];
        let parsed = parse_module(code, file_path, block.flavor, block.range.start)?;
        let mut collector = CallCollector::new(
            file_path,
            content,
            &lines,
            parsed.snippets(code),
            identifier,
            &mut out,
        );
        swc_ecma_visit::VisitWith::visit_with(&parsed.module, &mut collector);
    }

    let nodes = parse_template(content)?;
    let mut expressions = Vec::new();
    template_expressions(&nodes, content, &mut expressions);
    for range in expressions {
        let code = &content[range.clone()];
        match parse_expression(code, range.start) {
            Ok(parsed) => {
                let mut collector = CallCollector::new(
                    file_path,
                    content,
                    &lines,
                    parsed.snippets(code),
                    identifier,
                    &mut out,
                );
                swc_ecma_visit::VisitWith::visit_with(&*parsed.expr, &mut collector);
            }
            // Statement-style handlers (`@click="a(); b()"`) are read line-wise.
            Err(_) => collect_lines(file_path, content, &lines, range, identifier, &mut out)?,
        }
    }

    out.sort();
    Ok(out)
}

/// Byte ranges of mustache bodies and expression-valued attributes.
fn template_expressions(nodes: &[MarkupNode], content: &str, out: &mut Vec<Range<usize>>) {
    for node in nodes {
        match node {
            MarkupNode::Element(element) => {
                if element.tag == "script" || element.tag == "style" {
                    continue;
                }
                for attr in &element.attrs {
                    let Some(value) = attr.value.clone() else {
                        continue;
                    };
                    if !attr.is_expression()
                        || attr.name.starts_with('#')
                        || NON_EXPRESSION_ATTRS
                            .iter()
                            .any(|name| attr.name.starts_with(name))
                    {
                        continue;
                    }
                    if !content[value.clone()].trim().is_empty() {
                        out.push(value);
                    }
                }
                template_expressions(&element.children, content, out);
            }
            MarkupNode::Text { range } => {
                let Some(text) = content.get(range.clone()) else {
                    continue;
                };
                for caps in MUSTACHE.captures_iter(text) {
                    if let Some(inner) = caps.get(1)
                        && !inner.as_str().trim().is_empty()
                    {
                        out.push(range.start + inner.start()..range.start + inner.end());
                    }
                }
            }
            MarkupNode::Comment { .. } => {}
        }
    }
}

fn call_pattern(identifier: &str) -> Result<Regex> {
    let target = regex::escape(target_name(identifier));
    let pattern = format!(
        r#"(?:^|[^\w$])(?:[\w$]+(?:\?)?\.)*\$?{target}(?:\?\.)?\(\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)"|`((?:[^`\\]|\\.)*)`)"#
    );
    Ok(Regex::new(&pattern)?)
}

/// Line-oriented extraction used when structured parsing is not possible.
///
/// Literals that follow `||`/`??` after a call become fallbacks, never keys.
/// Backtick keys with `${}` are reported as template warnings carrying the
/// whole literal.
pub fn extract_lines(file_path: &str, content: &str, identifier: &str) -> Result<FileReferences> {
    let lines = LineIndex::new(content);
    let mut out = FileReferences::default();
    collect_lines(file_path, content, &lines, 0..content.len(), identifier, &mut out)?;
    out.sort();
    Ok(out)
}

fn collect_lines(
    file_path: &str,
    content: &str,
    lines: &LineIndex,
    range: Range<usize>,
    identifier: &str,
    out: &mut FileReferences,
) -> Result<()> {
    let pattern = call_pattern(identifier)?;
    let text = &content[range.clone()];

    for caps in pattern.captures_iter(text) {
        let (literal, backtick) = match (caps.get(1), caps.get(2), caps.get(3)) {
            (Some(m), _, _) | (_, Some(m), _) => (m, false),
            (_, _, Some(m)) => (m, true),
            _ => continue,
        };
        let local = literal.start() - 1..literal.end() + 1;
        let key_span = local.start + range.start..local.end + range.start;
        let position = lines.position(content, key_span.start);

        if backtick && literal.as_str().contains("${") {
            out.dynamic_key_warnings.push(DynamicKeyWarning {
                file_path: file_path.to_string(),
                position,
                expression: text[local].to_string(),
                reason: DynamicReason::Template,
            });
            continue;
        }
        let key = literal.as_str().trim();
        if key.is_empty() {
            continue;
        }

        let fallback_literal = TRAILING_FALLBACK
            .captures(&text[local.end..])
            .and_then(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str().to_string());

        out.references.push(TranslationReference {
            key: key.to_string(),
            file_path: file_path.to_string(),
            position,
            key_span,
            fallback_literal,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const COMPONENT: &str = r#"<template>
  <header :title="$t('nav.title') || 'Home'">
    <h1>{{ $t('page.heading') }}</h1>
    <a :aria-label="$t(`nav.${section}`)">{{ t("nav.link") }}</a>
    <button @click="save(); $t('toast.saved')">{{ $t('actions.save') ?? 'Save' }}</button>
  </header>
</template>

<script setup lang="ts">
const label = t('page.subtitle');
</script>
"#;

    fn keys(refs: &FileReferences) -> Vec<&str> {
        refs.references.iter().map(|r| r.key.as_str()).collect()
    }

    #[test]
    fn test_line_fallback() {
        let refs = extract_lines("src/Nav.vue", COMPONENT, "t").unwrap();
        assert_eq!(
            keys(&refs),
            vec![
                "nav.title",
                "page.heading",
                "nav.link",
                "toast.saved",
                "actions.save",
                "page.subtitle"
            ]
        );
        assert_eq!(refs.references[0].fallback_literal.as_deref(), Some("Home"));
        assert_eq!(refs.references[4].fallback_literal.as_deref(), Some("Save"));
        assert!(!keys(&refs).contains(&"Home"));

        assert_eq!(refs.dynamic_key_warnings.len(), 1);
        let warning = &refs.dynamic_key_warnings[0];
        assert_eq!(warning.reason, DynamicReason::Template);
        assert_eq!(warning.expression, "`nav.${section}`");
        assert_eq!(warning.position.line, 4);
    }

    #[test]
    fn test_line_fallback_spans_are_file_relative() {
        let refs = extract_lines("src/Nav.vue", COMPONENT, "t").unwrap();
        for reference in &refs.references {
            let text = &COMPONENT[reference.key_span.clone()];
            assert_eq!(&text[1..text.len() - 1], reference.key);
        }
    }

    #[test]
    fn test_line_fallback_bound_template_literal_calls() {
        let text = r#"<nav :title="$t(`nav.about`) ?? 'About us'">
  {{ $t(`nav.team`, { count }) || "Our team" }}
</nav>"#;
        let refs = extract_lines("src/Nav.vue", text, "t").unwrap();

        assert_eq!(keys(&refs), vec!["nav.about", "nav.team"]);
        assert_eq!(refs.references[0].fallback_literal.as_deref(), Some("About us"));
        assert_eq!(refs.references[1].fallback_literal.as_deref(), Some("Our team"));
        assert_eq!(refs.references[1].position.line, 2);
        assert!(refs.dynamic_key_warnings.is_empty());
        for reference in &refs.references {
            let span = &text[reference.key_span.clone()];
            assert_eq!(span, format!("`{}`", reference.key));
        }
    }

    #[test]
    fn test_line_fallback_ignores_lookalikes() {
        let text = "format('a.b'); at('c.d'); i18n.t('e.f'); this.$t('g.h')";
        let refs = extract_lines("x.vue", text, "t").unwrap();
        assert_eq!(keys(&refs), vec!["e.f", "g.h"]);
    }

    #[cfg(feature = "sfc")]
    #[test]
    fn test_structured_extraction() {
        let extractor = SfcExtractor {
            identifier: "t".to_string(),
            structured: true,
        };
        let refs = extractor.extract("src/Nav.vue", COMPONENT).unwrap();
        assert_eq!(
            keys(&refs),
            vec![
                "nav.title",
                "page.heading",
                "nav.link",
                "toast.saved",
                "actions.save",
                "page.subtitle"
            ]
        );
        assert_eq!(refs.references[0].fallback_literal.as_deref(), Some("Home"));
        assert_eq!(refs.references[5].position.line, 10);
        for reference in &refs.references {
            let text = &COMPONENT[reference.key_span.clone()];
            assert_eq!(&text[1..text.len() - 1], reference.key);
        }
        assert_eq!(refs.dynamic_key_warnings.len(), 1);
        assert_eq!(refs.dynamic_key_warnings[0].expression, "`nav.${section}`");
    }

    #[test]
    fn test_unstructured_extractor_uses_lines() {
        let extractor = SfcExtractor {
            identifier: "t".to_string(),
            structured: false,
        };
        let refs = extractor.extract("src/Nav.vue", COMPONENT).unwrap();
        assert_eq!(refs.references.len(), 6);
    }
}
