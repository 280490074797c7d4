//! Candidate scanning for single-file components.

use std::ops::Range;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use tracing::debug;

use super::directives::{Directive, marker_directive};
use super::jsx::{EcmaScanner, scan_parsed};
use super::{CallSite, CandidateKind, Collector, FileScan, Offer, RejectReason, ScanOptions};
use crate::core::parsers::jsx::{parse_expression, parse_module};
use crate::core::parsers::sfc::{
    MarkupElement, MarkupNode, STRUCTURED_SFC_AVAILABLE, parse_template, script_blocks,
};

static MUSTACHE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{\{(.*?)\}\}").unwrap());

const OPAQUE_TAGS: &[&str] = &["style", "script", "code", "pre"];

pub fn scan_component(file_path: &str, content: &str, options: &ScanOptions) -> Result<FileScan> {
    let mut collector = Collector::new(file_path, content, options);

    for block in script_blocks(content) {
        let code = &content[block.range.clone()];
        let parsed = parse_module(code, file_path, block.flavor, block.range.start)?;
        scan_parsed(&parsed, code, &mut collector);
    }

    if !STRUCTURED_SFC_AVAILABLE {
        collector.out.warnings.push(
            "structured component parser not available; only <script> blocks were scanned"
                .to_string(),
        );
        return Ok(collector.finish());
    }

    match parse_template(content) {
        Ok(nodes) => {
            register_comments(&nodes, &mut collector);
            let mut walker = TemplateWalker {
                collector: &mut collector,
                markers: Vec::new(),
            };
            walker.walk(&nodes, "template");
        }
        Err(e) => {
            debug!(file = file_path, error = %e, "template not scanned");
            collector
                .out
                .warnings
                .push(format!("template could not be parsed: {}", e));
        }
    }

    Ok(collector.finish())
}

/// Comments first, so trailing directives apply to nodes earlier on their line.
fn register_comments(nodes: &[MarkupNode], collector: &mut Collector) {
    for node in nodes {
        match node {
            MarkupNode::Comment { range } => {
                let text = collector.content.get(range.clone()).unwrap_or_default();
                collector.add_comment(range.clone(), text);
            }
            MarkupNode::Element(element) => register_comments(&element.children, collector),
            MarkupNode::Text { .. } => {}
        }
    }
}

struct TemplateWalker<'c, 'a> {
    collector: &'c mut Collector<'a>,
    markers: Vec<Option<Directive>>,
}

impl TemplateWalker<'_, '_> {
    fn walk(&mut self, nodes: &[MarkupNode], tag: &str) {
        for node in nodes {
            match node {
                MarkupNode::Element(element) => self.walk_element(element),
                MarkupNode::Text { range } => self.scan_text(range.clone(), tag),
                MarkupNode::Comment { .. } => {}
            }
        }
    }

    fn marker(&self) -> Option<Directive> {
        marker_directive(&self.markers)
    }

    fn walk_element(&mut self, element: &MarkupElement) {
        if OPAQUE_TAGS.contains(&element.tag.as_str()) {
            return;
        }
        let marker = element
            .attrs
            .iter()
            .find_map(|a| Directive::from_marker_attr(&a.name));
        self.markers.push(marker);

        let content = self.collector.content;
        for attr in &element.attrs {
            if Directive::from_marker_attr(&attr.name).is_some() {
                continue;
            }
            let translatable = self.collector.options.is_translatable_attr(attr.bare_name());
            if !translatable {
                continue;
            }
            let Some(value_range) = attr.value.clone() else {
                continue;
            };
            let value = content.get(value_range.clone()).unwrap_or_default();

            if attr.is_expression() {
                // Only bindings (`:title`, `v-bind:title`) carry text.
                if attr.bare_name() != attr.name.as_str() {
                    self.scan_expression(value, value_range.start, &element.tag);
                }
            } else {
                let offer = Offer::literal(
                    CandidateKind::AttributeValue,
                    CallSite::Template,
                    attr.range.clone(),
                    value.to_string(),
                    element.tag.clone(),
                )
                .with_marker(self.marker());
                self.collector.offer(offer);
            }
        }

        self.walk(&element.children, &element.tag);
        self.markers.pop();
    }

    /// Split a text node into literal runs and `{{ }}` expressions.
    fn scan_text(&mut self, range: Range<usize>, tag: &str) {
        let content = self.collector.content;
        let Some(text) = content.get(range.clone()) else {
            return;
        };

        let mut cursor = 0;
        for caps in MUSTACHE.captures_iter(text) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            self.scan_literal_run(range.start + cursor..range.start + whole.start(), tag);
            self.scan_expression(inner.as_str(), range.start + inner.start(), tag);
            cursor = whole.end();
        }
        self.scan_literal_run(range.start + cursor..range.end, tag);
    }

    fn scan_literal_run(&mut self, range: Range<usize>, tag: &str) {
        let Some(raw) = self.collector.content.get(range.clone()) else {
            return;
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return;
        }
        let start = range.start + (raw.len() - raw.trim_start().len());
        let offer = Offer::literal(
            CandidateKind::BareText,
            CallSite::Template,
            start..start + trimmed.len(),
            trimmed.to_string(),
            tag.to_string(),
        )
        .with_marker(self.marker());
        self.collector.offer(offer);
    }

    fn scan_expression(&mut self, code: &str, offset: usize, tag: &str) {
        if code.trim().is_empty() {
            return;
        }
        match parse_expression(code, offset) {
            Ok(parsed) => {
                let marker = self.marker();
                let snippets = parsed.snippets(code);
                let mut scanner = EcmaScanner::new(self.collector, snippets, CallSite::Template)
                    .with_base(tag, marker);
                scanner.scan_expression(&parsed.expr);
            }
            Err(e) => {
                self.collector.reject(
                    offset,
                    Some(code.trim().to_string()),
                    RejectReason::NonLiteral,
                    Some(format!("unparsable expression: {}", e)),
                );
            }
        }
    }
}
