//! Candidate scanning for JS/TS/JSX/TSX.
//!
//! Markup text, translatable attribute values and expression containers are
//! offered to the [`Collector`]; plain script strings are not. Conditional and
//! fallback expressions are descended into so each literal branch stands on
//! its own.

use anyhow::Result;
use swc_common::Spanned;
use swc_ecma_ast::{
    BinaryOp, CallExpr, Expr, JSXAttr, JSXAttrName, JSXAttrOrSpread, JSXAttrValue, JSXElement,
    JSXExpr, JSXExprContainer, JSXFragment, JSXText, Lit,
};
use swc_ecma_visit::{Visit, VisitWith};

use super::directives::{Directive, marker_directive};
use super::{CALL_CONTEXT, CallSite, CandidateKind, Collector, FileScan, Offer, ScanOptions};
use crate::core::classify::classifier::{flatten_concat, quasi_text, str_value, unwrap_expr};
use crate::core::classify::{MergeStrategy, classify};
use crate::core::extract::ecma::is_translation_callee;
use crate::core::parsers::jsx::{EcmaFlavor, ParsedSource, parse_module};
use crate::core::source::Snippets;

/// Tags whose content is never user-facing text.
const OPAQUE_TAGS: &[&str] = &["style", "script", "code", "pre"];

pub fn scan_module(file_path: &str, content: &str, options: &ScanOptions) -> Result<FileScan> {
    let flavor = EcmaFlavor::from_path(file_path);
    let parsed = parse_module(content, file_path, flavor, 0)?;
    let mut collector = Collector::new(file_path, content, options);
    scan_parsed(&parsed, content, &mut collector);
    Ok(collector.finish())
}

/// Scan an already parsed module (a whole file or a component script block).
pub(crate) fn scan_parsed(parsed: &ParsedSource, text: &str, collector: &mut Collector) {
    let snippets = parsed.snippets(text);
    for comment in parsed.comments.all() {
        collector.add_comment(snippets.file_range(comment.span), &comment.text);
    }

    let mut scanner = EcmaScanner::new(collector, snippets, CallSite::Jsx);
    parsed.module.visit_with(&mut scanner);
}

struct ElementFrame {
    tag: String,
    marker: Option<Directive>,
}

/// swc visitor that offers JSX text nodes and expressions.
pub(crate) struct EcmaScanner<'c, 'a, 's> {
    collector: &'c mut Collector<'a>,
    snippets: Snippets<'s>,
    frames: Vec<ElementFrame>,
    /// Site for expression offers.
    site: CallSite,
    /// Context and marker inherited from an enclosing template element.
    base_context: String,
    base_marker: Option<Directive>,
}

impl<'c, 'a, 's> EcmaScanner<'c, 'a, 's> {
    pub fn new(collector: &'c mut Collector<'a>, snippets: Snippets<'s>, site: CallSite) -> Self {
        Self {
            collector,
            snippets,
            frames: Vec::new(),
            site,
            base_context: String::new(),
            base_marker: None,
        }
    }

    pub fn with_base(mut self, context: &str, marker: Option<Directive>) -> Self {
        self.base_context = context.to_string();
        self.base_marker = marker;
        self
    }

    fn context(&self) -> String {
        self.frames
            .last()
            .map(|f| f.tag.clone())
            .unwrap_or_else(|| self.base_context.clone())
    }

    fn marker(&self) -> Option<Directive> {
        let markers: Vec<Option<Directive>> = self.frames.iter().map(|f| f.marker).collect();
        marker_directive(&markers).or(self.base_marker)
    }

    /// Classify a text-bearing expression and offer it, descending into
    /// conditional and fallback branches.
    pub fn scan_expression(&mut self, expr: &Expr) {
        let inner = unwrap_expr(expr);
        match inner {
            Expr::JSXElement(_)
            | Expr::JSXFragment(_)
            | Expr::Arrow(_)
            | Expr::Fn(_)
            | Expr::Object(_)
            | Expr::Array(_) => return,
            Expr::Call(call) if is_translation_callee(&call.callee, self.translation_identifier()) => {
                return;
            }
            Expr::Bin(bin) if bin.op == BinaryOp::LogicalAnd => {
                self.scan_expression(&bin.right);
                return;
            }
            _ => {}
        }

        let analysis = classify(expr, &self.snippets, self.collector.options.classifier);
        if analysis.suggestion == MergeStrategy::SeparateReplace {
            let mut operands = Vec::new();
            flatten_concat(expr, &mut operands);
            for operand in operands {
                if matches!(operand, Expr::Lit(Lit::Str(_)) | Expr::Tpl(_)) {
                    self.scan_expression(operand);
                }
            }
            return;
        }

        let span = self.snippets.file_range(expr.span());
        let context = self.context();
        let marker = self.marker();
        let handled = self
            .collector
            .offer_analysis(analysis, self.site, span, &context, marker);
        if handled {
            return;
        }

        match inner {
            Expr::Cond(cond) => {
                self.scan_expression(&cond.cons);
                self.scan_expression(&cond.alt);
            }
            Expr::Bin(bin) => self.scan_expression(&bin.right),
            _ => {}
        }
    }

    fn translation_identifier(&self) -> &str {
        &self.collector.options.translation_identifier
    }

    fn tag_name(&self, node: &JSXElement) -> String {
        self.snippets.text(node.opening.name.span()).to_string()
    }
}

fn attr_name(attr: &JSXAttr) -> String {
    match &attr.name {
        JSXAttrName::Ident(ident) => ident.sym.to_string(),
        JSXAttrName::JSXNamespacedName(ns) => format!("{}:{}", ns.ns.sym, ns.name.sym),
    }
}

impl Visit for EcmaScanner<'_, '_, '_> {
    fn visit_jsx_element(&mut self, node: &JSXElement) {
        let tag = self.tag_name(node);
        let marker = node.opening.attrs.iter().find_map(|attr| match attr {
            JSXAttrOrSpread::JSXAttr(attr) => Directive::from_marker_attr(&attr_name(attr)),
            JSXAttrOrSpread::SpreadElement(_) => None,
        });

        self.frames.push(ElementFrame {
            tag: tag.clone(),
            marker,
        });
        node.opening.visit_with(self);
        if !OPAQUE_TAGS.contains(&tag.as_str()) {
            for child in &node.children {
                child.visit_with(self);
            }
        }
        self.frames.pop();
    }

    fn visit_jsx_fragment(&mut self, node: &JSXFragment) {
        for child in &node.children {
            child.visit_with(self);
        }
    }

    fn visit_jsx_text(&mut self, node: &JSXText) {
        let range = self.snippets.file_range(node.span);
        let raw = self.snippets.text(node.span);
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return;
        }

        let start = range.start + (raw.len() - raw.trim_start().len());
        let span = start..start + trimmed.len();
        let offer = Offer::literal(
            CandidateKind::BareText,
            CallSite::Jsx,
            span,
            trimmed.to_string(),
            self.context(),
        )
        .with_marker(self.marker());
        self.collector.offer(offer);
    }

    fn visit_jsx_attr(&mut self, node: &JSXAttr) {
        let name = attr_name(node);
        if Directive::from_marker_attr(&name).is_some() {
            return;
        }
        let translatable = self.collector.options.is_translatable_attr(&name);

        match &node.value {
            Some(JSXAttrValue::Str(s)) if translatable => {
                let offer = Offer::literal(
                    CandidateKind::AttributeValue,
                    CallSite::Jsx,
                    self.snippets.file_range(s.span),
                    str_value(s),
                    self.context(),
                )
                .with_marker(self.marker());
                self.collector.offer(offer);
            }
            Some(JSXAttrValue::JSXExprContainer(container)) => {
                if let JSXExpr::Expr(expr) = &container.expr {
                    if translatable {
                        self.scan_expression(expr);
                    }
                    expr.visit_with(self);
                }
            }
            Some(other) => other.visit_with(self),
            None => {}
        }
    }

    fn visit_jsx_expr_container(&mut self, node: &JSXExprContainer) {
        if let JSXExpr::Expr(expr) = &node.expr {
            self.scan_expression(expr);
            expr.visit_with(self);
        }
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        if self.collector.options.scan_calls
            && is_translation_callee(&node.callee, self.translation_identifier())
            && let Some(first) = node.args.first()
            && first.spread.is_none()
        {
            let text = match unwrap_expr(&first.expr) {
                Expr::Lit(Lit::Str(s)) => Some(str_value(s)),
                Expr::Tpl(tpl) if tpl.exprs.is_empty() => {
                    Some(tpl.quasis.iter().map(quasi_text).collect())
                }
                _ => None,
            };
            if let Some(text) = text {
                let offer = Offer::literal(
                    CandidateKind::CallArgument,
                    CallSite::Script,
                    self.snippets.file_range(first.expr.span()),
                    text,
                    CALL_CONTEXT.to_string(),
                )
                .with_marker(self.marker());
                self.collector.offer(offer);
            }
        }
        node.visit_children_with(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classify::ExpressionType;
    use crate::core::scan::{RejectReason, ScanOptions};
    use pretty_assertions::assert_eq;

    fn scan(code: &str) -> FileScan {
        scan_module("src/components/Hero.tsx", code, &ScanOptions::default()).unwrap()
    }

    fn texts(scan: &FileScan) -> Vec<&str> {
        scan.candidates
            .iter()
            .map(|c| c.normalized_text.as_str())
            .collect()
    }

    #[test]
    fn test_bare_text_and_attributes() {
        let code = r#"
export const Hero = () => (
  <section>
    <h1>Welcome back</h1>
    <input placeholder="Search products" className="search-box" />
  </section>
);
"#;
        let result = scan(code);
        assert_eq!(texts(&result), vec!["Welcome back", "Search products"]);

        let heading = &result.candidates[0];
        assert_eq!(heading.kind, CandidateKind::BareText);
        assert_eq!(heading.context, "h1");
        assert_eq!(heading.raw_text, "Welcome back");
        assert_eq!(heading.position.line, 4);
        assert_eq!(&code[heading.span.clone()], "Welcome back");

        let placeholder = &result.candidates[1];
        assert_eq!(placeholder.kind, CandidateKind::AttributeValue);
        assert_eq!(placeholder.raw_text, "\"Search products\"");
    }

    #[test]
    fn test_expression_containers() {
        let code = r#"
const A = ({ count, ok }) => (
  <div>
    {'You have ' + count + ' items'}
    {ok ? 'Saved' : 'Not saved'}
    {user.name}
  </div>
);
"#;
        let result = scan(code);
        assert_eq!(
            texts(&result),
            vec!["You have {count} items", "Saved", "Not saved"]
        );
        assert_eq!(
            result.candidates[0].expression_type,
            Some(ExpressionType::MixedConcatenation)
        );
        assert_eq!(result.candidates[0].strategy, MergeStrategy::Interpolation);
        assert!(
            result
                .skipped
                .iter()
                .any(|s| s.reason == RejectReason::NonLiteral)
        );
    }

    #[test]
    fn test_rejections_are_recorded() {
        let code = r#"
const A = () => (
  <div>
    <span>---</span>
    <span>x</span>
    <i className="icon">#ffcc00</i>
  </div>
);
"#;
        let result = scan(code);
        assert!(result.candidates.is_empty());
        let reasons: Vec<RejectReason> = result.skipped.iter().map(|s| s.reason).collect();
        assert_eq!(
            reasons,
            vec![
                RejectReason::NoLetters,
                RejectReason::BelowMinLength,
                RejectReason::NonSentence
            ]
        );
    }

    #[test]
    fn test_directives() {
        let code = r#"
const A = () => (
  <div>
    {/* lingo-skip */}
    <p>Internal build banner</p>
    <p>x</p> {/* lingo-force */}
    <div data-i18n-skip>
      <span>Hidden text</span>
    </div>
  </div>
);
"#;
        let result = scan(code);
        assert_eq!(texts(&result), vec!["x"]);
        assert!(result.candidates[0].forced);
        let skipped_by_directive = result
            .skipped
            .iter()
            .filter(|s| s.reason == RejectReason::DirectiveSkip)
            .count();
        assert_eq!(skipped_by_directive, 2);
    }

    #[test]
    fn test_existing_translation_calls_are_not_candidates() {
        let code = r#"const A = () => <p>{t('home.title')}</p>;"#;
        let result = scan(code);
        assert!(result.candidates.is_empty());
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_call_arguments_only_when_enabled() {
        let code = r#"
const a = t('Please sign in to continue');
const b = t('common.save');
"#;
        assert!(scan(code).candidates.is_empty());

        let options = ScanOptions {
            scan_calls: true,
            ..ScanOptions::default()
        };
        let result = scan_module("src/a.ts", code, &options).unwrap();
        assert_eq!(texts(&result), vec!["Please sign in to continue"]);
        assert_eq!(result.candidates[0].kind, CandidateKind::CallArgument);
        assert_eq!(result.candidates[0].context, CALL_CONTEXT);
        assert!(
            result
                .skipped
                .iter()
                .any(|s| s.reason == RejectReason::NonSentence)
        );
    }

    #[test]
    fn test_entities_are_decoded() {
        let code = "const A = () => <p>Terms &amp; Conditions</p>;";
        let result = scan(code);
        assert_eq!(texts(&result), vec!["Terms & Conditions"]);
        assert_eq!(result.candidates[0].raw_text, "Terms &amp; Conditions");
    }

    #[test]
    fn test_parse_error_is_returned() {
        assert!(scan_module("src/a.tsx", "const = <", &ScanOptions::default()).is_err());
    }
}
