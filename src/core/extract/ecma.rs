//! Translation-call extraction for the ECMAScript family.

use std::collections::HashMap;

use anyhow::Result;
use swc_common::{BytePos, Spanned};
use swc_ecma_ast::{
    BinaryOp, BinExpr, CallExpr, Callee, Expr, ExprOrSpread, Lit, MemberExpr, MemberProp,
    OptChainBase, OptChainExpr, Prop, PropName, PropOrSpread,
};
use swc_ecma_visit::{Visit, VisitWith};

use super::reference::{DynamicKeyWarning, DynamicReason, FileReferences, TranslationReference};
use super::registry::ReferenceExtractor;
use crate::core::classify::classifier::{quasi_text, str_value, unwrap_expr};
use crate::core::parsers::jsx::{EcmaFlavor, parse_module};
use crate::core::source::{LineIndex, Snippets};

/// Name the callee must end in: `i18n.t` matches on `t`.
pub(crate) fn target_name(identifier: &str) -> &str {
    identifier.rsplit('.').next().unwrap_or(identifier)
}

fn name_matches(name: &str, target: &str) -> bool {
    name == target || name.strip_prefix('$') == Some(target)
}

fn member_matches(member: &MemberExpr, target: &str) -> bool {
    match &member.prop {
        MemberProp::Ident(ident) => name_matches(&ident.sym, target),
        _ => false,
    }
}

fn callee_expr_matches(expr: &Expr, target: &str) -> bool {
    match unwrap_expr(expr) {
        Expr::Ident(ident) => name_matches(&ident.sym, target),
        Expr::Member(member) => member_matches(member, target),
        Expr::OptChain(chain) => match &*chain.base {
            OptChainBase::Member(member) => member_matches(member, target),
            OptChainBase::Call(_) => false,
        },
        _ => false,
    }
}

/// Whether `callee` resolves to the translation function, looking through
/// property access (`i18n.t`, `this.$t`), optional chaining and parentheses.
pub fn is_translation_callee(callee: &Callee, identifier: &str) -> bool {
    match callee {
        Callee::Expr(expr) => callee_expr_matches(expr, target_name(identifier)),
        _ => false,
    }
}

/// Extractor for `.js/.jsx/.ts/.tsx/.mjs/.cjs`.
#[derive(Debug, Clone)]
pub struct EcmaExtractor {
    pub identifier: String,
}

impl ReferenceExtractor for EcmaExtractor {
    fn extract(&self, file_path: &str, content: &str) -> Result<FileReferences> {
        let parsed = parse_module(content, file_path, EcmaFlavor::from_path(file_path), 0)?;
        let lines = LineIndex::new(content);
        let mut out = FileReferences::default();
        let mut collector = CallCollector::new(
            file_path,
            content,
            &lines,
            parsed.snippets(content),
            &self.identifier,
            &mut out,
        );
        parsed.module.visit_with(&mut collector);
        out.sort();
        Ok(out)
    }
}

/// swc visitor recording translation calls into a [`FileReferences`].
pub(crate) struct CallCollector<'a> {
    file_path: &'a str,
    content: &'a str,
    lines: &'a LineIndex,
    snippets: Snippets<'a>,
    target: &'a str,
    /// `t('k') || 'Label'` fallbacks, keyed by the call's start.
    pending_fallbacks: HashMap<BytePos, String>,
    out: &'a mut FileReferences,
}

impl<'a> CallCollector<'a> {
    pub fn new(
        file_path: &'a str,
        content: &'a str,
        lines: &'a LineIndex,
        snippets: Snippets<'a>,
        identifier: &'a str,
        out: &'a mut FileReferences,
    ) -> Self {
        Self {
            file_path,
            content,
            lines,
            snippets,
            target: target_name(identifier),
            pending_fallbacks: HashMap::new(),
            out,
        }
    }

    fn record_call(&mut self, call_lo: BytePos, args: &[ExprOrSpread]) {
        let Some(first) = args.first() else {
            return;
        };
        if first.spread.is_some() {
            return;
        }
        let arg = unwrap_expr(&first.expr);
        let key_span = self.snippets.file_range(first.expr.span());
        let position = self.lines.position(self.content, key_span.start);

        let literal = match arg {
            Expr::Lit(Lit::Str(s)) => Some(str_value(s)),
            Expr::Tpl(tpl) if tpl.exprs.is_empty() => {
                Some(tpl.quasis.iter().map(quasi_text).collect::<String>())
            }
            _ => None,
        };

        match literal {
            Some(key) if key.trim().is_empty() => {}
            Some(key) => {
                let fallback_literal = self
                    .pending_fallbacks
                    .remove(&call_lo)
                    .or_else(|| args.get(1).and_then(|a| fallback_from_arg(&a.expr)));
                self.out.references.push(TranslationReference {
                    key,
                    file_path: self.file_path.to_string(),
                    position,
                    key_span,
                    fallback_literal,
                });
            }
            None => {
                let reason = match arg {
                    Expr::Tpl(_) => DynamicReason::Template,
                    Expr::Bin(bin) if bin.op == BinaryOp::Add => DynamicReason::Binary,
                    _ => DynamicReason::Expression,
                };
                self.out.dynamic_key_warnings.push(DynamicKeyWarning {
                    file_path: self.file_path.to_string(),
                    position,
                    expression: self.snippets.text(first.expr.span()).to_string(),
                    reason,
                });
            }
        }
    }

    /// Start of the translation call at the root of `expr`, if any.
    fn translation_call_start(&self, expr: &Expr) -> Option<BytePos> {
        match unwrap_expr(expr) {
            Expr::Call(call) if self.callee_matches(&call.callee) => Some(call.span.lo),
            Expr::OptChain(chain) => match &*chain.base {
                OptChainBase::Call(call) if callee_expr_matches(&call.callee, self.target) => {
                    Some(chain.span.lo)
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn callee_matches(&self, callee: &Callee) -> bool {
        match callee {
            Callee::Expr(expr) => callee_expr_matches(expr, self.target),
            _ => false,
        }
    }
}

/// `'Label'` or `{ defaultValue: 'Label' }` as a second argument.
fn fallback_from_arg(expr: &Expr) -> Option<String> {
    match unwrap_expr(expr) {
        Expr::Lit(Lit::Str(s)) => Some(str_value(s)),
        Expr::Object(object) => object.props.iter().find_map(|prop| {
            let PropOrSpread::Prop(prop) = prop else {
                return None;
            };
            let Prop::KeyValue(kv) = &**prop else {
                return None;
            };
            let is_default = match &kv.key {
                PropName::Ident(ident) => ident.sym == "defaultValue",
                PropName::Str(s) => s.value.as_str() == Some("defaultValue"),
                _ => false,
            };
            match (is_default, unwrap_expr(&kv.value)) {
                (true, Expr::Lit(Lit::Str(s))) => Some(str_value(s)),
                _ => None,
            }
        }),
        _ => None,
    }
}

impl Visit for CallCollector<'_> {
    fn visit_bin_expr(&mut self, node: &BinExpr) {
        if matches!(node.op, BinaryOp::LogicalOr | BinaryOp::NullishCoalescing)
            && let Some(call_lo) = self.translation_call_start(&node.left)
            && let Expr::Lit(Lit::Str(s)) = unwrap_expr(&node.right)
        {
            self.pending_fallbacks.insert(call_lo, str_value(s));
        }
        node.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        if self.callee_matches(&node.callee) {
            self.record_call(node.span.lo, &node.args);
        }
        // Nested calls used as interpolation values register on their own.
        node.visit_children_with(self);
    }

    fn visit_opt_chain_expr(&mut self, node: &OptChainExpr) {
        if let OptChainBase::Call(call) = &*node.base
            && callee_expr_matches(&call.callee, self.target)
        {
            self.record_call(node.span.lo, &call.args);
        }
        node.visit_children_with(self);
    }
}
