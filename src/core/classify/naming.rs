//! Parameter names for dynamic parts of mixed expressions.

use swc_ecma_ast::{Callee, Expr, MemberExpr, MemberProp, OptChainBase};

use super::classifier::unwrap_expr;

/// Receivers that never carry meaning in a parameter name.
const NOISE_ROOTS: &[&str] = &["this", "props", "state", "$props", "$data", "data"];

/// Name for the dynamic part at `index`.
///
/// - `count` → `count`
/// - `user.profile.name` → `profileName`
/// - `this.props.total` → `total`
/// - `formatDate(d)` → `formatDate`
/// - anything else → `arg{index}`
pub fn param_name(expr: &Expr, index: usize) -> String {
    let candidate = match unwrap_expr(expr) {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::Member(member) => member_name(member),
        Expr::OptChain(chain) => match &*chain.base {
            OptChainBase::Member(member) => member_name(member),
            OptChainBase::Call(call) => callee_name(&call.callee),
        },
        Expr::Call(call) => match &call.callee {
            Callee::Expr(callee) => callee_name(callee),
            _ => None,
        },
        _ => None,
    };

    candidate
        .map(|c| sanitize(&c))
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| format!("arg{}", index))
}

/// `base`, then `base2`, `base3`, ... until unused.
pub fn dedupe_name(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|t| t == base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}{}", base, n))
        .find(|candidate| !taken.iter().any(|t| t == candidate))
        .unwrap_or_else(|| base.to_string())
}

fn member_name(member: &MemberExpr) -> Option<String> {
    let mut segments = Vec::new();
    if !member_segments(&member.obj, &mut segments) {
        return None;
    }
    match &member.prop {
        MemberProp::Ident(ident) => segments.push(ident.sym.to_string()),
        _ => return None,
    }

    while segments.len() > 1 && NOISE_ROOTS.contains(&segments[0].as_str()) {
        segments.remove(0);
    }
    let tail = &segments[segments.len().saturating_sub(2)..];
    Some(camel_join(tail))
}

fn member_segments(expr: &Expr, out: &mut Vec<String>) -> bool {
    match unwrap_expr(expr) {
        Expr::Ident(ident) => {
            out.push(ident.sym.to_string());
            true
        }
        Expr::This(_) => {
            out.push("this".to_string());
            true
        }
        Expr::Member(member) => {
            if !member_segments(&member.obj, out) {
                return false;
            }
            match &member.prop {
                MemberProp::Ident(ident) => {
                    out.push(ident.sym.to_string());
                    true
                }
                _ => false,
            }
        }
        Expr::OptChain(chain) => match &*chain.base {
            OptChainBase::Member(member) => {
                if !member_segments(&member.obj, out) {
                    return false;
                }
                match &member.prop {
                    MemberProp::Ident(ident) => {
                        out.push(ident.sym.to_string());
                        true
                    }
                    _ => false,
                }
            }
            OptChainBase::Call(_) => false,
        },
        _ => false,
    }
}

fn callee_name(callee: &Expr) -> Option<String> {
    match unwrap_expr(callee) {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::Member(member) => match &member.prop {
            MemberProp::Ident(ident) => Some(ident.sym.to_string()),
            _ => None,
        },
        _ => None,
    }
}

fn camel_join(segments: &[String]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        let segment = segment.trim_start_matches('$');
        if i == 0 {
            out.push_str(segment);
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    match cleaned.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{}", cleaned),
        _ => cleaned,
    }
}
