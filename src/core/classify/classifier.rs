//! Expression shape classification and merge-strategy selection.

use std::collections::HashMap;

use swc_common::Spanned;
use swc_ecma_ast::{BinaryOp, Expr, Lit, Number, Str, Tpl, TplElement};

use super::analysis::{
    ConcatPattern, DynamicPart, ExpressionAnalysis, ExpressionType, MergeStrategy, Segment,
    SkipReason,
};
use super::naming::{dedupe_name, param_name};
use super::shapes::non_translatable_reason;
use crate::core::source::Snippets;

#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifierOptions {
    /// Offer separate replacement for pure static concatenation instead of
    /// merging it into one value.
    pub separate_static_concatenation: bool,
}

/// Strip wrappers that do not change the runtime value.
pub(crate) fn unwrap_expr(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(p) => unwrap_expr(&p.expr),
        Expr::TsAs(e) => unwrap_expr(&e.expr),
        Expr::TsSatisfies(e) => unwrap_expr(&e.expr),
        Expr::TsNonNull(e) => unwrap_expr(&e.expr),
        Expr::TsConstAssertion(e) => unwrap_expr(&e.expr),
        Expr::TsTypeAssertion(e) => unwrap_expr(&e.expr),
        _ => expr,
    }
}

pub(crate) fn str_value(s: &Str) -> String {
    s.value.as_str().unwrap_or_default().to_string()
}

pub(crate) fn quasi_text(quasi: &TplElement) -> String {
    quasi
        .cooked
        .as_ref()
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| quasi.raw.to_string())
}

/// String literal or template literal, directly or inside a `+` chain.
pub(crate) fn contains_string(expr: &Expr) -> bool {
    match unwrap_expr(expr) {
        Expr::Lit(Lit::Str(_)) | Expr::Tpl(_) => true,
        Expr::Bin(bin) if bin.op == BinaryOp::Add => {
            contains_string(&bin.left) || contains_string(&bin.right)
        }
        _ => false,
    }
}

/// Flatten a string `+` chain into its operands.
///
/// A left-hand run with no string in it is kept whole: `a + b + ' items'`
/// adds `a + b` numerically before concatenating.
pub(crate) fn flatten_concat<'e>(expr: &'e Expr, out: &mut Vec<&'e Expr>) {
    let expr = unwrap_expr(expr);
    if let Expr::Bin(bin) = expr
        && bin.op == BinaryOp::Add
        && contains_string(expr)
    {
        if contains_string(&bin.left) {
            flatten_concat(&bin.left, out);
        } else {
            out.push(unwrap_expr(&bin.left));
        }
        flatten_concat(&bin.right, out);
        return;
    }
    out.push(expr);
}

/// Classify one expression.
pub fn classify(
    expr: &Expr,
    snippets: &Snippets,
    options: ClassifierOptions,
) -> ExpressionAnalysis {
    let expr = unwrap_expr(expr);
    match expr {
        Expr::Lit(Lit::Str(s)) => classify_static(ExpressionType::SimpleString, str_value(s), 1),
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => {
            let text = tpl.quasis.iter().map(quasi_text).collect::<String>();
            classify_static(ExpressionType::SimpleTemplateLiteral, text, 1)
        }
        Expr::Tpl(tpl) => {
            let mut builder = SegmentBuilder::new(snippets);
            builder.push_template(tpl);
            builder.finish(ExpressionType::TemplateWithExpressions)
        }
        Expr::Bin(bin) if bin.op == BinaryOp::Add && contains_string(expr) => {
            let mut operands = Vec::new();
            flatten_concat(expr, &mut operands);
            classify_concat(&operands, snippets, options)
        }
        Expr::Cond(cond) if contains_string(&cond.cons) && contains_string(&cond.alt) => {
            ExpressionAnalysis::skipped(
                ExpressionType::ConditionalStrings,
                SkipReason::PartialLiteral,
            )
        }
        // One literal branch next to a dynamic one behaves like a fallback.
        Expr::Cond(cond) if contains_string(&cond.cons) || contains_string(&cond.alt) => {
            ExpressionAnalysis::skipped(
                ExpressionType::LogicalWithFallback,
                SkipReason::SingleLiteralBranch,
            )
        }
        Expr::Bin(bin)
            if matches!(bin.op, BinaryOp::LogicalOr | BinaryOp::NullishCoalescing)
                && contains_string(&bin.right) =>
        {
            ExpressionAnalysis::skipped(
                ExpressionType::LogicalWithFallback,
                SkipReason::PartialLiteral,
            )
        }
        Expr::Lit(_) => ExpressionAnalysis::skipped(
            ExpressionType::NonTranslatable,
            SkipReason::NonStringLiteral,
        ),
        Expr::Invalid(_) => {
            ExpressionAnalysis::skipped(ExpressionType::Empty, SkipReason::EmptyExpression)
        }
        _ => ExpressionAnalysis::new(ExpressionType::PureDynamic, MergeStrategy::Preserve),
    }
}

fn classify_static(
    expression_type: ExpressionType,
    value: String,
    parts: usize,
) -> ExpressionAnalysis {
    if value.trim().is_empty() {
        return ExpressionAnalysis::skipped(ExpressionType::Empty, SkipReason::EmptyExpression);
    }
    if let Some(reason) = non_translatable_reason(&value) {
        let mut analysis = ExpressionAnalysis::skipped(ExpressionType::NonTranslatable, reason);
        analysis.static_value = Some(value);
        return analysis;
    }

    let suggestion = if expression_type == ExpressionType::StaticConcatenation {
        MergeStrategy::MergeAndReplace
    } else {
        MergeStrategy::SimpleReplace
    };
    let mut analysis = ExpressionAnalysis::new(expression_type, suggestion);
    if parts == 1 {
        analysis.static_parts = vec![value.clone()];
    }
    analysis.segments = vec![Segment::Static(value.clone())];
    analysis.static_value = Some(value);
    analysis
}

fn classify_concat(
    operands: &[&Expr],
    snippets: &Snippets,
    options: ClassifierOptions,
) -> ExpressionAnalysis {
    let all_static = operands.iter().all(|op| static_operand(op).is_some());

    if all_static {
        let parts: Vec<String> = operands.iter().filter_map(|op| static_operand(op)).collect();
        let mut analysis = classify_static(
            ExpressionType::StaticConcatenation,
            parts.concat(),
            parts.len(),
        );
        if analysis.expression_type == ExpressionType::StaticConcatenation {
            analysis.static_parts = parts;
            if options.separate_static_concatenation {
                analysis.suggestion = MergeStrategy::SeparateReplace;
            }
        }
        return analysis;
    }

    let mut builder = SegmentBuilder::new(snippets);
    for operand in operands {
        match operand {
            Expr::Tpl(tpl) => builder.push_template(tpl),
            other => match static_operand(other) {
                Some(text) => builder.push_static(text),
                None => builder.push_dynamic(other),
            },
        }
    }
    builder.finish(ExpressionType::MixedConcatenation)
}

/// Literal text of an operand that is static once concatenated.
fn static_operand(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(Lit::Str(s)) => Some(str_value(s)),
        Expr::Lit(Lit::Num(n)) => Some(number_text(n)),
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => {
            Some(tpl.quasis.iter().map(quasi_text).collect())
        }
        _ => None,
    }
}

fn number_text(n: &Number) -> String {
    if n.value.fract() == 0.0 && n.value.abs() < 1e15 {
        format!("{}", n.value as i64)
    } else {
        format!("{}", n.value)
    }
}

struct SegmentBuilder<'s, 'a> {
    snippets: &'s Snippets<'a>,
    segments: Vec<Segment>,
    parts: Vec<DynamicPart>,
    by_expression: HashMap<String, usize>,
}

impl<'s, 'a> SegmentBuilder<'s, 'a> {
    fn new(snippets: &'s Snippets<'a>) -> Self {
        Self {
            snippets,
            segments: Vec::new(),
            parts: Vec::new(),
            by_expression: HashMap::new(),
        }
    }

    fn push_static(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Static(last)) = self.segments.last_mut() {
            last.push_str(&text);
        } else {
            self.segments.push(Segment::Static(text));
        }
    }

    fn push_dynamic(&mut self, expr: &Expr) {
        let expression = self.snippets.text(expr.span()).trim().to_string();
        if let Some(&index) = self.by_expression.get(&expression) {
            self.segments.push(Segment::Dynamic(index));
            return;
        }

        let index = self.parts.len();
        let taken: Vec<String> = self.parts.iter().map(|p| p.name.clone()).collect();
        let name = dedupe_name(&param_name(expr, index), &taken);
        let is_complex = !matches!(unwrap_expr(expr), Expr::Ident(_));

        self.parts.push(DynamicPart {
            name,
            expression: expression.clone(),
            is_complex,
        });
        self.by_expression.insert(expression, index);
        self.segments.push(Segment::Dynamic(index));
    }

    fn push_template(&mut self, tpl: &Tpl) {
        for (i, quasi) in tpl.quasis.iter().enumerate() {
            self.push_static(quasi_text(quasi));
            if let Some(expr) = tpl.exprs.get(i) {
                self.push_dynamic(expr);
            }
        }
    }

    fn finish(self, expression_type: ExpressionType) -> ExpressionAnalysis {
        let static_parts: Vec<String> = self
            .segments
            .iter()
            .filter_map(|s| match s {
                Segment::Static(text) => Some(text.clone()),
                Segment::Dynamic(_) => None,
            })
            .collect();

        if static_parts.iter().all(|p| p.trim().is_empty()) {
            let mut analysis =
                ExpressionAnalysis::new(ExpressionType::PureDynamic, MergeStrategy::Preserve);
            analysis.dynamic_parts = self.parts;
            return analysis;
        }

        let pattern = concat_pattern(&self.segments);
        let is_complex = self.parts.iter().any(|p| p.is_complex);
        let mut analysis = ExpressionAnalysis::new(expression_type, MergeStrategy::Interpolation);
        analysis.static_parts = static_parts;
        analysis.dynamic_parts = self.parts;
        analysis.segments = self.segments;
        analysis.pattern = Some(pattern);
        analysis.is_complex = is_complex;

        if let Some(template) = analysis.interpolation().map(|i| i.template())
            && let Some(reason) = non_translatable_reason(&template)
        {
            analysis.expression_type = ExpressionType::NonTranslatable;
            analysis.suggestion = MergeStrategy::Skip;
            analysis.skip_reason = Some(reason);
        }
        analysis
    }
}

fn concat_pattern(segments: &[Segment]) -> ConcatPattern {
    let mut runs: Vec<bool> = Vec::new();
    for segment in segments {
        let is_static = matches!(segment, Segment::Static(_));
        if runs.last() != Some(&is_static) {
            runs.push(is_static);
        }
    }
    match runs.as_slice() {
        [true, false] => ConcatPattern::StaticPrefix,
        [false, true] => ConcatPattern::DynamicPrefix,
        [true, false, true] => ConcatPattern::Sandwich,
        _ => ConcatPattern::Interleaved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parsers::jsx::parse_expression;
    use pretty_assertions::assert_eq;

    fn analyze(code: &str) -> ExpressionAnalysis {
        analyze_with(code, ClassifierOptions::default())
    }

    fn analyze_with(code: &str, options: ClassifierOptions) -> ExpressionAnalysis {
        let parsed = parse_expression(code, 0).unwrap();
        let snippets = parsed.snippets(code);
        classify(&parsed.expr, &snippets, options)
    }

    #[test]
    fn test_simple_string() {
        let analysis = analyze("'Save changes'");
        assert_eq!(analysis.expression_type, ExpressionType::SimpleString);
        assert_eq!(analysis.static_value.as_deref(), Some("Save changes"));
        assert_eq!(analysis.suggestion, MergeStrategy::SimpleReplace);
    }

    #[test]
    fn test_mixed_concatenation_static_prefix() {
        let analysis = analyze("'Count: ' + count");
        assert_eq!(analysis.expression_type, ExpressionType::MixedConcatenation);
        assert_eq!(analysis.pattern, Some(ConcatPattern::StaticPrefix));
        assert_eq!(analysis.suggestion, MergeStrategy::Interpolation);
        assert_eq!(
            analysis.interpolation().unwrap().template(),
            "Count: {count}"
        );
        assert!(!analysis.is_complex);
    }

    #[test]
    fn test_static_concatenation_merges() {
        let analysis = analyze("'a' + 'b' + 'c'");
        assert_eq!(analysis.expression_type, ExpressionType::StaticConcatenation);
        assert_eq!(analysis.static_value.as_deref(), Some("abc"));
        assert_eq!(analysis.static_parts, vec!["a", "b", "c"]);
        assert_eq!(analysis.suggestion, MergeStrategy::MergeAndReplace);
    }

    #[test]
    fn test_separate_replacement_is_opt_in() {
        let analysis = analyze_with(
            "'Hello ' + 'world'",
            ClassifierOptions {
                separate_static_concatenation: true,
            },
        );
        assert_eq!(analysis.suggestion, MergeStrategy::SeparateReplace);
    }

    #[test]
    fn test_bare_identifier_is_pure_dynamic() {
        let analysis = analyze("label");
        assert_eq!(analysis.expression_type, ExpressionType::PureDynamic);
        assert_eq!(analysis.suggestion, MergeStrategy::Preserve);
        assert!(!analysis.is_extractable());
    }

    #[test]
    fn test_patterns() {
        assert_eq!(
            analyze("count + ' items'").pattern,
            Some(ConcatPattern::DynamicPrefix)
        );
        assert_eq!(
            analyze("'You have ' + count + ' items'").pattern,
            Some(ConcatPattern::Sandwich)
        );
        assert_eq!(
            analyze("page + ' of ' + total").pattern,
            Some(ConcatPattern::Interleaved)
        );
    }

    #[test]
    fn test_template_with_expressions() {
        let analysis = analyze("`Hello ${user.name}, you have ${count} messages`");
        assert_eq!(
            analysis.expression_type,
            ExpressionType::TemplateWithExpressions
        );
        assert!(analysis.is_complex);
        assert_eq!(
            analysis.interpolation().unwrap().template(),
            "Hello {userName}, you have {count} messages"
        );
        assert_eq!(analysis.dynamic_parts[0].expression, "user.name");
    }

    #[test]
    fn test_simple_template_literal() {
        let analysis = analyze("`Welcome back`");
        assert_eq!(
            analysis.expression_type,
            ExpressionType::SimpleTemplateLiteral
        );
        assert_eq!(analysis.static_value.as_deref(), Some("Welcome back"));
    }

    #[test]
    fn test_repeated_expression_reuses_name() {
        let analysis = analyze("'From ' + a + ' to ' + a");
        assert_eq!(analysis.dynamic_parts.len(), 1);
        assert_eq!(
            analysis.interpolation().unwrap().template(),
            "From {a} to {a}"
        );
    }

    #[test]
    fn test_colliding_names_are_deduplicated() {
        let analysis = analyze("'Now ' + format(a) + ' was ' + format(b)");
        let names: Vec<&str> = analysis
            .dynamic_parts
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["format", "format2"]);
    }

    #[test]
    fn test_leading_numeric_run_stays_whole() {
        let analysis = analyze("a + b + ' items'");
        assert_eq!(analysis.dynamic_parts.len(), 1);
        assert_eq!(analysis.dynamic_parts[0].expression, "a + b");
        assert_eq!(analysis.pattern, Some(ConcatPattern::DynamicPrefix));
    }

    #[test]
    fn test_numbers_fold_into_static_text() {
        let analysis = analyze("'Top ' + 10 + ' results'");
        assert_eq!(analysis.expression_type, ExpressionType::StaticConcatenation);
        assert_eq!(analysis.static_value.as_deref(), Some("Top 10 results"));
    }

    #[test]
    fn test_conditional_and_fallback() {
        assert_eq!(
            analyze("ok ? 'Yes' : 'No'").expression_type,
            ExpressionType::ConditionalStrings
        );
        assert_eq!(
            analyze("label || 'Untitled'").expression_type,
            ExpressionType::LogicalWithFallback
        );
        assert_eq!(
            analyze("label ?? 'Untitled'").suggestion,
            MergeStrategy::Skip
        );
    }

    #[test]
    fn test_single_literal_ternary_is_not_conditional_strings() {
        let analysis = analyze("user ? user.name : 'Guest'");
        assert_eq!(analysis.expression_type, ExpressionType::LogicalWithFallback);
        assert_eq!(analysis.skip_reason, Some(SkipReason::SingleLiteralBranch));
        assert_eq!(analysis.suggestion, MergeStrategy::Skip);

        let analysis = analyze("ok ? 'Yes' : 'No'");
        assert_eq!(analysis.skip_reason, Some(SkipReason::PartialLiteral));
    }

    #[test]
    fn test_non_translatable_literals() {
        let sql = analyze("'SELECT * FROM users WHERE id = ' + id");
        assert_eq!(sql.expression_type, ExpressionType::NonTranslatable);
        assert_eq!(sql.skip_reason, Some(SkipReason::SqlLike));

        let number = analyze("42");
        assert_eq!(number.expression_type, ExpressionType::NonTranslatable);
        assert_eq!(number.skip_reason, Some(SkipReason::NonStringLiteral));

        let format = analyze("'%s selected'");
        assert_eq!(format.skip_reason, Some(SkipReason::FormatSpecifier));
    }

    #[test]
    fn test_empty_string() {
        let analysis = analyze("'   '");
        assert_eq!(analysis.expression_type, ExpressionType::Empty);
        assert!(!analysis.is_extractable());
    }

    #[test]
    fn test_wrappers_are_transparent() {
        let analysis = analyze("('Save' as const)");
        assert_eq!(analysis.expression_type, ExpressionType::SimpleString);
    }
}
