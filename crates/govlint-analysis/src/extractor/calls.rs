//! Same-file call sites: `name(`, `this.name(`, and `ClassName.name(`.

use super::types::{Method, MethodCall, Query};
use super::SourceContext;
use crate::scanner::Span;

/// Words that precede `(` without being a call.
const NON_CALL_WORDS: &[&str] = &[
    // control flow and declarations
    "if", "for", "while", "do", "switch", "catch", "return", "throw", "else", "try",
    "finally", "when", "super", "this", "class", "interface", "enum", "trigger",
    "instanceof", "void", "on",
    // DML verbs with a parenthesized operand
    "insert", "update", "delete", "upsert", "merge", "undelete",
    // SOQL
    "select", "from", "where", "and", "or", "not", "in", "like", "limit", "offset",
    "order", "by", "group", "having", "includes", "excludes", "typeof", "using",
    "count", "count_distinct", "sum", "avg", "min", "max", "tolabel", "format",
    "convertcurrency", "calendar_month", "calendar_quarter", "calendar_year",
    "day_in_month", "day_in_week", "day_in_year", "day_only", "fiscal_month",
    "fiscal_quarter", "fiscal_year", "hour_in_day", "week_in_month", "week_in_year",
    "grouping", "distance", "geolocation",
];

fn is_non_call_word(word: &str) -> bool {
    NON_CALL_WORDS.iter().any(|w| w.eq_ignore_ascii_case(word))
}

/// Every candidate call site in file order. Declarations are still
/// included; [`drop_declarations`] removes them once methods are known.
pub(crate) fn extract_calls(
    ctx: &SourceContext,
    queries: &[Query],
    class_name: Option<&str>,
) -> Vec<MethodCall> {
    let tokens = ctx.tokens();
    let mut out = Vec::new();
    for i in 0..tokens.len() {
        if !tokens[i].is_word() || !ctx.punct_is(i + 1, b'(') {
            continue;
        }
        let Some(name) = ctx.token_text(i) else {
            continue;
        };
        if is_non_call_word(name) || !name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
            continue;
        }
        if i > 0 && ctx.punct_is(i - 1, b'@') {
            continue;
        }
        if ctx.follows_dot(i) && !is_local_receiver(ctx, i - 1, class_name) {
            continue;
        }
        let start = tokens[i].start;
        if queries.iter().any(|q| q.span.contains(start)) {
            continue;
        }
        let span = Span::new(start, tokens[i].end);
        out.push(MethodCall {
            name: name.to_string(),
            position: ctx.position(start),
            span,
        });
    }
    out
}

/// Whether the receiver before the dot at `dot` is `this` or the file's
/// own class.
fn is_local_receiver(ctx: &SourceContext, dot: usize, class_name: Option<&str>) -> bool {
    if dot == 0 || ctx.follows_dot(dot - 1) {
        return false;
    }
    ctx.word_is(dot - 1, "this") || class_name.is_some_and(|c| ctx.word_is(dot - 1, c))
}

/// Removes candidates that are the name token of a method signature.
pub(crate) fn drop_declarations(calls: Vec<MethodCall>, methods: &[Method]) -> Vec<MethodCall> {
    calls
        .into_iter()
        .filter(|c| !methods.iter().any(|m| m.signature_span.contains(c.span.start)))
        .collect()
}

/// Distinct callee names within `span`, first occurrence wins.
pub(crate) fn callee_names_in(calls: &[MethodCall], span: Span) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for call in calls.iter().filter(|c| span.encloses(c.span)) {
        if !names.iter().any(|n| n.eq_ignore_ascii_case(&call.name)) {
            names.push(call.name.clone());
        }
    }
    names
}
