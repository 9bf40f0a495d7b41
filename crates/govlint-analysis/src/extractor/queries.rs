//! Inline `[SELECT ...]` queries and dynamic `Database.query(...)` calls.

use super::types::{Query, QueryKind};
use super::SourceContext;
use crate::scanner::Span;

/// `Database` methods that execute a query string.
const DYNAMIC_QUERY_METHODS: &[&str] = &[
    "query",
    "queryWithBinds",
    "countQuery",
    "countQueryWithBinds",
    "getQueryLocator",
    "getQueryLocatorWithBinds",
];

pub(crate) fn extract_queries(ctx: &SourceContext) -> Vec<Query> {
    let mut queries = inline_queries(ctx);
    queries.extend(dynamic_queries(ctx));
    queries.sort_by_key(|q| q.span.start);
    queries
}

fn inline_queries(ctx: &SourceContext) -> Vec<Query> {
    let tokens = ctx.tokens();
    let mut out = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if !(tokens[i].is_punct(b'[') && ctx.word_is(i + 1, "select")) {
            i += 1;
            continue;
        }
        let Some(close) = ctx.scanner.match_token(i, b'[', b']') else {
            tracing::debug!(offset = tokens[i].start, "unterminated query bracket");
            i += 1;
            continue;
        };
        if !(i + 2..close).any(|j| ctx.word_is(j, "from")) {
            i += 1;
            continue;
        }
        let span = Span::new(tokens[i].start, tokens[close].end);
        let inner = &ctx.text[tokens[i].start + 1..tokens[close].start];
        out.push(Query {
            kind: QueryKind::Inline,
            text: Some(inner.trim().to_string()),
            range: ctx.range(span),
            span,
            has_limit: has_limit(ctx, i + 1, close),
        });
        i = close + 1;
    }
    out
}

/// `LIMIT <integer>` in code tokens; a `LIMIT :bind` does not count.
fn has_limit(ctx: &SourceContext, from: usize, to: usize) -> bool {
    (from..to).any(|j| {
        ctx.word_is(j, "limit")
            && ctx
                .token_text(j + 1)
                .is_some_and(|t| j + 1 < to && t.bytes().all(|b| b.is_ascii_digit()))
    })
}

fn dynamic_queries(ctx: &SourceContext) -> Vec<Query> {
    let tokens = ctx.tokens();
    let mut out = Vec::new();
    for i in 0..tokens.len() {
        if !(ctx.word_is(i, "database") && !ctx.follows_dot(i) && ctx.punct_is(i + 1, b'.')) {
            continue;
        }
        let is_query_method = DYNAMIC_QUERY_METHODS.iter().any(|m| ctx.word_is(i + 2, m));
        if !is_query_method || !ctx.punct_is(i + 3, b'(') {
            continue;
        }
        let end = match ctx.scanner.match_token(i + 3, b'(', b')') {
            Some(close) => tokens[close].end,
            None => tokens[i + 3].end,
        };
        let span = Span::new(tokens[i].start, end);
        out.push(Query {
            kind: QueryKind::Dynamic,
            text: None,
            range: ctx.range(span),
            span,
            has_limit: true,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queries(src: &str) -> Vec<Query> {
        extract_queries(&SourceContext::new(src))
    }

    #[test]
    fn limit_is_detected_case_insensitively() {
        let q = queries("List<Account> a = [SELECT Id FROM Account limit 10];");
        assert_eq!(q.len(), 1);
        assert!(q[0].has_limit);
        assert_eq!(q[0].text.as_deref(), Some("SELECT Id FROM Account limit 10"));

        let q = queries("List<Account> a = [select Id from Account];");
        assert!(!q[0].has_limit);
    }

    #[test]
    fn limit_inside_a_string_does_not_count() {
        let q = queries("x = [SELECT Id FROM Account WHERE Name = 'LIMIT 5'];");
        assert!(!q[0].has_limit);
    }

    #[test]
    fn multi_line_query_spans_lines() {
        let q = queries("x = [\n  SELECT Id\n  FROM Contact\n];");
        assert_eq!(q.len(), 1);
        assert_eq!(q[0].range.start.line, 0);
        assert_eq!(q[0].range.end.line, 3);
    }

    #[test]
    fn brackets_without_from_are_not_queries() {
        assert!(queries("Integer y = arr[select];").is_empty());
        assert!(queries("Integer y = arr[0];").is_empty());
    }

    #[test]
    fn dynamic_query_is_opaque_and_limited() {
        let q = queries("List<SObject> r = Database.query(soql);");
        assert_eq!(q.len(), 1);
        assert_eq!(q[0].kind, QueryKind::Dynamic);
        assert!(q[0].text.is_none());
        assert!(q[0].has_limit);
    }

    #[test]
    fn query_in_comment_is_ignored() {
        assert!(queries("// [SELECT Id FROM Account]\n/* [SELECT Id FROM Lead] */").is_empty());
    }
}
