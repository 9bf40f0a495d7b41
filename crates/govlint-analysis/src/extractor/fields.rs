//! Field references from three passes: custom-suffixed identifiers,
//! relationship paths, and query SELECT/WHERE clauses.
//!
//! Deduplicated by lowercased name, first seen wins. Anything inside a
//! bulk query (more than [`BULK_QUERY_FIELDS`] selected fields) is skipped
//! by every pass.

use govlint_core::types::collections::FxHashSet;

use super::types::{FieldReference, FieldSource, Query, QueryKind};
use super::SourceContext;
use crate::scanner::Span;

pub const BULK_QUERY_FIELDS: usize = 15;

/// Words that end a WHERE clause.
const WHERE_TERMINATORS: &[&str] = &[
    "order", "group", "limit", "offset", "for", "with", "having", "all", "using",
];

/// Words that can follow a field operand in a WHERE clause.
const OPERATOR_WORDS: &[&str] = &["like", "in", "not", "includes", "excludes"];

const SOQL_WORDS: &[&str] = &[
    "and", "or", "not", "null", "true", "false", "select", "from", "where", "in", "like",
];

/// Token layout of one inline query.
struct QueryShape {
    /// Token ranges of SELECT-list items, `[start, end)`.
    items: Vec<(usize, usize)>,
    from_object: Option<usize>,
    /// Token range of the WHERE clause, `[start, end)`.
    where_clause: Option<(usize, usize)>,
}

struct FieldCollector<'c, 'a> {
    ctx: &'c SourceContext<'a>,
    seen: FxHashSet<String>,
    out: Vec<FieldReference>,
}

impl FieldCollector<'_, '_> {
    fn push(&mut self, name_idx: usize, object: Option<&str>, source: FieldSource) {
        let tok = self.ctx.tokens()[name_idx];
        let name = tok.text(self.ctx.text);
        if !self.seen.insert(name.to_ascii_lowercase()) {
            return;
        }
        self.out.push(FieldReference {
            name: name.to_string(),
            object: object.map(str::to_string),
            position: self.ctx.position(tok.start),
            span: Span::new(tok.start, tok.end),
            source,
        });
    }
}

pub(crate) fn extract_field_references(ctx: &SourceContext, queries: &[Query]) -> Vec<FieldReference> {
    let shapes: Vec<(Span, QueryShape)> = queries
        .iter()
        .filter(|q| q.kind == QueryKind::Inline)
        .filter_map(|q| query_shape(ctx, q.span).map(|s| (q.span, s)))
        .collect();
    let bulk: Vec<Span> = shapes
        .iter()
        .filter(|(_, s)| s.items.len() > BULK_QUERY_FIELDS)
        .map(|(span, _)| *span)
        .collect();
    let allowed = |offset: usize| {
        let in_query = queries.iter().any(|q| q.span.contains(offset));
        (ctx.scanner.is_code(offset) || in_query) && !bulk.iter().any(|b| b.contains(offset))
    };

    let mut collector = FieldCollector {
        ctx,
        seen: FxHashSet::default(),
        out: Vec::new(),
    };
    let tokens = ctx.tokens();

    for (i, tok) in tokens.iter().enumerate() {
        if !tok.is_word() || !allowed(tok.start) {
            continue;
        }
        let text = tok.text(ctx.text);
        if has_suffix(text, "__c") {
            let owner = (ctx.follows_dot(i) && i >= 2 && tokens[i - 2].is_word())
                .then(|| tokens[i - 2].text(ctx.text));
            collector.push(i, owner, FieldSource::Identifier);
        }
    }

    for (i, tok) in tokens.iter().enumerate() {
        if !tok.is_word() || !allowed(tok.start) {
            continue;
        }
        let text = tok.text(ctx.text);
        if has_suffix(text, "__r") && ctx.punct_is(i + 1, b'.') && tokens.get(i + 2).is_some_and(|t| t.is_word()) {
            collector.push(i + 2, Some(text), FieldSource::RelationshipPath);
        }
    }

    for (span, shape) in &shapes {
        if bulk.contains(span) {
            continue;
        }
        let from_object = shape.from_object.and_then(|idx| ctx.token_text(idx));
        for &(start, end) in &shape.items {
            if let Some(path) = field_path(ctx, start, end) {
                push_path(&mut collector, &path, from_object);
            }
        }
        if let Some((start, end)) = shape.where_clause {
            for path in where_operands(ctx, start, end) {
                push_path(&mut collector, &path, from_object);
            }
        }
    }

    collector.out
}

fn push_path(collector: &mut FieldCollector, path: &[usize], from_object: Option<&str>) {
    let Some(&last) = path.last() else {
        return;
    };
    let ctx = collector.ctx;
    let owner = match path.len() {
        1 => from_object,
        n => ctx.token_text(path[n - 2]),
    };
    collector.push(last, owner, FieldSource::QueryClause);
}

fn has_suffix(word: &str, suffix: &str) -> bool {
    word.len() > suffix.len()
        && word
            .get(word.len() - suffix.len()..)
            .is_some_and(|t| t.eq_ignore_ascii_case(suffix))
}

fn is_one_of(word: &str, list: &[&str]) -> bool {
    list.iter().any(|w| w.eq_ignore_ascii_case(word))
}

fn query_shape(ctx: &SourceContext, span: Span) -> Option<QueryShape> {
    let open = ctx.scanner.token_index_at(span.start)?;
    let close = ctx.scanner.token_index_at(span.end - 1)?;
    if !ctx.word_is(open + 1, "select") {
        return None;
    }

    let mut items = Vec::new();
    let mut depth = 0i32;
    let mut item_start = open + 2;
    let mut from = None;
    for j in open + 2..close {
        if ctx.punct_is(j, b'(') {
            depth += 1;
        } else if ctx.punct_is(j, b')') {
            depth -= 1;
        } else if depth == 0 && ctx.punct_is(j, b',') {
            items.push((item_start, j));
            item_start = j + 1;
        } else if depth == 0 && ctx.word_is(j, "from") {
            items.push((item_start, j));
            from = Some(j);
            break;
        }
    }
    let from = from?;
    let from_object = ctx.tokens().get(from + 1).filter(|t| t.is_word()).map(|_| from + 1);

    let mut where_clause = None;
    let mut depth = 0i32;
    for j in from + 1..close {
        if ctx.punct_is(j, b'(') {
            depth += 1;
        } else if ctx.punct_is(j, b')') {
            depth -= 1;
        } else if depth == 0 && ctx.word_is(j, "where") {
            let end = (j + 1..close)
                .find(|&k| {
                    ctx.tokens()[k].is_word()
                        && is_one_of(ctx.token_text(k).unwrap_or_default(), WHERE_TERMINATORS)
                })
                .unwrap_or(close);
            where_clause = Some((j + 1, end));
            break;
        }
    }

    Some(QueryShape {
        items,
        from_object,
        where_clause,
    })
}

/// `Word (. Word)*` spanning exactly `[start, end)`.
fn field_path(ctx: &SourceContext, start: usize, end: usize) -> Option<Vec<usize>> {
    if start >= end || (end - start) % 2 == 0 {
        return None;
    }
    let path: Vec<usize> = (start..end).step_by(2).collect();
    let shaped = path.iter().all(|&k| ctx.tokens()[k].is_word())
        && (start + 1..end).step_by(2).all(|k| ctx.punct_is(k, b'.'));
    shaped.then_some(path)
}

/// Paths in `[start, end)` that are directly followed by a comparison.
fn where_operands(ctx: &SourceContext, start: usize, end: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut k = start;
    while k < end {
        let tok = ctx.tokens()[k];
        let candidate = tok.is_word()
            && !(k > 0 && (ctx.punct_is(k - 1, b':') || ctx.punct_is(k - 1, b'.')))
            && !is_one_of(tok.text(ctx.text), SOQL_WORDS);
        if !candidate {
            k += 1;
            continue;
        }
        let mut path = vec![k];
        let mut next = k + 1;
        while next + 1 < end && ctx.punct_is(next, b'.') && ctx.tokens()[next + 1].is_word() {
            path.push(next + 1);
            next += 2;
        }
        let compared = next < end
            && (ctx.punct_is(next, b'=')
                || ctx.punct_is(next, b'!')
                || ctx.punct_is(next, b'<')
                || ctx.punct_is(next, b'>')
                || is_one_of(ctx.token_text(next).unwrap_or_default(), OPERATOR_WORDS));
        if compared {
            out.push(path);
        }
        k = next;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::queries::extract_queries;

    fn fields(src: &str) -> Vec<FieldReference> {
        let ctx = SourceContext::new(src);
        let queries = extract_queries(&ctx);
        extract_field_references(&ctx, &queries)
    }

    fn names(refs: &[FieldReference]) -> Vec<&str> {
        refs.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn custom_identifiers_with_owner() {
        let f = fields("acc.Region__c = 'x';\nString r = acc.REGION__C;\nx = Tier__c;");
        assert_eq!(names(&f), vec!["Region__c", "Tier__c"]);
        assert_eq!(f[0].object.as_deref(), Some("acc"));
        assert_eq!(f[0].source, FieldSource::Identifier);
        assert_eq!(f[1].object, None);
    }

    #[test]
    fn relationship_paths() {
        let f = fields("String n = c.Parent_Account__r.Name;");
        assert_eq!(names(&f), vec!["Name"]);
        assert_eq!(f[0].object.as_deref(), Some("Parent_Account__r"));
        assert_eq!(f[0].source, FieldSource::RelationshipPath);
    }

    #[test]
    fn query_select_and_where_fields() {
        let f = fields("x = [SELECT Id, Owner.Name, Score__c FROM Lead WHERE Status = :s AND Rating != null];");
        assert_eq!(names(&f), vec!["Score__c", "Id", "Name", "Status", "Rating"]);
        assert_eq!(f[1].object.as_deref(), Some("Lead"));
        assert_eq!(f[2].object.as_deref(), Some("Owner"));
        assert_eq!(f[3].source, FieldSource::QueryClause);
    }

    #[test]
    fn bulk_queries_are_excluded_entirely() {
        let list: Vec<String> = (0..16).map(|i| format!("F{i}__c")).collect();
        let src = format!("x = [SELECT {} FROM Obj__c];\ny = Kept__c;", list.join(", "));
        let f = fields(&src);
        assert_eq!(names(&f), vec!["Kept__c"]);
    }

    #[test]
    fn strings_and_comments_are_not_fields() {
        let f = fields("String s = 'Hidden__c';\n// Other__c\nVisible__c = 1;");
        assert_eq!(names(&f), vec!["Visible__c"]);
    }
}
