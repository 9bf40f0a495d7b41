//! DML statements (`update records;`) and `Database.<verb>(...)` calls.

use super::types::{DataOperation, DmlForm, DmlVerb, Query};
use super::SourceContext;
use crate::scanner::{Span, TokenKind};

pub(crate) fn extract_data_operations(ctx: &SourceContext, queries: &[Query]) -> Vec<DataOperation> {
    let tokens = ctx.tokens();
    let mut out = Vec::new();
    for i in 0..tokens.len() {
        if !tokens[i].is_word() || ctx.follows_dot(i) {
            continue;
        }
        let Some(word) = ctx.token_text(i) else {
            continue;
        };
        if word.eq_ignore_ascii_case("database") {
            if let Some(op) = database_call(ctx, i) {
                out.push(op);
            }
            continue;
        }
        let Some(verb) = DmlVerb::parse(word) else {
            continue;
        };
        // `FOR UPDATE` and friends inside a query are not statements.
        if queries.iter().any(|q| q.span.contains(tokens[i].start)) {
            continue;
        }
        if let Some(op) = statement(ctx, i, verb) {
            out.push(op);
        }
    }
    out
}

/// `<verb> <expression>;` starting at token `i`.
fn statement(ctx: &SourceContext, i: usize, verb: DmlVerb) -> Option<DataOperation> {
    let tokens = ctx.tokens();
    let first = tokens.get(i + 1)?;
    if first.is_punct(b';') || first.is_punct(b')') || first.is_punct(b',') || first.is_punct(b'=') {
        return None;
    }
    let mut depth = 0i32;
    let mut end = None;
    for (j, tok) in tokens.iter().enumerate().skip(i + 1) {
        match tok.kind {
            TokenKind::Punct(b'{' | b'}') => return None,
            TokenKind::Punct(b'(' | b'[') => depth += 1,
            TokenKind::Punct(b')' | b']') => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            TokenKind::Punct(b';') if depth == 0 => {
                end = Some(j);
                break;
            }
            _ => {}
        }
    }
    let end = end?;
    let span = Span::new(tokens[i].start, tokens[end].end);
    Some(DataOperation {
        verb,
        form: DmlForm::Statement,
        range: ctx.range(span),
        span,
        target_variable: leading_identifier(ctx, i + 1, end),
    })
}

/// `Database.<verb>(<args>)` where token `i` is `Database`.
fn database_call(ctx: &SourceContext, i: usize) -> Option<DataOperation> {
    if !ctx.punct_is(i + 1, b'.') || !ctx.punct_is(i + 3, b'(') {
        return None;
    }
    let verb = DmlVerb::parse(ctx.token_text(i + 2)?)?;
    let tokens = ctx.tokens();
    let close = ctx.scanner.match_token(i + 3, b'(', b')')?;
    let first_arg_end = top_level_comma(ctx, i + 4, close).unwrap_or(close);
    let span = Span::new(tokens[i].start, tokens[close].end);
    Some(DataOperation {
        verb,
        form: DmlForm::DatabaseMethod,
        range: ctx.range(span),
        span,
        target_variable: leading_identifier(ctx, i + 4, first_arg_end),
    })
}

fn top_level_comma(ctx: &SourceContext, from: usize, to: usize) -> Option<usize> {
    let mut depth = 0i32;
    for j in from..to {
        let tok = ctx.tokens()[j];
        if tok.is_punct(b'(') || tok.is_punct(b'[') || tok.is_punct(b'{') || tok.is_punct(b'<') {
            depth += 1;
        } else if tok.is_punct(b')') || tok.is_punct(b']') || tok.is_punct(b'}') || tok.is_punct(b'>') {
            depth -= 1;
        } else if tok.is_punct(b',') && depth == 0 {
            return Some(j);
        }
    }
    None
}

/// Leading identifier of the expression in tokens `[from, to)`. `this.x`
/// yields `x`; constructor expressions and inline queries yield nothing.
fn leading_identifier(ctx: &SourceContext, from: usize, to: usize) -> Option<String> {
    if from >= to {
        return None;
    }
    let mut idx = from;
    if ctx.word_is(idx, "this") && ctx.punct_is(idx + 1, b'.') && idx + 2 < to {
        idx += 2;
    }
    let tok = ctx.tokens().get(idx)?;
    if !tok.is_word() || ctx.word_is(idx, "new") {
        return None;
    }
    let text = tok.text(ctx.text);
    let starts_like_ident = text
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_');
    starts_like_ident.then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::queries::extract_queries;

    fn ops(src: &str) -> Vec<DataOperation> {
        let ctx = SourceContext::new(src);
        let queries = extract_queries(&ctx);
        extract_data_operations(&ctx, &queries)
    }

    #[test]
    fn statement_form_with_target() {
        let o = ops("update accounts;\ninsert this.pending;\nDELETE [SELECT Id FROM Lead];");
        assert_eq!(o.len(), 3);
        assert_eq!(o[0].verb, DmlVerb::Update);
        assert_eq!(o[0].target_variable.as_deref(), Some("accounts"));
        assert_eq!(o[1].target_variable.as_deref(), Some("pending"));
        assert_eq!(o[2].verb, DmlVerb::Delete);
        assert_eq!(o[2].target_variable, None);
        assert_eq!(o[2].range.start.line, 2);
    }

    #[test]
    fn multi_line_statement() {
        let o = ops("upsert\n   records\n   External_Id__c;");
        assert_eq!(o.len(), 1);
        assert_eq!(o[0].range.end.line, 2);
    }

    #[test]
    fn constructor_operand_has_no_target() {
        let o = ops("insert new Account(Name = 'x');");
        assert_eq!(o.len(), 1);
        assert_eq!(o[0].target_variable, None);
    }

    #[test]
    fn database_form_uses_first_argument() {
        let o = ops("Database.update(accs, false);\nDatabase.insert(new List<Account>{a, b}, true);");
        assert_eq!(o.len(), 2);
        assert_eq!(o[0].form, DmlForm::DatabaseMethod);
        assert_eq!(o[0].target_variable.as_deref(), Some("accs"));
        assert_eq!(o[1].verb, DmlVerb::Insert);
        assert_eq!(o[1].target_variable, None);
    }

    #[test]
    fn strings_comments_and_members_are_not_dml() {
        assert!(ops("String s = 'update x;';").is_empty());
        assert!(ops("// delete x;\n/* insert y; */").is_empty());
        assert!(ops("Boolean b = acc.update;").is_empty());
        assert!(ops("Integer lastUpdate = 0; updated = 1;").is_empty());
    }

    #[test]
    fn trigger_events_and_query_locks_are_not_dml() {
        assert!(ops("trigger T on Account (after insert, after update) { }").is_empty());
        assert!(ops("x = [SELECT Id FROM Account FOR UPDATE];").is_empty());
    }
}
