//! Brace-bodied `for`, `while`, and `do` loops.

use super::types::{Loop, LoopKind};
use super::SourceContext;
use crate::scanner::Span;

pub(crate) fn extract_loops(ctx: &SourceContext) -> Vec<Loop> {
    let tokens = ctx.tokens();
    let mut out = Vec::new();
    for i in 0..tokens.len() {
        if !tokens[i].is_word() || ctx.follows_dot(i) {
            continue;
        }
        let found = if ctx.word_is(i, "for") {
            headed_loop(ctx, i, true)
        } else if ctx.word_is(i, "while") {
            headed_loop(ctx, i, false)
        } else if ctx.word_is(i, "do") {
            do_loop(ctx, i)
        } else {
            None
        };
        if let Some(l) = found {
            out.push(l);
        }
    }
    out
}

/// `for (...) {` or `while (...) {` at token `i`.
fn headed_loop(ctx: &SourceContext, i: usize, is_for: bool) -> Option<Loop> {
    let tokens = ctx.tokens();
    if !ctx.punct_is(i + 1, b'(') {
        return None;
    }
    let Some(close) = ctx.scanner.match_token(i + 1, b'(', b')') else {
        tracing::debug!(offset = tokens[i].start, "unterminated loop header");
        return None;
    };
    // `} while (cond);` closes a do-while; braceless bodies are not tracked.
    if !ctx.punct_is(close + 1, b'{') {
        return None;
    }
    let open = tokens[close + 1].start;
    let Some(body_end) = ctx.scanner.match_brace(open) else {
        tracing::debug!(offset = open, "unterminated loop body");
        return None;
    };
    let kind = match (is_for, is_for_each_header(ctx, i + 2, close)) {
        (true, true) => LoopKind::ForEach,
        (true, false) => LoopKind::For,
        (false, _) => LoopKind::While,
    };
    let span = Span::new(tokens[i].start, body_end + 1);
    Some(Loop {
        kind,
        range: ctx.range(span),
        span,
        header: Some(Span::new(tokens[i + 1].start, tokens[close].end)),
    })
}

fn do_loop(ctx: &SourceContext, i: usize) -> Option<Loop> {
    if !ctx.punct_is(i + 1, b'{') {
        return None;
    }
    let tokens = ctx.tokens();
    let open = tokens[i + 1].start;
    let Some(body_end) = ctx.scanner.match_brace(open) else {
        tracing::debug!(offset = open, "unterminated do body");
        return None;
    };
    let span = Span::new(tokens[i].start, body_end + 1);
    Some(Loop {
        kind: LoopKind::DoWhile,
        range: ctx.range(span),
        span,
        header: None,
    })
}

/// `Type name : iterable`, a top-level `:` preceded by a type and a name,
/// with no `;` before it.
fn is_for_each_header(ctx: &SourceContext, from: usize, to: usize) -> bool {
    let mut depth = 0i32;
    for j in from..to {
        let tok = ctx.tokens()[j];
        if tok.is_punct(b'(') || tok.is_punct(b'[') {
            depth += 1;
        } else if tok.is_punct(b')') || tok.is_punct(b']') {
            depth -= 1;
        } else if tok.is_punct(b';') {
            return false;
        } else if tok.is_punct(b':') && depth == 0 {
            let name_is_word = j > from && ctx.tokens()[j - 1].is_word();
            let has_type = j >= from + 2
                && (ctx.tokens()[j - 2].is_word()
                    || ctx.punct_is(j - 2, b'>')
                    || ctx.punct_is(j - 2, b']'));
            return name_is_word && has_type;
        }
    }
    false
}
