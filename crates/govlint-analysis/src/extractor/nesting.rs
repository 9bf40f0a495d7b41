//! Control-block nesting depth.
//!
//! A stack of open constructs, each remembering the brace depth it was
//! opened at and whether it has a `{` body yet. `else`/`catch`/`finally`
//! continue the construct they belong to instead of opening a new level.

use govlint_core::types::collections::FxHashSet;

use super::types::{BlockKind, DeepNesting, Query};
use super::SourceContext;
use crate::scanner::{Span, TokenKind};

#[derive(Debug, Clone, Copy)]
struct OpenConstruct {
    brace_depth: i32,
    has_body: bool,
}

pub(crate) fn extract_deep_nesting(
    ctx: &SourceContext,
    queries: &[Query],
    threshold: u32,
) -> Vec<DeepNesting> {
    let tokens = ctx.tokens();
    let mut stack: Vec<OpenConstruct> = Vec::new();
    let mut reported_lines: FxHashSet<u32> = FxHashSet::default();
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut i = 0;

    while i < tokens.len() {
        let tok = tokens[i];
        match tok.kind {
            TokenKind::Punct(b'{') => {
                if let Some(top) = stack.last_mut() {
                    if !top.has_body && top.brace_depth == depth {
                        top.has_body = true;
                    }
                }
                depth += 1;
            }
            TokenKind::Punct(b'}') => {
                depth -= 1;
                // Pops the construct owning this brace and any braceless
                // parents whose single statement it was.
                while stack.last().is_some_and(|top| top.brace_depth >= depth) {
                    stack.pop();
                }
            }
            TokenKind::Punct(b';') => {
                while stack
                    .last()
                    .is_some_and(|top| !top.has_body && top.brace_depth == depth)
                {
                    stack.pop();
                }
            }
            // `FOR UPDATE` and friends belong to the query.
            TokenKind::Word if queries.iter().any(|q| q.span.contains(tok.start)) => {}
            TokenKind::Word => {
                let continuation = is_continuation(ctx, i);
                let fresh = if continuation { None } else { fresh_construct(ctx, i) };

                if continuation || fresh.is_some() {
                    stack.push(OpenConstruct {
                        brace_depth: depth,
                        has_body: false,
                    });
                }
                if let Some(kind) = fresh {
                    let level = stack.len() as u32;
                    let line = ctx.lines.line_of(tok.start);
                    if level > threshold && reported_lines.insert(line) {
                        out.push(DeepNesting {
                            depth: level,
                            position: ctx.position(tok.start),
                            span: Span::new(tok.start, tok.end),
                            kind,
                        });
                    }
                }
                if continuation || fresh.is_some() {
                    // `else if` shares the else's level.
                    if ctx.word_is(i, "else") && ctx.word_is(i + 1, "if") {
                        i += 1;
                    }
                    if let Some(close) = skip_header(ctx, i) {
                        i = close;
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }
    out
}

/// `else`, `catch`, `finally`: join the preceding construct's level.
fn is_continuation(ctx: &SourceContext, i: usize) -> bool {
    if ctx.follows_dot(i) {
        return false;
    }
    if ctx.word_is(i, "else") {
        // `when else` is a switch arm.
        return !(i > 0 && ctx.word_is(i - 1, "when"));
    }
    ctx.word_is(i, "catch") || ctx.word_is(i, "finally")
}

/// A construct that adds a nesting level.
fn fresh_construct(ctx: &SourceContext, i: usize) -> Option<BlockKind> {
    if ctx.follows_dot(i) {
        return None;
    }
    if ctx.word_is(i, "if") {
        Some(BlockKind::If)
    } else if ctx.word_is(i, "for") {
        Some(BlockKind::For)
    } else if ctx.word_is(i, "while") {
        (!is_do_while_tail(ctx, i)).then_some(BlockKind::While)
    } else if ctx.word_is(i, "do") {
        Some(BlockKind::DoWhile)
    } else if ctx.word_is(i, "try") {
        Some(BlockKind::Try)
    } else if ctx.word_is(i, "switch") && ctx.word_is(i + 1, "on") {
        Some(BlockKind::Switch)
    } else {
        None
    }
}

/// `while (cond);`
fn is_do_while_tail(ctx: &SourceContext, i: usize) -> bool {
    ctx.scanner
        .match_token(i + 1, b'(', b')')
        .is_some_and(|close| ctx.punct_is(close + 1, b';'))
}

/// Index of the `)` closing a header that starts right after token `i`.
fn skip_header(ctx: &SourceContext, i: usize) -> Option<usize> {
    if !ctx.punct_is(i + 1, b'(') {
        return None;
    }
    ctx.scanner.match_token(i + 1, b'(', b')')
}
