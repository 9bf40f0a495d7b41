//! Structural extractor: turns raw Apex text into a flat, positioned
//! [`ParsedFile`] without a compiler front end.
//!
//! The file is scanned once ([`Scanner`]); every pass below works on the
//! shared token and region tables. Per-method facts are carved out of the
//! file-level facts by body span rather than by re-scanning the body text.

pub mod calls;
pub mod dml;
pub mod fields;
pub mod hardcoded_ids;
pub mod loops;
pub mod methods;
pub mod nesting;
pub mod queries;
pub mod sobjects;
pub mod triggers;
pub mod types;

use std::sync::OnceLock;

use govlint_core::config::analysis_config::DEFAULT_MAX_NESTING_DEPTH;
use regex::Regex;

use crate::scanner::{LineIndex, Position, Range, Scanner, Span, Token, TokenKind};

pub use types::*;

/// Knobs that change what the extractor records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Nesting depth above which a [`DeepNesting`] fact is recorded.
    pub max_nesting_depth: u32,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// Extract structural facts from `text` with default options.
pub fn extract(text: &str) -> ParsedFile {
    extract_with(text, &ExtractOptions::default())
}

/// Extract structural facts from `text`. Never fails: malformed constructs
/// are skipped one candidate at a time.
pub fn extract_with(text: &str, options: &ExtractOptions) -> ParsedFile {
    let ctx = SourceContext::new(text);

    let class_name = class_name(&ctx);
    let queries = queries::extract_queries(&ctx);
    let data_operations = dml::extract_data_operations(&ctx, &queries);
    let call_candidates = calls::extract_calls(&ctx, &queries, class_name.as_deref());
    let methods = methods::extract_methods(&ctx, &queries, &data_operations, &call_candidates);
    let method_calls = calls::drop_declarations(call_candidates, &methods);
    let loops = loops::extract_loops(&ctx);
    let hardcoded_ids = hardcoded_ids::extract_hardcoded_ids(&ctx);
    let field_references = fields::extract_field_references(&ctx, &queries);
    let trigger = triggers::extract_trigger(&ctx, &data_operations);
    let deep_nesting = nesting::extract_deep_nesting(&ctx, &queries, options.max_nesting_depth);

    tracing::debug!(
        methods = methods.len(),
        loops = loops.len(),
        queries = queries.len(),
        dml = data_operations.len(),
        "extracted structural facts"
    );

    ParsedFile {
        is_test_class: is_test_class(&ctx),
        is_trigger: trigger.is_some(),
        class_name,
        loops,
        queries,
        data_operations,
        methods,
        method_calls,
        hardcoded_ids,
        field_references,
        trigger,
        deep_nesting,
    }
}

/// Shared lexical state for all extraction passes over one file.
pub(crate) struct SourceContext<'a> {
    pub text: &'a str,
    pub scanner: Scanner<'a>,
    pub lines: LineIndex<'a>,
}

impl<'a> SourceContext<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            scanner: Scanner::new(text),
            lines: LineIndex::new(text),
        }
    }

    pub fn tokens(&self) -> &[Token] {
        self.scanner.tokens()
    }

    pub fn token_text(&self, idx: usize) -> Option<&'a str> {
        let text = self.text;
        self.tokens().get(idx).map(|t| t.text(text))
    }

    /// Whether token `idx` is the word `keyword`, ignoring ASCII case.
    pub fn word_is(&self, idx: usize, keyword: &str) -> bool {
        self.tokens()
            .get(idx)
            .filter(|t| t.kind == TokenKind::Word)
            .is_some_and(|t| t.text(self.text).eq_ignore_ascii_case(keyword))
    }

    pub fn punct_is(&self, idx: usize, byte: u8) -> bool {
        self.tokens().get(idx).is_some_and(|t| t.is_punct(byte))
    }

    /// Whether the token before `idx` is a member-access dot.
    pub fn follows_dot(&self, idx: usize) -> bool {
        idx > 0 && self.punct_is(idx - 1, b'.')
    }

    pub fn position(&self, offset: usize) -> Position {
        self.lines.position(offset)
    }

    pub fn range(&self, span: Span) -> Range {
        self.lines.range(span)
    }
}

/// Compile a built-in pattern once. A pattern that fails to compile is
/// logged and disables only the pass that owns it.
pub(crate) fn cached_regex(
    cell: &'static OnceLock<Option<Regex>>,
    pattern: &str,
) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::error!(error = %e, pattern, "invalid built-in pattern");
            None
        }
    })
    .as_ref()
}

/// Name of the first `class` declared in the file.
fn class_name(ctx: &SourceContext) -> Option<String> {
    let tokens = ctx.tokens();
    (0..tokens.len())
        .find(|&i| {
            ctx.word_is(i, "class")
                && !ctx.follows_dot(i)
                && tokens.get(i + 1).is_some_and(|t| t.is_word())
        })
        .and_then(|i| ctx.token_text(i + 1))
        .map(str::to_string)
}

/// `@isTest` anywhere in code, or the legacy `testMethod` modifier.
fn is_test_class(ctx: &SourceContext) -> bool {
    (0..ctx.tokens().len()).any(|i| {
        (ctx.word_is(i, "istest") && i > 0 && ctx.punct_is(i - 1, b'@'))
            || ctx.word_is(i, "testmethod")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_class_name_and_test_marker() {
        let parsed = extract("@isTest\nprivate class AccountServiceTest {\n}");
        assert_eq!(parsed.class_name.as_deref(), Some("AccountServiceTest"));
        assert!(parsed.is_test_class);
        assert!(!parsed.is_trigger);
    }

    #[test]
    fn class_literal_is_not_a_declaration() {
        let parsed = extract("Type t = Account.class;\npublic class Real {}");
        assert_eq!(parsed.class_name.as_deref(), Some("Real"));
    }

    #[test]
    fn empty_input_yields_empty_model() {
        assert_eq!(extract(""), ParsedFile::default());
    }
}
