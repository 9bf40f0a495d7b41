//! Single forward pass over Apex source: region classification, string
//! literals, code tokens, and brace-depth bookkeeping.
//!
//! Everything higher up (loops, queries, methods, nesting) is built on the
//! tables produced here, so a file is scanned exactly once. Method bodies are
//! later carved out of these tables by span instead of being re-scanned.

use serde::{Deserialize, Serialize};

use super::position::Span;

/// Lexical region a byte belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Code,
    String,
    LineComment,
    BlockComment,
}

/// A quoted literal. `span` covers both quotes when terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringLiteral {
    pub span: Span,
    pub quote: u8,
    pub terminated: bool,
}

impl StringLiteral {
    /// The literal's text between the quotes.
    pub fn content<'t>(&self, text: &'t str) -> &'t str {
        let start = (self.span.start + 1).min(self.span.end);
        let end = if self.terminated {
            self.span.end - 1
        } else {
            self.span.end
        };
        text.get(start..end.max(start)).unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier, keyword, or number.
    Word,
    /// A single ASCII punctuation byte.
    Punct(u8),
}

/// A token in code context (never inside a string or comment).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub end: usize,
    pub kind: TokenKind,
}

impl Token {
    pub fn text<'t>(&self, text: &'t str) -> &'t str {
        &text[self.start..self.end]
    }

    pub fn is_punct(&self, byte: u8) -> bool {
        self.kind == TokenKind::Punct(byte)
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }
}

/// A code-context brace with the depth outside the pair it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BraceEvent {
    offset: usize,
    open: bool,
    outer_depth: i32,
}

/// Lexical tables for one source text.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    text: &'a str,
    regions: Vec<Region>,
    final_region: Region,
    strings: Vec<StringLiteral>,
    tokens: Vec<Token>,
    braces: Vec<BraceEvent>,
}

impl<'a> Scanner<'a> {
    /// Scan `text` from offset 0. Never fails; unterminated strings and
    /// comments simply stay open until the end of input.
    pub fn new(text: &'a str) -> Self {
        let (regions, final_region, strings) = classify(text.as_bytes());
        let (tokens, braces) = tokenize(text.as_bytes(), &regions);
        Self {
            text,
            regions,
            final_region,
            strings,
            tokens,
            braces,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Region of the byte at `offset`. Offsets at or past the end report
    /// the state the scanner finished in.
    pub fn region_at(&self, offset: usize) -> Region {
        self.regions
            .get(offset)
            .copied()
            .unwrap_or(self.final_region)
    }

    pub fn is_code(&self, offset: usize) -> bool {
        self.region_at(offset) == Region::Code
    }

    pub fn in_string(&self, offset: usize) -> bool {
        self.region_at(offset) == Region::String
    }

    pub fn in_comment(&self, offset: usize) -> bool {
        matches!(
            self.region_at(offset),
            Region::LineComment | Region::BlockComment
        )
    }

    pub fn strings(&self) -> &[StringLiteral] {
        &self.strings
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Index of the first token starting at or after `offset`.
    pub fn token_index_from(&self, offset: usize) -> usize {
        self.tokens.partition_point(|t| t.start < offset)
    }

    /// Index of the token starting exactly at `offset`.
    pub fn token_index_at(&self, offset: usize) -> Option<usize> {
        let idx = self.token_index_from(offset);
        self.tokens
            .get(idx)
            .filter(|t| t.start == offset)
            .map(|_| idx)
    }

    /// Number of code braces enclosing `offset`.
    pub fn depth_at(&self, offset: usize) -> i32 {
        let idx = self.braces.partition_point(|b| b.offset < offset);
        match idx.checked_sub(1).and_then(|i| self.braces.get(i)) {
            Some(ev) if ev.open => ev.outer_depth + 1,
            Some(ev) => ev.outer_depth,
            None => 0,
        }
    }

    /// Offset of the `}` matching the code `{` at `open`.
    pub fn match_brace(&self, open: usize) -> Option<usize> {
        let idx = self.braces.partition_point(|b| b.offset < open);
        let ev = self.braces.get(idx).filter(|b| b.offset == open && b.open)?;
        self.braces[idx + 1..]
            .iter()
            .find(|b| !b.open && b.outer_depth == ev.outer_depth)
            .map(|b| b.offset)
    }

    /// Token index of the closer matching the opener token at `open_idx`.
    /// Works for `()`, `[]`, and `<>` alike; only the given pair is counted.
    pub fn match_token(&self, open_idx: usize, open: u8, close: u8) -> Option<usize> {
        if !self.tokens.get(open_idx)?.is_punct(open) {
            return None;
        }
        let mut depth = 0usize;
        for (i, tok) in self.tokens.iter().enumerate().skip(open_idx) {
            if tok.is_punct(open) {
                depth += 1;
            } else if tok.is_punct(close) {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
        None
    }

    /// Token index of the opener matching the closer token at `close_idx`.
    pub fn match_token_back(&self, close_idx: usize, open: u8, close: u8) -> Option<usize> {
        if !self.tokens.get(close_idx)?.is_punct(close) {
            return None;
        }
        let mut depth = 0usize;
        for i in (0..=close_idx).rev() {
            let tok = &self.tokens[i];
            if tok.is_punct(close) {
                depth += 1;
            } else if tok.is_punct(open) {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
        None
    }

    /// Copy of `span` with comment bytes blanked to spaces (newlines kept).
    pub fn without_comments(&self, span: Span) -> String {
        let end = span.end.min(self.text.len());
        let start = span.start.min(end);
        let bytes: Vec<u8> = self.text.as_bytes()[start..end]
            .iter()
            .enumerate()
            .map(|(i, &b)| {
                let commented = matches!(
                    self.regions[start + i],
                    Region::LineComment | Region::BlockComment
                );
                if commented && b != b'\n' {
                    b' '
                } else {
                    b
                }
            })
            .collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

fn classify(bytes: &[u8]) -> (Vec<Region>, Region, Vec<StringLiteral>) {
    let n = bytes.len();
    let mut regions = vec![Region::Code; n];
    let mut strings = Vec::new();
    let mut state = Region::Code;
    let mut quote = b'\'';
    let mut string_start = 0;
    let mut i = 0;

    while i < n {
        let next = bytes.get(i + 1).copied();
        match state {
            Region::Code => match bytes[i] {
                b'/' if next == Some(b'/') => {
                    regions[i] = Region::LineComment;
                    regions[i + 1] = Region::LineComment;
                    state = Region::LineComment;
                    i += 2;
                }
                b'/' if next == Some(b'*') => {
                    regions[i] = Region::BlockComment;
                    regions[i + 1] = Region::BlockComment;
                    state = Region::BlockComment;
                    i += 2;
                }
                q @ (b'\'' | b'"') => {
                    regions[i] = Region::String;
                    state = Region::String;
                    quote = q;
                    string_start = i;
                    i += 1;
                }
                _ => i += 1,
            },
            Region::String => match bytes[i] {
                b'\\' => {
                    regions[i] = Region::String;
                    if i + 1 < n {
                        regions[i + 1] = Region::String;
                    }
                    i += 2;
                }
                // Apex literals cannot span lines; a stray quote must not
                // swallow the rest of the file.
                b'\n' => {
                    strings.push(StringLiteral {
                        span: Span::new(string_start, i),
                        quote,
                        terminated: false,
                    });
                    state = Region::Code;
                    i += 1;
                }
                b if b == quote => {
                    regions[i] = Region::String;
                    strings.push(StringLiteral {
                        span: Span::new(string_start, i + 1),
                        quote,
                        terminated: true,
                    });
                    state = Region::Code;
                    i += 1;
                }
                _ => {
                    regions[i] = Region::String;
                    i += 1;
                }
            },
            Region::LineComment => {
                if bytes[i] == b'\n' {
                    state = Region::Code;
                } else {
                    regions[i] = Region::LineComment;
                }
                i += 1;
            }
            Region::BlockComment => {
                regions[i] = Region::BlockComment;
                if bytes[i] == b'*' && next == Some(b'/') {
                    regions[i + 1] = Region::BlockComment;
                    state = Region::Code;
                    i += 2;
                } else {
                    i += 1;
                }
            }
        }
    }

    if state == Region::String {
        strings.push(StringLiteral {
            span: Span::new(string_start, n),
            quote,
            terminated: false,
        });
    }

    (regions, state, strings)
}

fn tokenize(bytes: &[u8], regions: &[Region]) -> (Vec<Token>, Vec<BraceEvent>) {
    let n = bytes.len();
    let mut tokens = Vec::new();
    let mut braces = Vec::new();
    let mut depth = 0i32;
    let mut i = 0;

    while i < n {
        if regions[i] != Region::Code {
            i += 1;
            continue;
        }
        let b = bytes[i];
        if is_ident_byte(b) {
            let start = i;
            while i < n && regions[i] == Region::Code && is_ident_byte(bytes[i]) {
                i += 1;
            }
            tokens.push(Token {
                start,
                end: i,
                kind: TokenKind::Word,
            });
            continue;
        }
        if !b.is_ascii_whitespace() && b.is_ascii() {
            tokens.push(Token {
                start: i,
                end: i + 1,
                kind: TokenKind::Punct(b),
            });
            match b {
                b'{' => {
                    braces.push(BraceEvent {
                        offset: i,
                        open: true,
                        outer_depth: depth,
                    });
                    depth += 1;
                }
                b'}' => {
                    depth -= 1;
                    braces.push(BraceEvent {
                        offset: i,
                        open: false,
                        outer_depth: depth,
                    });
                }
                _ => {}
            }
        }
        i += 1;
    }

    (tokens, braces)
}

pub(crate) fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_strings_and_comments() {
        let src = "a = 'x{'; // }\n/* { */ b";
        let s = Scanner::new(src);
        assert!(s.is_code(0));
        assert!(s.in_string(5));
        assert!(s.in_comment(11));
        assert!(s.in_comment(16));
        assert!(s.is_code(src.len() - 1));
        assert_eq!(s.strings().len(), 1);
        assert_eq!(s.strings()[0].content(src), "x{");
    }

    #[test]
    fn escaped_quote_does_not_close_string() {
        let src = r"s = 'it\'s // not a comment'; x";
        let s = Scanner::new(src);
        assert_eq!(s.strings().len(), 1);
        assert!(s.strings()[0].terminated);
        assert!(s.is_code(src.len() - 1));
    }

    #[test]
    fn comment_openers_inside_strings_are_ignored() {
        let src = "u = 'http://x/*y'; z";
        let s = Scanner::new(src);
        assert!(s.is_code(src.len() - 1));
    }

    #[test]
    fn unterminated_block_comment_stays_open() {
        let s = Scanner::new("a /* never closed");
        assert_eq!(s.region_at(1000), Region::BlockComment);
    }

    #[test]
    fn braces_in_strings_do_not_count() {
        let src = "void f() { s = '}'; if (x) { } }";
        let s = Scanner::new(src);
        let open = src.find('{').unwrap();
        assert_eq!(s.match_brace(open), Some(src.len() - 1));
        assert_eq!(s.depth_at(open + 1), 1);
    }

    #[test]
    fn unmatched_brace_returns_none() {
        let s = Scanner::new("void f() { if (x) {");
        assert_eq!(s.match_brace(9), None);
    }
}
