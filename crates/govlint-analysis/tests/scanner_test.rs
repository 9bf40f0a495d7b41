//! Scanner: region classification, brace matching, and positions.

use govlint_analysis::scanner::{LineIndex, Position, Region, Scanner, Span, TokenKind};

#[test]
fn code_tokens_skip_strings_and_comments() {
    let src = "update x; // delete y;\nString s = 'insert z;';";
    let scanner = Scanner::new(src);
    let words: Vec<&str> = scanner
        .tokens()
        .iter()
        .filter(|t| t.kind == TokenKind::Word)
        .map(|t| t.text(src))
        .collect();
    assert_eq!(words, vec!["update", "x", "String", "s"]);
}

#[test]
fn double_quotes_delimit_strings_too() {
    let src = "a = \"{\"; b";
    let scanner = Scanner::new(src);
    assert_eq!(scanner.strings().len(), 1);
    assert_eq!(scanner.strings()[0].quote, b'"');
    assert_eq!(scanner.depth_at(src.len()), 0);
}

#[test]
fn string_does_not_cross_newline() {
    let src = "a = 'oops\nupdate x;";
    let scanner = Scanner::new(src);
    assert!(!scanner.strings()[0].terminated);
    assert!(scanner.is_code(src.find("update").unwrap()));
}

#[test]
fn nested_brace_matching() {
    let src = "class A {\n  void m() {\n    if (x) { }\n  }\n}";
    let scanner = Scanner::new(src);
    let outer = src.find('{').unwrap();
    assert_eq!(scanner.match_brace(outer), Some(src.len() - 1));
    let inner = src.find("if (x) {").unwrap() + "if (x) ".len();
    assert_eq!(scanner.depth_at(inner + 1), 3);
}

#[test]
fn match_brace_requires_a_code_brace() {
    let src = "s = '{'; { }";
    let scanner = Scanner::new(src);
    assert_eq!(scanner.match_brace(src.find('{').unwrap()), None);
    assert_eq!(scanner.match_brace(9), Some(11));
}

#[test]
fn without_comments_blanks_comment_text() {
    let src = "a; /* b */ c; // d\ne;";
    let scanner = Scanner::new(src);
    let cleaned = scanner.without_comments(Span::new(0, src.len()));
    assert_eq!(cleaned.len(), src.len());
    assert!(!cleaned.contains('b'));
    assert!(!cleaned.contains('d'));
    assert!(cleaned.contains("c;"));
    assert!(cleaned.ends_with("\ne;"));
}

#[test]
fn region_at_end_reports_final_state() {
    let scanner = Scanner::new("x // trailing");
    assert_eq!(scanner.region_at(usize::MAX), Region::LineComment);
    let scanner = Scanner::new("x;");
    assert_eq!(scanner.region_at(10), Region::Code);
}

#[test]
fn positions_are_zero_based_character_columns() {
    let src = "é = 1;\n  update x;";
    let lines = LineIndex::new(src);
    let offset = src.find("update").unwrap();
    assert_eq!(lines.position(offset), Position::new(1, 2));
    assert_eq!(lines.position(src.find('=').unwrap()), Position::new(0, 2));
    assert_eq!(lines.line_count(), 2);
    assert_eq!(lines.line_text(1), "  update x;");
}

#[test]
fn position_clamps_past_end() {
    let src = "a\nb";
    let lines = LineIndex::new(src);
    assert_eq!(lines.position(99), Position::new(1, 1));
}
