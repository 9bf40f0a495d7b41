//! Scanner: character classification and positions for one source text.

pub mod lexer;
pub mod position;

pub use lexer::{Region, Scanner, StringLiteral, Token, TokenKind};
pub use position::{LineIndex, Position, Range, Span};
