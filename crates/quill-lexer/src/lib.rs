//! Quill Lexer
//!
//! Splits template source into a flat stream of tokens: literal text runs,
//! `{{ expression }}` output tags and `{% statement %}` tags. Tag contents are
//! kept raw; the parser tokenizes them further.
//!
//! # Example
//!
//! ```
//! use quill_lexer::{Scanner, TokenKind};
//!
//! let tokens = Scanner::tokenize("Hi {{ name }}!").unwrap();
//! assert_eq!(tokens[0].kind, TokenKind::Text("Hi ".into()));
//! assert_eq!(tokens[1].kind, TokenKind::Output(" name ".into()));
//! assert_eq!(tokens.len(), 4); // text, output, text, EOF
//! ```

pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::{Span, Token, TokenKind};

/// What went wrong while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerErrorKind {
    /// An opening `{{` or `{%` has no matching closer.
    UnterminatedTag,
}

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Lexer error at line {line}, column {column}: {message}")]
pub struct LexerError {
    pub kind: LexerErrorKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
}
