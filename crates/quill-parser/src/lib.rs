//! Quill Parser
//!
//! Parses a token stream from `quill-lexer` into a [`Template`] AST.
//! Includes both the document parser (text, output tags and block tags)
//! and the expression parser for tag contents (`Order.Items | map: "Price"`).
//!
//! ```
//! let template = quill_parser::parse("Hi {{ name | upcase }}").unwrap();
//! assert_eq!(template.nodes.len(), 2);
//! ```

pub mod ast;
pub mod expr_lexer;
pub mod expr_parser;
pub mod parser;

pub use ast::{Expression, Node, Template};
pub use parser::Parser;

/// What kind of malformation a [`ParseError`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// `{{` or `{%` without a closer.
    UnterminatedTag,
    /// A block closer without an opener, a mismatched closer, or a block left
    /// open at end of input.
    UnbalancedTag,
    /// Anything else: bad expression syntax, unknown tags, misplaced `else`.
    Syntax,
}

/// Parser error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<quill_lexer::LexerError> for ParseError {
    fn from(e: quill_lexer::LexerError) -> Self {
        let kind = match e.kind {
            quill_lexer::LexerErrorKind::UnterminatedTag => ParseErrorKind::UnterminatedTag,
        };
        ParseError {
            kind,
            message: e.message,
            line: e.line,
            column: e.column,
        }
    }
}

/// Parse template source into an immutable [`Template`].
pub fn parse(source: &str) -> Result<Template, ParseError> {
    Parser::parse(source)
}
