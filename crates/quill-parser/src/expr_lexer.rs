//! Lexer for tag contents.
//!
//! Tokenizes the text between `{{ }}` and `{% %}` delimiters: identifiers,
//! literals, path punctuation, the filter pipe and comparison operators.
//! Statement keywords (`if`, `for`, `in`, ...) come out as identifiers; the
//! document parser decides what they mean by position.
//!
//! # Examples
//!
//! ```
//! use quill_parser::expr_lexer::{ExprLexer, TokenKind};
//!
//! let tokens = ExprLexer::tokenize("price | times: -1").unwrap();
//! assert_eq!(tokens[0].kind, TokenKind::Identifier);
//! assert_eq!(tokens[1].kind, TokenKind::Pipe);
//! assert_eq!(tokens[3].kind, TokenKind::Colon);
//! assert_eq!(tokens[4].kind, TokenKind::Number);
//! ```

use crate::ast::ExprSpan;

/// A token produced by the expression lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: ExprSpan,
    pub value: TokenValue,
}

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    Number,
    String,
    Boolean,
    Null,

    Identifier,

    // Comparison
    EqEq,
    NotEq,
    Lt,
    Gt,
    Lte,
    Gte,

    // Punctuation
    Assign,
    Dot,
    Comma,
    Colon,
    Pipe,
    LBracket,
    RBracket,

    // End of input
    Eof,
}

impl TokenKind {
    /// Human-readable name for error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Boolean => "boolean",
            TokenKind::Null => "nil",
            TokenKind::Identifier => "identifier",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::Lte => "'<='",
            TokenKind::Gte => "'>='",
            TokenKind::Assign => "'='",
            TokenKind::Dot => "'.'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Pipe => "'|'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Eof => "end of tag",
        }
    }
}

/// The value carried by a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    None,
    Number(f64),
    String(String),
    Boolean(bool),
    Identifier(String),
}

/// Expression lexer error.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprLexerError {
    pub message: String,
    pub span: ExprSpan,
}

impl std::fmt::Display for ExprLexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Expression lexer error at position {}: {}",
            self.span.start, self.message
        )
    }
}

impl std::error::Error for ExprLexerError {}

/// Tag content lexer.
///
/// Operates on the raw content of a single tag. Spans are byte offsets into
/// that content.
pub struct ExprLexer<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    offset: usize,
}

impl<'a> ExprLexer<'a> {
    /// Create a new expression lexer for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
            offset: 0,
        }
    }

    /// Tokenize the entire source into a vector of tokens.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, ExprLexerError> {
        let mut lexer = ExprLexer::new(source);
        let mut tokens = Vec::new();

        loop {
            let token = lexer.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    /// Read the next token from the source.
    pub fn next_token(&mut self) -> Result<Token, ExprLexerError> {
        self.skip_whitespace();

        if self.is_at_end() {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: ExprSpan::new(self.offset, self.offset),
                value: TokenValue::None,
            });
        }

        let start = self.offset;
        let ch = self.current();

        match ch {
            // Numbers, including a leading minus sign: `times: -1`
            '0'..='9' => self.read_number(start),
            '-' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.read_number(start),

            // Strings
            '\'' | '"' => self.read_string(start),

            // Identifiers and keywords
            'a'..='z' | 'A'..='Z' | '_' => self.read_identifier(start),

            // Two-character operators (check first)
            '=' if self.peek() == Some('=') => {
                self.advance_n(2);
                Ok(self.token(TokenKind::EqEq, start, TokenValue::None))
            }
            '!' if self.peek() == Some('=') => {
                self.advance_n(2);
                Ok(self.token(TokenKind::NotEq, start, TokenValue::None))
            }
            '<' if self.peek() == Some('=') => {
                self.advance_n(2);
                Ok(self.token(TokenKind::Lte, start, TokenValue::None))
            }
            '>' if self.peek() == Some('=') => {
                self.advance_n(2);
                Ok(self.token(TokenKind::Gte, start, TokenValue::None))
            }

            // Single-character tokens
            '<' => {
                self.advance();
                Ok(self.token(TokenKind::Lt, start, TokenValue::None))
            }
            '>' => {
                self.advance();
                Ok(self.token(TokenKind::Gt, start, TokenValue::None))
            }
            '=' => {
                self.advance();
                Ok(self.token(TokenKind::Assign, start, TokenValue::None))
            }
            '.' => {
                self.advance();
                Ok(self.token(TokenKind::Dot, start, TokenValue::None))
            }
            ',' => {
                self.advance();
                Ok(self.token(TokenKind::Comma, start, TokenValue::None))
            }
            ':' => {
                self.advance();
                Ok(self.token(TokenKind::Colon, start, TokenValue::None))
            }
            '|' => {
                self.advance();
                Ok(self.token(TokenKind::Pipe, start, TokenValue::None))
            }
            '[' => {
                self.advance();
                Ok(self.token(TokenKind::LBracket, start, TokenValue::None))
            }
            ']' => {
                self.advance();
                Ok(self.token(TokenKind::RBracket, start, TokenValue::None))
            }

            _ => Err(ExprLexerError {
                message: format!("Unexpected character: '{ch}'"),
                span: ExprSpan::new(start, start + ch.len_utf8()),
            }),
        }
    }

    // --- Private helpers ---

    fn read_number(&mut self, start: usize) -> Result<Token, ExprLexerError> {
        if self.current() == '-' {
            self.advance();
        }
        while !self.is_at_end() && (self.current().is_ascii_digit() || self.current() == '.') {
            self.advance();
        }

        let text = &self.source[start..self.offset];
        let value: f64 = text.parse().map_err(|_| ExprLexerError {
            message: format!("Invalid number: '{text}'"),
            span: ExprSpan::new(start, self.offset),
        })?;

        Ok(self.token(TokenKind::Number, start, TokenValue::Number(value)))
    }

    /// Strings have no escape sequences; the quote character ends them.
    fn read_string(&mut self, start: usize) -> Result<Token, ExprLexerError> {
        let quote = self.current();
        self.advance(); // skip opening quote

        let mut value = String::new();

        while !self.is_at_end() && self.current() != quote {
            value.push(self.current());
            self.advance();
        }

        if self.is_at_end() {
            return Err(ExprLexerError {
                message: "Unterminated string".into(),
                span: ExprSpan::new(start, self.offset),
            });
        }

        self.advance(); // skip closing quote

        Ok(self.token(TokenKind::String, start, TokenValue::String(value)))
    }

    fn read_identifier(&mut self, start: usize) -> Result<Token, ExprLexerError> {
        while !self.is_at_end() && (self.current().is_alphanumeric() || self.current() == '_') {
            self.advance();
        }

        let text = &self.source[start..self.offset];

        match text {
            "true" => Ok(self.token(TokenKind::Boolean, start, TokenValue::Boolean(true))),
            "false" => Ok(self.token(TokenKind::Boolean, start, TokenValue::Boolean(false))),
            "nil" | "null" => Ok(self.token(TokenKind::Null, start, TokenValue::None)),
            _ => Ok(self.token(
                TokenKind::Identifier,
                start,
                TokenValue::Identifier(text.to_string()),
            )),
        }
    }

    fn token(&self, kind: TokenKind, start: usize, value: TokenValue) -> Token {
        Token {
            kind,
            span: ExprSpan::new(start, self.offset),
            value,
        }
    }

    fn current(&self) -> char {
        self.chars[self.pos]
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.chars.get(self.pos) {
            self.offset += ch.len_utf8();
            self.pos += 1;
        }
    }

    fn advance_n(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current().is_whitespace() {
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<Token> {
        ExprLexer::tokenize(source).unwrap()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    // --- Basic tokens ---

    #[test]
    fn test_number() {
        let tokens = tokenize("42");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].value, TokenValue::Number(42.0));
    }

    #[test]
    fn test_float() {
        let tokens = tokenize("129.57");
        assert_eq!(tokens[0].value, TokenValue::Number(129.57));
    }

    #[test]
    fn test_negative_number() {
        let tokens = tokenize("-1");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].value, TokenValue::Number(-1.0));
        assert_eq!(tokens[0].span, ExprSpan::new(0, 2));
    }

    #[test]
    fn test_invalid_number() {
        let err = ExprLexer::tokenize("1.2.3").unwrap_err();
        assert!(err.message.contains("Invalid number"));
    }

    #[test]
    fn test_string_double_quotes() {
        let tokens = tokenize("\"%B %d, %Y\"");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].value, TokenValue::String("%B %d, %Y".into()));
    }

    #[test]
    fn test_string_single_quotes_keep_other_quote() {
        let tokens = tokenize("'Past \"Due\"'");
        assert_eq!(tokens[0].value, TokenValue::String("Past \"Due\"".into()));
    }

    #[test]
    fn test_unterminated_string() {
        let err = ExprLexer::tokenize("'abc").unwrap_err();
        assert_eq!(err.message, "Unterminated string");
        assert_eq!(err.span, ExprSpan::new(0, 4));
    }

    #[test]
    fn test_keywords_as_literals() {
        assert_eq!(
            kinds("true false nil null"),
            vec![
                TokenKind::Boolean,
                TokenKind::Boolean,
                TokenKind::Null,
                TokenKind::Null,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_statement_keywords_are_identifiers() {
        let tokens = tokenize("for item in items");
        assert!(tokens[..4]
            .iter()
            .all(|t| t.kind == TokenKind::Identifier));
        assert_eq!(tokens[0].value, TokenValue::Identifier("for".into()));
    }

    // --- Operators ---

    #[test]
    fn test_comparison_operators() {
        assert_eq!(
            kinds("== != < > <= >= ="),
            vec![
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Lte,
                TokenKind::Gte,
                TokenKind::Assign,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_path_with_index() {
        assert_eq!(
            kinds("Order.Items[0].Name"),
            vec![
                TokenKind::Identifier,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::LBracket,
                TokenKind::Number,
                TokenKind::RBracket,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_filter_chain() {
        assert_eq!(
            kinds("items | where: \"Type\", \"Recurring\" | map: 'Price'"),
            vec![
                TokenKind::Identifier,
                TokenKind::Pipe,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::String,
                TokenKind::Comma,
                TokenKind::String,
                TokenKind::Pipe,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::String,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_minus_without_digit_is_error() {
        let err = ExprLexer::tokenize("a - b").unwrap_err();
        assert!(err.message.contains("'-'"));
        assert_eq!(err.span, ExprSpan::new(2, 3));
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let tokens = tokenize("  \"é\" x");
        assert_eq!(tokens[0].span, ExprSpan::new(2, 6));
        assert_eq!(tokens[1].span, ExprSpan::new(7, 8));
    }

    #[test]
    fn test_whitespace_and_newlines_ignored() {
        assert_eq!(
            kinds("\n  a\t|\r\n b  "),
            vec![
                TokenKind::Identifier,
                TokenKind::Pipe,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }
}
