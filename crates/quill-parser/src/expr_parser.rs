//! Expression parser for tag contents.
//!
//! Parses expression token streams (from `expr_lexer`) into `Expression`
//! AST nodes. The grammar is deliberately small:
//!
//! ```text
//! condition := filtered (cmp_op filtered)?
//! filtered  := primary ('|' ident (':' primary (',' primary)*)?)*
//! primary   := literal | path
//! path      := ident ('.' ident | '[' integer ']' | '[' string ']')*
//! ```
//!
//! The document parser drives the same `ExprParser` over whole statement
//! tags, consuming keywords (`for`, `in`, `assign`, `=`) with the `expect_*`
//! helpers before handing over to `parse_filtered` or `parse_condition`.

use crate::ast::{CompareOp, ExprKind, ExprSpan, Expression, FilterCall, Literal, PathSegment};
use crate::expr_lexer::{ExprLexer, ExprLexerError, Token, TokenKind, TokenValue};

/// Expression parse error, positioned relative to the tag content.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} (at offset {})", span.start)]
pub struct ExprParseError {
    pub message: String,
    pub span: ExprSpan,
}

impl From<ExprLexerError> for ExprParseError {
    fn from(e: ExprLexerError) -> Self {
        Self {
            message: e.message,
            span: e.span,
        }
    }
}

/// Tag content parser.
///
/// Converts a flat token stream into `Expression` nodes using recursive
/// descent. The token stream always ends with `Eof`.
pub struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    /// Create a new expression parser for the given tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Tokenize `source` and create a parser over it.
    pub fn from_source(source: &str) -> Result<Self, ExprParseError> {
        Ok(Self::new(ExprLexer::tokenize(source)?))
    }

    /// Parse a complete filtered expression (no comparison) from a source
    /// string, as found in `{{ }}` tags.
    pub fn parse(source: &str) -> Result<Expression, ExprParseError> {
        let mut parser = Self::from_source(source)?;
        let expr = parser.parse_filtered()?;
        parser.expect_end()?;
        Ok(expr)
    }

    /// Parse a complete `if` condition from a source string.
    pub fn parse_condition_source(source: &str) -> Result<Expression, ExprParseError> {
        let mut parser = Self::from_source(source)?;
        let expr = parser.parse_condition()?;
        parser.expect_end()?;
        Ok(expr)
    }

    // =========================================================================
    // Grammar
    // =========================================================================

    /// `filtered (cmp_op filtered)?`
    pub fn parse_condition(&mut self) -> Result<Expression, ExprParseError> {
        let left = self.parse_filtered()?;

        let Some(op) = compare_op(self.peek().kind) else {
            return Ok(left);
        };
        self.advance();

        let right = self.parse_filtered()?;

        if compare_op(self.peek().kind).is_some() {
            return Err(self.error("Only one comparison is allowed per condition".into()));
        }

        let span = left.span.to(right.span);
        Ok(Expression::new(
            ExprKind::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            span,
        ))
    }

    /// `primary ('|' filter)*`
    pub fn parse_filtered(&mut self) -> Result<Expression, ExprParseError> {
        let base = self.parse_primary()?;
        let mut filters = Vec::new();

        while self.peek().kind == TokenKind::Pipe {
            self.advance(); // consume |

            if self.peek().kind != TokenKind::Identifier {
                return Err(self.error(format!(
                    "Expected filter name after '|', found {}",
                    self.peek().kind.describe()
                )));
            }
            let (name, name_span) = self.expect_identifier("filter name")?;

            let mut args = Vec::new();
            if self.peek().kind == TokenKind::Colon {
                self.advance(); // consume :
                loop {
                    args.push(self.parse_primary()?);
                    if self.peek().kind != TokenKind::Comma {
                        break;
                    }
                    self.advance(); // consume ,
                }
            }

            let span = args
                .last()
                .map_or(name_span, |last: &Expression| name_span.to(last.span));
            filters.push(FilterCall { name, args, span });
        }

        let Some(last) = filters.last() else {
            return Ok(base);
        };
        let span = base.span.to(last.span);
        Ok(Expression::new(
            ExprKind::FilterChain {
                base: Box::new(base),
                filters,
            },
            span,
        ))
    }

    /// A literal or a variable path.
    pub fn parse_primary(&mut self) -> Result<Expression, ExprParseError> {
        let token = self.peek().clone();
        let literal = match (&token.kind, &token.value) {
            (TokenKind::Number, TokenValue::Number(n)) => Literal::Number(*n),
            (TokenKind::String, TokenValue::String(s)) => Literal::String(s.clone()),
            (TokenKind::Boolean, TokenValue::Boolean(b)) => Literal::Boolean(*b),
            (TokenKind::Null, _) => Literal::Null,
            (TokenKind::Identifier, _) => return self.parse_path(),
            _ => {
                return Err(self.error(format!(
                    "Expected a value, found {}",
                    token.kind.describe()
                )))
            }
        };
        self.advance();
        Ok(Expression::new(ExprKind::Literal(literal), token.span))
    }

    /// `ident ('.' ident | '[' index ']')*`
    fn parse_path(&mut self) -> Result<Expression, ExprParseError> {
        let (first, start_span) = self.expect_identifier("variable name")?;
        let mut segments = vec![PathSegment::Key(first)];
        let mut span = start_span;

        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.advance(); // consume .
                    let (key, key_span) = self.expect_identifier("property name after '.'")?;
                    segments.push(PathSegment::Key(key));
                    span = span.to(key_span);
                }
                TokenKind::LBracket => {
                    self.advance(); // consume [
                    let token = self.peek().clone();
                    let segment = match token.value {
                        TokenValue::Number(n) if n >= 0.0 && n.fract() == 0.0 => {
                            PathSegment::Index(n as usize)
                        }
                        TokenValue::String(key) => PathSegment::Key(key),
                        _ => {
                            return Err(self.error(format!(
                                "Expected a non-negative integer index or string key, found {}",
                                token.kind.describe()
                            )))
                        }
                    };
                    self.advance();
                    let close = self.expect(TokenKind::RBracket)?;
                    segments.push(segment);
                    span = span.to(close.span);
                }
                _ => break,
            }
        }

        Ok(Expression::new(ExprKind::Path(segments), span))
    }

    // =========================================================================
    // Token navigation helpers
    // =========================================================================

    pub fn peek(&self) -> &Token {
        // The lexer always terminates the stream with Eof and `advance` never
        // moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// Consume a token of the given kind or fail.
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token, ExprParseError> {
        let token = self.peek().clone();
        if token.kind != kind {
            return Err(self.error(format!(
                "Expected {}, found {}",
                kind.describe(),
                token.kind.describe()
            )));
        }
        self.advance();
        Ok(token)
    }

    /// Consume an identifier, returning its text and span.
    pub fn expect_identifier(&mut self, what: &str) -> Result<(String, ExprSpan), ExprParseError> {
        let token = self.peek().clone();
        match token.value {
            TokenValue::Identifier(name) if token.kind == TokenKind::Identifier => {
                self.advance();
                Ok((name, token.span))
            }
            _ => Err(self.error(format!(
                "Expected {what}, found {}",
                token.kind.describe()
            ))),
        }
    }

    /// Consume the identifier `keyword` or fail.
    pub fn expect_keyword(&mut self, keyword: &str) -> Result<(), ExprParseError> {
        match &self.peek().value {
            TokenValue::Identifier(name) if name == keyword => {
                self.advance();
                Ok(())
            }
            _ => Err(self.error(format!(
                "Expected '{keyword}', found {}",
                self.peek().kind.describe()
            ))),
        }
    }

    /// Fail unless every token has been consumed.
    pub fn expect_end(&self) -> Result<(), ExprParseError> {
        let token = self.peek();
        match (&token.kind, &token.value) {
            (TokenKind::Eof, _) => Ok(()),
            (kind, _) if compare_op(*kind).is_some() => Err(self.error(
                "Comparison operators are only allowed in if/elsif conditions".into(),
            )),
            (_, TokenValue::Identifier(word)) if word == "and" || word == "or" => Err(
                self.error(format!("Boolean operator '{word}' is not supported")),
            ),
            (kind, _) => Err(self.error(format!("Unexpected {}", kind.describe()))),
        }
    }

    fn error(&self, message: String) -> ExprParseError {
        ExprParseError {
            message,
            span: self.peek().span,
        }
    }
}

fn compare_op(kind: TokenKind) -> Option<CompareOp> {
    match kind {
        TokenKind::EqEq => Some(CompareOp::Eq),
        TokenKind::NotEq => Some(CompareOp::Neq),
        TokenKind::Lt => Some(CompareOp::Lt),
        TokenKind::Gt => Some(CompareOp::Gt),
        TokenKind::Lte => Some(CompareOp::Lte),
        TokenKind::Gte => Some(CompareOp::Gte),
        _ => None,
    }
}
