//! Document parser for Quill templates.
//!
//! Parses the token stream from `quill-lexer` into a `Template` AST.
//! Output tags are handed to `expr_parser`; statement tags are dispatched on
//! their leading keyword and nested by recursive descent. Each block parser
//! collects bodies until it meets its own continuation or closing tag, so a
//! closer that reaches the wrong block (or no block) is reported as unbalanced.

use crate::ast::{Assign, Branch, Expression, ForLoop, IfBlock, Node, Template};
use crate::expr_lexer::TokenKind as ExprTokenKind;
use crate::expr_parser::{ExprParseError, ExprParser};
use crate::{ParseError, ParseErrorKind};
use quill_lexer::{Token, TokenKind};

/// A statement tag that has been split into its keyword and the parser
/// positioned over the remaining arguments.
struct Statement {
    keyword: String,
    args: ExprParser,
    token: Token,
}

impl Statement {
    /// Map an expression error inside this tag to a template position.
    fn error(&self, e: ExprParseError) -> ParseError {
        expr_error(&self.token, e)
    }

    /// The tag takes no (further) arguments.
    fn finish(&self) -> Result<(), ParseError> {
        self.args.expect_end().map_err(|e| self.error(e))
    }

    fn condition(&mut self) -> Result<Expression, ParseError> {
        let expr = self.args.parse_condition().map_err(|e| self.error(e))?;
        self.finish()?;
        Ok(expr)
    }
}

/// Body collected so far inside an `if` block: either a conditional branch
/// or the trailing `else`.
enum Pending {
    Branch(Expression),
    Else,
}

/// Template document parser.
///
/// Converts a flat token stream from the scanner into a hierarchical
/// `Template` AST using recursive descent.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a new parser for the given tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse source text into a template AST.
    pub fn parse(source: &str) -> Result<Template, ParseError> {
        let tokens = quill_lexer::Scanner::tokenize(source)?;

        let mut parser = Parser::new(tokens);
        parser.parse_template()
    }

    /// Parse a full template.
    fn parse_template(&mut self) -> Result<Template, ParseError> {
        let (nodes, stop) = self.parse_body()?;

        match stop {
            None => Ok(Template { nodes }),
            Some(stmt) => Err(unbalanced(
                &stmt.token,
                format!("'{}' without matching {}", stmt.keyword, opener_for(&stmt.keyword)),
            )),
        }
    }

    /// Parse nodes until end of input or a tag that continues or closes an
    /// enclosing block. That tag is returned for the caller to judge.
    fn parse_body(&mut self) -> Result<(Vec<Node>, Option<Statement>), ParseError> {
        let mut nodes = Vec::new();

        loop {
            let token = self.peek().clone();
            self.advance();

            match token.kind {
                TokenKind::Eof => return Ok((nodes, None)),
                TokenKind::Text(text) => nodes.push(Node::Text(text)),
                TokenKind::Output(ref content) => {
                    let expr = ExprParser::parse(content).map_err(|e| expr_error(&token, e))?;
                    nodes.push(Node::Output(expr));
                }
                TokenKind::Statement(_) => {
                    let stmt = self.statement(token)?;
                    match stmt.keyword.as_str() {
                        "if" => nodes.push(self.parse_if(stmt)?),
                        "for" => nodes.push(self.parse_for(stmt)?),
                        "assign" => nodes.push(Self::parse_assign(stmt)?),
                        "elsif" | "else" | "endif" | "endfor" => {
                            return Ok((nodes, Some(stmt)));
                        }
                        other => {
                            return Err(syntax(&stmt.token, format!("Unknown tag '{other}'")));
                        }
                    }
                }
            }
        }
    }

    // =========================================================================
    // Block tags
    // =========================================================================

    /// Parse an `if` block:
    /// ```text
    /// {% if a == 1 %}…{% elsif b %}…{% else %}…{% endif %}
    /// ```
    fn parse_if(&mut self, mut open: Statement) -> Result<Node, ParseError> {
        let mut pending = Pending::Branch(open.condition()?);
        let mut branches = Vec::new();
        let mut otherwise = None;

        loop {
            let (body, stop) = self.parse_body()?;
            let Some(mut stmt) = stop else {
                return Err(unbalanced(
                    &open.token,
                    "'if' is never closed with 'endif'".into(),
                ));
            };

            match pending {
                Pending::Branch(condition) => branches.push(Branch { condition, body }),
                Pending::Else => otherwise = Some(body),
            }

            let seen_else = otherwise.is_some();
            match stmt.keyword.as_str() {
                "elsif" if seen_else => {
                    return Err(syntax(&stmt.token, "'elsif' after 'else'".into()));
                }
                "elsif" => pending = Pending::Branch(stmt.condition()?),
                "else" if seen_else => {
                    return Err(syntax(&stmt.token, "Duplicate 'else' in 'if' block".into()));
                }
                "else" => {
                    stmt.finish()?;
                    pending = Pending::Else;
                }
                "endif" => {
                    stmt.finish()?;
                    return Ok(Node::If(IfBlock {
                        branches,
                        otherwise,
                    }));
                }
                other => {
                    return Err(unbalanced(
                        &stmt.token,
                        format!(
                            "Expected 'endif' to close 'if' at line {}, found '{other}'",
                            open.token.span.line
                        ),
                    ));
                }
            }
        }
    }

    /// Parse a `for` loop:
    /// ```text
    /// {% for item in Order.Items %}…{% endfor %}
    /// ```
    fn parse_for(&mut self, mut open: Statement) -> Result<Node, ParseError> {
        let (variable, _) = open
            .args
            .expect_identifier("loop variable name")
            .map_err(|e| open.error(e))?;
        open.args.expect_keyword("in").map_err(|e| open.error(e))?;
        let source = open.args.parse_filtered().map_err(|e| open.error(e))?;
        open.finish()?;

        let (body, stop) = self.parse_body()?;
        let Some(stmt) = stop else {
            return Err(unbalanced(
                &open.token,
                "'for' is never closed with 'endfor'".into(),
            ));
        };

        if stmt.keyword != "endfor" {
            return Err(unbalanced(
                &stmt.token,
                format!("'{}' without matching 'if' inside 'for'", stmt.keyword),
            ));
        }
        stmt.finish()?;

        Ok(Node::For(ForLoop {
            variable,
            source,
            body,
        }))
    }

    /// Parse `{% assign name = expr %}`.
    fn parse_assign(mut stmt: Statement) -> Result<Node, ParseError> {
        let (name, _) = stmt
            .args
            .expect_identifier("variable name")
            .map_err(|e| stmt.error(e))?;
        stmt.args
            .expect(ExprTokenKind::Assign)
            .map_err(|e| stmt.error(e))?;
        let value = stmt.args.parse_filtered().map_err(|e| stmt.error(e))?;
        stmt.finish()?;

        Ok(Node::Assign(Assign { name, value }))
    }

    // =========================================================================
    // Token navigation helpers
    // =========================================================================

    /// Split a statement tag into keyword and argument parser.
    fn statement(&self, token: Token) -> Result<Statement, ParseError> {
        let content = token.tag_content().unwrap_or_default();
        let mut args = ExprParser::from_source(content).map_err(|e| expr_error(&token, e))?;

        if args.is_at_end() {
            return Err(syntax(&token, "Empty statement tag".into()));
        }
        let (keyword, _) = args
            .expect_identifier("tag name")
            .map_err(|e| expr_error(&token, e))?;

        Ok(Statement {
            keyword,
            args,
            token,
        })
    }

    fn peek(&self) -> &Token {
        // The scanner always terminates the stream with Eof.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }
}

/// Which opener a stray continuation or closing tag was missing.
fn opener_for(keyword: &str) -> &'static str {
    match keyword {
        "endfor" => "'for'",
        _ => "'if'",
    }
}

fn expr_error(token: &Token, e: ExprParseError) -> ParseError {
    let content = token.tag_content().unwrap_or_default();
    let (line, column) = token.span.locate(content, e.span.start);
    ParseError {
        kind: ParseErrorKind::Syntax,
        message: e.message,
        line,
        column,
    }
}

fn syntax(token: &Token, message: String) -> ParseError {
    ParseError {
        kind: ParseErrorKind::Syntax,
        message,
        line: token.span.line,
        column: token.span.column,
    }
}

fn unbalanced(token: &Token, message: String) -> ParseError {
    ParseError {
        kind: ParseErrorKind::UnbalancedTag,
        message,
        line: token.span.line,
        column: token.span.column,
    }
}
