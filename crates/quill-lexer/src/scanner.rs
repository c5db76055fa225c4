use crate::token::{Span, Token, TokenKind};
use crate::token::{OUTPUT_CLOSE, STATEMENT_CLOSE};
use crate::{LexerError, LexerErrorKind};

/// Which delimiter pair opened the tag being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Output,
    Statement,
}

impl TagKind {
    fn closer(self) -> &'static str {
        match self {
            TagKind::Output => OUTPUT_CLOSE,
            TagKind::Statement => STATEMENT_CLOSE,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            TagKind::Output => "output tag",
            TagKind::Statement => "statement tag",
        }
    }
}

/// Template source scanner.
///
/// Walks the source once, alternating between literal text and tags.
/// Tokens cover the input without gaps: concatenating every text token with
/// its delimited tags reproduces the source exactly.
///
/// Tag contents are scanned quote-aware, so a closing delimiter inside a
/// string literal (`{{ "}}" }}`) does not end the tag.
pub struct Scanner<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    offset: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
            offset: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire source into a vector of tokens.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
        let mut scanner = Scanner::new(source);
        scanner.scan_tokens()?;
        Ok(scanner.tokens)
    }

    /// Scan all tokens from the source.
    fn scan_tokens(&mut self) -> Result<(), LexerError> {
        while !self.is_at_end() {
            match (self.peek(), self.peek_next()) {
                ('{', '{') => self.scan_tag(TagKind::Output)?,
                ('{', '%') => self.scan_tag(TagKind::Statement)?,
                _ => self.scan_text(),
            }
        }

        let span = Span::new(self.offset, self.offset, self.line, self.column);
        self.tokens.push(Token::new(TokenKind::Eof, span));
        Ok(())
    }

    // --- Scanners ---

    /// Scan literal text up to the next tag opener or end of input.
    fn scan_text(&mut self) {
        let start = self.offset;
        let start_line = self.line;
        let start_col = self.column;

        while !self.is_at_end() && !self.at_tag_open() {
            self.advance();
        }

        let text = &self.source[start..self.offset];
        let span = Span::new(start, self.offset, start_line, start_col);
        self.tokens
            .push(Token::new(TokenKind::Text(text.to_string()), span));
    }

    /// Scan a `{{ ... }}` or `{% ... %}` tag. Content is stored raw.
    fn scan_tag(&mut self, kind: TagKind) -> Result<(), LexerError> {
        let start = self.offset;
        let start_line = self.line;
        let start_col = self.column;

        // consume opener
        self.advance();
        self.advance();
        let content_start = self.offset;

        let closer: Vec<char> = kind.closer().chars().collect();
        let mut quote: Option<char> = None;

        loop {
            if self.is_at_end() {
                let detail = if quote.is_some() {
                    " (string literal left open)"
                } else {
                    ""
                };
                return Err(LexerError {
                    kind: LexerErrorKind::UnterminatedTag,
                    message: format!("Unterminated {}{detail}", kind.describe()),
                    line: start_line,
                    column: start_col,
                });
            }

            let ch = self.peek();
            match quote {
                Some(q) if ch == q => quote = None,
                Some(_) => {}
                None if ch == '"' || ch == '\'' => quote = Some(ch),
                None if ch == closer[0] && self.peek_next() == closer[1] => break,
                None => {}
            }
            self.advance();
        }

        let content = self.source[content_start..self.offset].to_string();

        // consume closer
        self.advance();
        self.advance();

        let span = Span::new(start, self.offset, start_line, start_col);
        let token_kind = match kind {
            TagKind::Output => TokenKind::Output(content),
            TagKind::Statement => TokenKind::Statement(content),
        };
        self.tokens.push(Token::new(token_kind, span));
        Ok(())
    }

    // --- Helpers ---

    fn at_tag_open(&self) -> bool {
        self.peek() == '{' && matches!(self.peek_next(), '{' | '%')
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.pos]
        }
    }

    fn peek_next(&self) -> char {
        if self.pos + 1 >= self.chars.len() {
            '\0'
        } else {
            self.chars[self.pos + 1]
        }
    }

    fn advance(&mut self) {
        if self.is_at_end() {
            return;
        }
        let ch = self.chars[self.pos];
        self.pos += 1;
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }
}
