/// A position in source text, tracking line and column for error reporting.
///
/// `start` and `end` are byte offsets into the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Line and column of byte `offset` inside the content of the tag this
    /// span covers. Tag content starts right after the two-byte delimiter.
    pub fn locate(&self, content: &str, offset: usize) -> (usize, usize) {
        let mut line = self.line;
        let mut column = self.column + 2;

        for (idx, ch) in content.char_indices() {
            if idx >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }

        (line, column)
    }
}

/// Token classification for template source.
///
/// Tag variants carry the raw text between their delimiters, untrimmed, so
/// offsets into it line up with the source.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Literal text outside any tag, preserved exactly.
    Text(String),
    /// `{{ ... }}`
    Output(String),
    /// `{% ... %}`
    Statement(String),
    Eof,
}

/// A token produced by the template scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Raw tag content, or `None` for text and EOF tokens.
    pub fn tag_content(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Output(content) | TokenKind::Statement(content) => Some(content),
            _ => None,
        }
    }
}

pub const OUTPUT_OPEN: &str = "{{";
pub const OUTPUT_CLOSE: &str = "}}";
pub const STATEMENT_OPEN: &str = "{%";
pub const STATEMENT_CLOSE: &str = "%}";
