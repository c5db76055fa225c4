//! Abstract Syntax Tree for Quill templates.
//!
//! Contains both document-level nodes (text, output, blocks) and
//! expression-level nodes (paths, literals, filter chains, comparisons).

// ---------------------------------------------------------------------------
// Document-level AST
// ---------------------------------------------------------------------------

/// A parsed template. Nodes render in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub nodes: Vec<Node>,
}

/// A node in the template body.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text, emitted verbatim.
    Text(String),

    /// `{{ expression }}`
    Output(Expression),

    /// `{% if %}` … `{% elsif %}` … `{% else %}` … `{% endif %}`
    If(IfBlock),

    /// `{% for var in expr %}` … `{% endfor %}`
    For(ForLoop),

    /// `{% assign name = expr %}`
    Assign(Assign),
}

/// A conditional block with at least one branch.
#[derive(Debug, Clone, PartialEq)]
pub struct IfBlock {
    /// The `if` branch followed by every `elsif`, in source order.
    pub branches: Vec<Branch>,
    /// The `else` body, if present.
    pub otherwise: Option<Vec<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub condition: Expression,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    pub variable: String,
    pub source: Expression,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub name: String,
    pub value: Expression,
}

// ---------------------------------------------------------------------------
// Expression-level AST
// ---------------------------------------------------------------------------

/// A position in tag content (relative to the content string, not the
/// template). Named `ExprSpan` to distinguish from `quill_lexer::Span`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExprSpan {
    pub start: usize,
    pub end: usize,
}

impl ExprSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both.
    pub fn to(self, other: ExprSpan) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A complete expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExprKind,
    pub span: ExprSpan,
}

impl Expression {
    pub fn new(kind: ExprKind, span: ExprSpan) -> Self {
        Self { kind, span }
    }
}

/// Expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// `42`, `-1`, `"Recurring"`, `true`, `nil`
    Literal(Literal),

    /// Variable lookup: `Order.Items[0].Name`
    Path(Vec<PathSegment>),

    /// `base | f1: a, b | f2`, applied left to right.
    FilterChain {
        base: Box<Expression>,
        filters: Vec<FilterCall>,
    },

    /// Single comparison, only produced inside `if`/`elsif` conditions.
    Binary {
        left: Box<Expression>,
        op: CompareOp,
        right: Box<Expression>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
}

/// One step of a variable path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// `.name` or `["name"]`
    Key(String),
    /// `[0]`
    Index(usize),
}

/// A filter application inside a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCall {
    pub name: String,
    pub args: Vec<Expression>,
    pub span: ExprSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Neq => "!=",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Lte => "<=",
            CompareOp::Gte => ">=",
        }
    }
}
