use quill_parser::ParseError;
use thiserror::Error;

/// Failure reported by a filter implementation.
///
/// The renderer attaches the filter name and converts this into a
/// [`RenderError`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("{0}")]
    TypeMismatch(String),

    #[error("{0}")]
    Format(String),

    #[error("expected {expected} argument(s), got {got}")]
    ArgumentCount { expected: usize, got: usize },
}

/// Rendering failure. Aborts the whole render; no partial output escapes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("Unknown filter '{name}'")]
    UnknownFilter { name: String },

    #[error("Type mismatch: {message}")]
    TypeMismatch { message: String },

    #[error("Format error in filter '{filter}': {message}")]
    Format { filter: String, message: String },

    #[error("Filter '{filter}' expects {expected} argument(s), got {got}")]
    ArgumentCount {
        filter: String,
        expected: usize,
        got: usize,
    },
}

impl RenderError {
    pub(crate) fn type_mismatch(message: impl Into<String>) -> Self {
        RenderError::TypeMismatch {
            message: message.into(),
        }
    }

    pub(crate) fn from_filter(filter: &str, err: FilterError) -> Self {
        match err {
            FilterError::TypeMismatch(message) => RenderError::TypeMismatch {
                message: format!("{filter}: {message}"),
            },
            FilterError::Format(message) => RenderError::Format {
                filter: filter.to_string(),
                message,
            },
            FilterError::ArgumentCount { expected, got } => RenderError::ArgumentCount {
                filter: filter.to_string(),
                expected,
                got,
            },
        }
    }
}

/// Error building a [`Context`](crate::Context) from JSON.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Invalid context JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Context must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Any failure of the parse-and-render pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl Error {
    /// Message safe to show to whoever requested the document. The detailed
    /// error goes to the log, never to the caller.
    pub fn public_message(&self) -> &'static str {
        "Error rendering template."
    }
}
