//! Quill Render
//!
//! Evaluates parsed templates against a data context. Provides the runtime
//! [`Value`] model, the [`FilterRegistry`] with the built-in filters, and the
//! [`Engine`] that ties parsing, caching and rendering together.
//!
//! ```
//! use quill_render::{Context, Engine};
//!
//! let engine = Engine::new();
//! let ctx = Context::from_json_str(r#"{"Items": [{"Price": 2}, {"Price": 3.5}]}"#).unwrap();
//! let out = engine
//!     .render_source("Sum: {{ Items | map: \"Price\" | sum | money }}", &ctx)
//!     .unwrap();
//! assert_eq!(out, "Sum: 5.50");
//! ```

pub mod cache;
pub mod context;
pub mod engine;
pub mod error;
pub mod eval;
pub mod filters;
pub mod render;
pub mod value;

pub use cache::TemplateCache;
pub use context::{Context, Scope};
pub use engine::{Engine, EngineOptions};
pub use error::{ContextError, Error, FilterError, RenderError};
pub use filters::FilterRegistry;
pub use quill_parser::{parse, ParseError, Template};
pub use render::render;
pub use value::{Map, Value};
