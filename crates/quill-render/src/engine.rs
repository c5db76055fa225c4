//! The host-facing entry point.

use std::sync::Arc;
use std::time::Instant;

use quill_parser::{ParseError, Template};
use serde::Deserialize;

use crate::cache::TemplateCache;
use crate::context::Context;
use crate::error::{Error, FilterError, RenderError};
use crate::filters::FilterRegistry;
use crate::render;
use crate::value::Value;

/// Engine configuration. Deserializable so hosts can load it from their own
/// config files; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineOptions {
    /// Maximum number of parsed templates kept. `0` disables the cache.
    pub cache_capacity: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { cache_capacity: 64 }
    }
}

/// Parses, caches and renders templates with one filter registry.
///
/// Configure filters first, then share the engine (`&Engine` or
/// `Arc<Engine>`) across threads: parsing and rendering take `&self`.
///
/// ```
/// use quill_render::{Context, Engine};
///
/// let engine = Engine::new();
/// let ctx = Context::new().with("total", 9);
/// let out = engine.render_source("Total: {{ total | money }}", &ctx).unwrap();
/// assert_eq!(out, "Total: 9.00");
/// ```
#[derive(Debug)]
pub struct Engine {
    filters: FilterRegistry,
    cache: TemplateCache,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            filters: FilterRegistry::new(),
            cache: TemplateCache::new(options.cache_capacity),
        }
    }

    /// Add or replace a filter.
    pub fn register_filter<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(&Value, &[Value]) -> Result<Value, FilterError> + Send + Sync + 'static,
    {
        self.filters.register(name, filter);
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    /// Parse `source`, reusing a cached template when the same source was
    /// parsed before.
    pub fn parse(&self, source: &str) -> Result<Arc<Template>, ParseError> {
        if let Some(template) = self.cache.get(source) {
            tracing::trace!(bytes = source.len(), "template cache hit");
            return Ok(template);
        }

        let started = Instant::now();
        let template = Arc::new(quill_parser::parse(source)?);
        tracing::debug!(
            bytes = source.len(),
            nodes = template.nodes.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "parsed template"
        );
        self.cache.insert(source, Arc::clone(&template));
        Ok(template)
    }

    pub fn render(&self, template: &Template, context: &Context) -> Result<String, RenderError> {
        let started = Instant::now();
        let output = render::render(template, context, &self.filters)?;
        tracing::debug!(
            bytes = output.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "rendered template"
        );
        Ok(output)
    }

    /// Parse (or fetch from cache) and render in one step. Failures are
    /// logged at `warn` before being returned.
    pub fn render_source(&self, source: &str, context: &Context) -> Result<String, Error> {
        let template = self.parse(source).inspect_err(|e| {
            tracing::warn!(error = %e, "template failed to parse");
        })?;
        let output = self.render(&template, context).inspect_err(|e| {
            tracing::warn!(error = %e, "template failed to render");
        })?;
        Ok(output)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
