//! Render inputs: the caller's read-only [`Context`] and the renderer's
//! mutable [`Scope`] of template-assigned variables.

use std::collections::HashMap;

use crate::error::ContextError;
use crate::value::{Map, Value};

/// Top-level variables supplied by the caller. Never mutated by rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    vars: Map,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object. Any other JSON value is rejected.
    pub fn from_json(json: serde_json::Value) -> Result<Self, ContextError> {
        match Value::from(json) {
            Value::Object(vars) => Ok(Self { vars }),
            other => Err(ContextError::NotAnObject(other.type_name())),
        }
    }

    pub fn from_json_str(source: &str) -> Result<Self, ContextError> {
        let json: serde_json::Value = serde_json::from_str(source)?;
        Self::from_json(json)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Variables bound during one render (`assign` targets and loop variables).
/// Shadows the context and is discarded when the render finishes.
#[derive(Debug, Default)]
pub struct Scope {
    vars: HashMap<String, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Bind `name`, returning the binding it replaced.
    pub fn set(&mut self, name: &str, value: Value) -> Option<Value> {
        self.vars.insert(name.to_string(), value)
    }

    /// Put back a binding captured earlier, or clear it if there was none.
    pub fn restore(&mut self, name: &str, previous: Option<Value>) {
        match previous {
            Some(value) => {
                self.vars.insert(name.to_string(), value);
            }
            None => {
                self.vars.remove(name);
            }
        }
    }
}
