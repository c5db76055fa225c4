//! Named filters applied through `|` in expressions.
//!
//! A filter takes the piped input and its evaluated arguments and returns a
//! new value. Built-ins live in the submodules; hosts add their own with
//! [`FilterRegistry::register`].

mod collection;
mod numeric;
mod text;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::FilterError;
use crate::value::Value;

pub use collection::{map, where_eq};
pub use numeric::{minus, money, sum, times};
pub use text::{date, upcase};

/// Signature every filter implements.
pub type FilterFn = dyn Fn(&Value, &[Value]) -> Result<Value, FilterError> + Send + Sync;

/// Name to implementation lookup. Cloning is cheap; implementations are
/// shared.
#[derive(Clone)]
pub struct FilterRegistry {
    filters: HashMap<String, Arc<FilterFn>>,
}

impl FilterRegistry {
    /// Registry preloaded with the built-in filters.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("money", money);
        registry.register("sum", sum);
        registry.register("minus", minus);
        registry.register("times", times);
        registry.register("upcase", upcase);
        registry.register("date", date);
        registry.register("where", where_eq);
        registry.register("map", map);
        registry
    }

    /// Registry with no filters at all.
    pub fn empty() -> Self {
        Self {
            filters: HashMap::new(),
        }
    }

    /// Add a filter, replacing any existing one with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(&Value, &[Value]) -> Result<Value, FilterError> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.filters.insert(name.clone(), Arc::new(filter)).is_some() {
            tracing::debug!(filter = %name, "replaced existing filter");
        }
    }

    pub fn get(&self, name: &str) -> Option<&FilterFn> {
        self.filters.get(name).map(|f| f.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.names())
            .finish()
    }
}

/// Fail with `ArgumentCount` unless exactly `expected` arguments were given.
pub(crate) fn expect_args(args: &[Value], expected: usize) -> Result<(), FilterError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(FilterError::ArgumentCount {
            expected,
            got: args.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtins_registered() {
        let registry = FilterRegistry::new();
        assert_eq!(
            registry.names(),
            vec!["date", "map", "minus", "money", "sum", "times", "upcase", "where"]
        );
        assert!(registry.contains("where"));
        assert!(!registry.contains("upper"));
        assert!(FilterRegistry::empty().names().is_empty());
    }

    #[test]
    fn test_register_and_call_custom() {
        let mut registry = FilterRegistry::empty();
        registry.register("shout", |input: &Value, _: &[Value]| {
            Ok(Value::from(format!("{input}!")))
        });
        let shout = registry.get("shout").unwrap();
        assert_eq!(shout(&Value::from("hi"), &[]).unwrap(), Value::from("hi!"));
        assert!(registry.contains("shout"));
        assert!(!registry.contains("money"));
        assert!(registry.get("money").is_none());
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = FilterRegistry::new();
        registry.register("upcase", |_: &Value, _: &[Value]| Ok(Value::from("replaced")));
        let upcase = registry.get("upcase").unwrap();
        assert_eq!(upcase(&Value::from("x"), &[]).unwrap(), Value::from("replaced"));
        assert_eq!(registry.names().len(), 8);
    }

    #[test]
    fn test_expect_args() {
        assert!(expect_args(&[], 0).is_ok());
        assert_eq!(
            expect_args(&[Value::Null], 2),
            Err(FilterError::ArgumentCount {
                expected: 2,
                got: 1
            })
        );
    }
}
