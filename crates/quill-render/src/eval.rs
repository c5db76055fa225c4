//! Expression evaluation.

use std::cmp::Ordering;

use quill_parser::ast::{CompareOp, ExprKind, Expression, FilterCall, Literal, PathSegment};

use crate::context::{Context, Scope};
use crate::error::RenderError;
use crate::filters::FilterRegistry;
use crate::value::Value;

/// Evaluates expressions against a context, the current scope and a filter
/// registry. Evaluation never mutates anything.
pub struct Evaluator<'a> {
    context: &'a Context,
    scope: &'a Scope,
    filters: &'a FilterRegistry,
}

impl<'a> Evaluator<'a> {
    pub fn new(context: &'a Context, scope: &'a Scope, filters: &'a FilterRegistry) -> Self {
        Self {
            context,
            scope,
            filters,
        }
    }

    pub fn eval(&self, expr: &Expression) -> Result<Value, RenderError> {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(literal(lit)),
            ExprKind::Path(segments) => self.resolve_path(segments),
            ExprKind::FilterChain { base, filters } => {
                let value = self.eval(base)?;
                self.apply_filters(value, filters)
            }
            ExprKind::Binary { left, op, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                compare(*op, &left, &right).map(Value::Bool)
            }
        }
    }

    /// Scope bindings shadow context variables. Missing keys, out-of-range
    /// indices and null intermediates all resolve to null.
    fn resolve_path(&self, segments: &[PathSegment]) -> Result<Value, RenderError> {
        let Some((first, rest)) = segments.split_first() else {
            return Ok(Value::Null);
        };
        let root = match first {
            PathSegment::Key(name) => self.scope.get(name).or_else(|| self.context.get(name)),
            PathSegment::Index(_) => None,
        };
        let Some(mut current) = root else {
            return Ok(Value::Null);
        };

        for (depth, segment) in rest.iter().enumerate() {
            let next = match (current, segment) {
                (Value::Null, _) => return Ok(Value::Null),
                (Value::Object(map), PathSegment::Key(key)) => map.get(key),
                (Value::Array(items), PathSegment::Index(index)) => items.get(*index),
                (other, segment) => {
                    return Err(RenderError::type_mismatch(format!(
                        "cannot read {} of {} '{}'",
                        describe_segment(segment),
                        other.type_name(),
                        display_path(&segments[..=depth])
                    )));
                }
            };
            match next {
                Some(value) => current = value,
                None => return Ok(Value::Null),
            }
        }
        Ok(current.clone())
    }

    fn apply_filters(&self, mut value: Value, calls: &[FilterCall]) -> Result<Value, RenderError> {
        for call in calls {
            let filter = self
                .filters
                .get(&call.name)
                .ok_or_else(|| RenderError::UnknownFilter {
                    name: call.name.clone(),
                })?;
            let args = call
                .args
                .iter()
                .map(|arg| self.eval(arg))
                .collect::<Result<Vec<_>, _>>()?;
            value = filter(&value, &args).map_err(|e| RenderError::from_filter(&call.name, e))?;
        }
        Ok(value)
    }
}

fn literal(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Boolean(b) => Value::Bool(*b),
        Literal::Number(n) => Value::Number(*n),
        Literal::String(s) => Value::String(s.clone()),
    }
}

/// `==`/`!=` never fail. Ordering needs two numbers (numeric strings count)
/// or two dates; NaN compares false.
pub fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool, RenderError> {
    let result = match op {
        CompareOp::Eq => left.loose_eq(right),
        CompareOp::Neq => !left.loose_eq(right),
        CompareOp::Lt => ordering(op, left, right)?.is_some_and(Ordering::is_lt),
        CompareOp::Gt => ordering(op, left, right)?.is_some_and(Ordering::is_gt),
        CompareOp::Lte => ordering(op, left, right)?.is_some_and(Ordering::is_le),
        CompareOp::Gte => ordering(op, left, right)?.is_some_and(Ordering::is_ge),
    };
    Ok(result)
}

fn ordering(op: CompareOp, left: &Value, right: &Value) -> Result<Option<Ordering>, RenderError> {
    if let (Value::Date(a), Value::Date(b)) = (left, right) {
        return Ok(Some(a.cmp(b)));
    }
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Ok(a.partial_cmp(&b)),
        _ => Err(RenderError::type_mismatch(format!(
            "cannot compare {} {} {}",
            left.type_name(),
            op.symbol(),
            right.type_name()
        ))),
    }
}

fn describe_segment(segment: &PathSegment) -> String {
    match segment {
        PathSegment::Key(key) => format!("key '{key}'"),
        PathSegment::Index(index) => format!("index {index}"),
    }
}

/// Reconstruct `a.b[0]` notation for error messages.
fn display_path(segments: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            PathSegment::Key(key) if out.is_empty() => out.push_str(key),
            PathSegment::Key(key) => {
                out.push('.');
                out.push_str(key);
            }
            PathSegment::Index(index) => out.push_str(&format!("[{index}]")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use quill_parser::expr_parser::ExprParser;

    fn context() -> Context {
        Context::from_json_str(
            r#"{
                "Order": {
                    "Id": "A-100",
                    "Items": [
                        {"Name": "Widget", "Price": 10, "Type": "Recurring"},
                        {"Name": "Gadget", "Price": 5.5, "Type": "OneTime"}
                    ],
                    "Note": null
                },
                "count": 3,
                "label": "12"
            }"#,
        )
        .unwrap()
    }

    fn eval_in(source: &str, scope: &Scope) -> Result<Value, RenderError> {
        let expr = ExprParser::parse_condition_source(source).unwrap();
        let ctx = context();
        let filters = FilterRegistry::new();
        Evaluator::new(&ctx, scope, &filters).eval(&expr)
    }

    fn eval(source: &str) -> Result<Value, RenderError> {
        eval_in(source, &Scope::new())
    }

    // =========================================================================
    // Paths
    // =========================================================================

    #[test]
    fn test_path_resolution() {
        assert_eq!(eval("Order.Id").unwrap(), Value::from("A-100"));
        assert_eq!(eval("Order.Items[1].Name").unwrap(), Value::from("Gadget"));
        assert_eq!(eval("Order[\"Id\"]").unwrap(), Value::from("A-100"));
    }

    #[test]
    fn test_missing_paths_are_null() {
        assert_eq!(eval("nope").unwrap(), Value::Null);
        assert_eq!(eval("nope.deeper.still").unwrap(), Value::Null);
        assert_eq!(eval("Order.Missing").unwrap(), Value::Null);
        assert_eq!(eval("Order.Note.Text").unwrap(), Value::Null);
        assert_eq!(eval("Order.Items[9].Name").unwrap(), Value::Null);
    }

    #[test]
    fn test_path_through_scalar_is_type_mismatch() {
        let err = eval("Order.Id.Length").unwrap_err();
        assert_eq!(
            err,
            RenderError::TypeMismatch {
                message: "cannot read key 'Length' of string 'Order.Id'".into()
            }
        );
        assert!(matches!(eval("Order.Items.Name"), Err(RenderError::TypeMismatch { .. })));
        assert!(matches!(eval("Order[0]"), Err(RenderError::TypeMismatch { .. })));
    }

    #[test]
    fn test_scope_shadows_context() {
        let mut scope = Scope::new();
        scope.set("count", Value::from(99));
        assert_eq!(eval_in("count", &scope).unwrap(), Value::from(99));
    }

    // =========================================================================
    // Filters
    // =========================================================================

    #[test]
    fn test_filter_chain() {
        assert_eq!(
            eval("Order.Items | map: \"Price\" | sum | money").unwrap(),
            Value::from("15.50")
        );
        assert_eq!(
            eval("Order.Items | where: \"Type\", \"Recurring\" | map: \"Name\"").unwrap(),
            Value::from(vec![Value::from("Widget")])
        );
        assert_eq!(eval("count | minus: 1 | times: 2").unwrap(), Value::Number(4.0));
    }

    #[test]
    fn test_filter_args_are_expressions() {
        assert_eq!(eval("count | minus: count").unwrap(), Value::Number(0.0));
    }

    #[test]
    fn test_unknown_filter() {
        assert_eq!(
            eval("count | shout").unwrap_err(),
            RenderError::UnknownFilter {
                name: "shout".into()
            }
        );
    }

    #[test]
    fn test_filter_errors_carry_filter_name() {
        assert_eq!(
            eval("count | minus").unwrap_err(),
            RenderError::ArgumentCount {
                filter: "minus".into(),
                expected: 1,
                got: 0
            }
        );
        assert!(matches!(
            eval("\"soon\" | date: \"%Y\""),
            Err(RenderError::Format { filter, .. }) if filter == "date"
        ));
    }

    // =========================================================================
    // Comparisons
    // =========================================================================

    #[test]
    fn test_equality() {
        assert_eq!(eval("Order.Id == \"A-100\"").unwrap(), Value::Bool(true));
        assert_eq!(eval("Order.Id != \"A-100\"").unwrap(), Value::Bool(false));
        assert_eq!(eval("Order.Note == nil").unwrap(), Value::Bool(true));
        assert_eq!(eval("nope == nil").unwrap(), Value::Bool(true));
        assert_eq!(eval("label == 12").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_ordering() {
        assert_eq!(eval("count > 2").unwrap(), Value::Bool(true));
        assert_eq!(eval("count <= 2").unwrap(), Value::Bool(false));
        assert_eq!(eval("label >= 12").unwrap(), Value::Bool(true));
        assert_eq!(eval("Order.Items | map: \"Price\" | sum < 20").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_ordering_type_mismatch() {
        assert!(matches!(eval("Order.Id > 1"), Err(RenderError::TypeMismatch { .. })));
        assert!(matches!(eval("nope < 1"), Err(RenderError::TypeMismatch { .. })));
    }

    #[test]
    fn test_compare_dates_and_nan() {
        let a = Value::from(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let b = Value::from(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert!(compare(CompareOp::Lt, &a, &b).unwrap());
        assert!(!compare(CompareOp::Gte, &a, &b).unwrap());
        let nan = Value::Number(f64::NAN);
        assert!(!compare(CompareOp::Lt, &nan, &Value::from(1)).unwrap());
        assert!(!compare(CompareOp::Gte, &nan, &Value::from(1)).unwrap());
    }
}
