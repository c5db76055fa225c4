//! Array filters. Both treat a null input as an empty array.

use super::expect_args;
use crate::error::FilterError;
use crate::value::Value;

fn items<'v>(filter: &str, input: &'v Value) -> Result<&'v [Value], FilterError> {
    match input {
        Value::Null => Ok(&[]),
        Value::Array(items) => Ok(items),
        other => Err(FilterError::TypeMismatch(format!(
            "{filter} expects an array, got {}",
            other.type_name()
        ))),
    }
}

fn field_name(arg: &Value) -> String {
    match arg {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Keep the elements whose `field` equals `value`, in order:
/// `{{ items | where: "Type", "Recurring" }}`. Non-object elements never
/// match.
pub fn where_eq(input: &Value, args: &[Value]) -> Result<Value, FilterError> {
    expect_args(args, 2)?;
    let field = field_name(&args[0]);
    let target = &args[1];
    let kept = items("where", input)?
        .iter()
        .filter(|item| item.get(&field).is_some_and(|v| v.loose_eq(target)))
        .cloned()
        .collect();
    Ok(Value::Array(kept))
}

/// Project each element to its `field`; missing fields and non-object
/// elements map to null. Output length always equals input length.
pub fn map(input: &Value, args: &[Value]) -> Result<Value, FilterError> {
    expect_args(args, 1)?;
    let field = field_name(&args[0]);
    let projected = items("map", input)?
        .iter()
        .map(|item| item.get(&field).cloned().unwrap_or_default())
        .collect();
    Ok(Value::Array(projected))
}
