//! String and date formatting filters.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};

use super::expect_args;
use crate::error::FilterError;
use crate::value::Value;

/// Uppercase a string. Other values pass through untouched.
pub fn upcase(input: &Value, args: &[Value]) -> Result<Value, FilterError> {
    expect_args(args, 0)?;
    Ok(match input {
        Value::String(s) => Value::String(s.to_uppercase()),
        other => other.clone(),
    })
}

/// Format a date with a strftime-style pattern: `{{ d | date: "%b %d, %Y" }}`.
///
/// Accepts date values, ISO-8601 strings (`YYYY-MM-DD`, with an optional
/// `T` or space separated time, or full RFC 3339), the words `now` and
/// `today`, and numbers as unix seconds.
pub fn date(input: &Value, args: &[Value]) -> Result<Value, FilterError> {
    expect_args(args, 1)?;
    let pattern = args[0].as_str().ok_or_else(|| {
        FilterError::TypeMismatch(format!(
            "format must be a string, got {}",
            args[0].type_name()
        ))
    })?;

    let datetime = to_datetime(input).ok_or_else(|| {
        FilterError::Format(format!("cannot interpret {} '{input}' as a date", input.type_name()))
    })?;

    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(FilterError::Format(format!("invalid date pattern '{pattern}'")));
    }

    let mut out = String::new();
    write!(out, "{}", datetime.format_with_items(items.iter())).map_err(|_| {
        FilterError::Format(format!("pattern '{pattern}' needs a timezone"))
    })?;
    Ok(Value::String(out))
}

fn to_datetime(input: &Value) -> Option<NaiveDateTime> {
    match input {
        Value::Date(d) => Some(*d),
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) if n.is_finite() => {
            DateTime::from_timestamp(*n as i64, 0).map(|d| d.naive_utc())
        }
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDateTime> {
    if s.eq_ignore_ascii_case("now") || s.eq_ignore_ascii_case("today") {
        return Some(Local::now().naive_local());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.and_time(NaiveTime::MIN));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|d| d.naive_local())
        })
}
