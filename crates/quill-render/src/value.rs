//! Runtime values.
//!
//! Everything a template touches (context data, scope bindings, filter
//! inputs and outputs) is a [`Value`]. Objects keep insertion order so
//! iteration-sensitive filters (`where`, `map`) are deterministic.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use std::fmt;

/// Ordered string-keyed mapping used for `Value::Object`.
pub type Map = IndexMap<String, Value>;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Date(NaiveDateTime),
    Array(Vec<Value>),
    Object(Map),
}

impl Value {
    /// Human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Null, `false`, `0`, NaN and `""` are falsy; everything else
    /// (including empty arrays and objects) is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Date(_) | Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// Numeric view: numbers as-is, strings holding a decimal number parsed.
    /// Everything else is not a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => parse_decimal(s),
            _ => None,
        }
    }

    /// Arithmetic coercion: Null and non-numeric values count as zero.
    pub fn to_arithmetic(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Field lookup on objects; `None` for missing keys and non-objects.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Template equality: values of the same type compare by content,
    /// values of different types are never equal.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v.loose_eq(other)))
            }
            _ => false,
        }
    }
}

/// Parse a string as a finite decimal number. Rejects the empty string and
/// the `inf`/`NaN` spellings `f64::from_str` would otherwise accept.
fn parse_decimal(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty()
        || !s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Shortest round-trip decimal without forced trailing zeros: `3.0` prints
/// `3`, `129.57` prints `129.57`.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".into()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        // folds -0
        "0".into()
    } else {
        n.to_string()
    }
}

/// Output form used by `{{ }}`.
///
/// Null renders empty, dates render as `YYYY-MM-DD` (plus the time when it
/// is not midnight), arrays render their elements back to back and objects
/// render as `[object]`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Date(d) if d.time() == NaiveTime::MIN => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            Value::Array(items) => items.iter().try_for_each(|item| write!(f, "{item}")),
            Value::Object(_) => f.write_str("[object]"),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d.and_time(NaiveTime::MIN))
    }
}

impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Value::Date(d)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Object(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or_default()),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(Value::Number(-1.0).is_truthy());
        assert!(Value::Array(vec![]).is_truthy());
        assert!(Value::Object(Map::new()).is_truthy());
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Value::from("12.50").as_number(), Some(12.5));
        assert_eq!(Value::from(" -3 ").as_number(), Some(-3.0));
        assert_eq!(Value::from("1e3").as_number(), Some(1000.0));
        assert_eq!(Value::from("abc").as_number(), None);
        assert_eq!(Value::from("").as_number(), None);
        assert_eq!(Value::from("inf").as_number(), None);
        assert_eq!(Value::from("NaN").as_number(), None);
        assert_eq!(Value::Bool(true).as_number(), None);
        assert_eq!(Value::Null.to_arithmetic(), 0.0);
        assert_eq!(Value::from("x").to_arithmetic(), 0.0);
    }

    #[test]
    fn test_display_numbers() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(129.57).to_string(), "129.57");
        assert_eq!(Value::Number(-25.0).to_string(), "-25");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "Infinity");
    }

    #[test]
    fn test_display_other_kinds() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Bool(true).to_string(), "true");
        let midnight = NaiveDate::from_ymd_opt(2025, 9, 30).unwrap();
        assert_eq!(Value::from(midnight).to_string(), "2025-09-30");
        let noon = midnight.and_hms_opt(12, 5, 0).unwrap();
        assert_eq!(Value::from(noon).to_string(), "2025-09-30 12:05:00");
        let array = Value::from(vec![Value::from("a"), Value::from(1), Value::Null]);
        assert_eq!(array.to_string(), "a1");
        let object: Value = [("k", 1)].into_iter().collect();
        assert_eq!(object.to_string(), "[object]");
    }

    #[test]
    fn test_loose_eq() {
        assert!(Value::from("Recurring").loose_eq(&Value::from("Recurring")));
        assert!(Value::Number(1.0).loose_eq(&Value::from(1)));
        assert!(Value::Null.loose_eq(&Value::Null));
        assert!(!Value::from("1").loose_eq(&Value::Number(1.0)));
        assert!(!Value::Bool(false).loose_eq(&Value::Null));
        let a: Value = [("x", 1), ("y", 2)].into_iter().collect();
        let b: Value = [("y", 2), ("x", 1)].into_iter().collect();
        assert!(a.loose_eq(&b));
    }

    #[test]
    fn test_from_json_preserves_order() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"b": 1, "a": [true, null, "s"], "c": {"d": 2.5}}"#).unwrap();
        let value = Value::from(json);
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(
            value.get("a"),
            Some(&Value::Array(vec![
                Value::Bool(true),
                Value::Null,
                Value::from("s")
            ]))
        );
        assert_eq!(value.get("c").and_then(|c| c.get("d")), Some(&Value::Number(2.5)));
    }
}
