//! Arithmetic and currency filters. Non-numeric operands count as zero.

use rust_decimal::prelude::*;

use super::expect_args;
use crate::error::FilterError;
use crate::value::Value;

/// Two-decimal fixed form, half away from zero. No currency symbol or
/// grouping. Non-numeric input formats as `0.00`.
pub fn money(input: &Value, args: &[Value]) -> Result<Value, FilterError> {
    expect_args(args, 0)?;
    let formatted = match input.as_number() {
        Some(n) if n.is_finite() => format_money(n),
        _ => "0.00".to_string(),
    };
    Ok(Value::String(formatted))
}

/// Round the shortest decimal form of `n` rather than its binary value, so
/// `1.005` rounds to `1.01` the way it reads.
fn format_money(n: f64) -> String {
    match Decimal::from_str(&n.to_string()) {
        Ok(d) => {
            let mut rounded = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(2);
            if rounded.is_zero() {
                rounded.set_sign_positive(true);
            }
            rounded.to_string()
        }
        // out of Decimal range
        Err(_) => format!("{n:.2}"),
    }
}

/// Sum of an array. Null and non-numeric elements add zero; a non-array
/// input sums to zero.
pub fn sum(input: &Value, args: &[Value]) -> Result<Value, FilterError> {
    expect_args(args, 0)?;
    let total = input
        .as_array()
        .map_or(0.0, |items| items.iter().map(Value::to_arithmetic).sum());
    Ok(Value::Number(total))
}

pub fn minus(input: &Value, args: &[Value]) -> Result<Value, FilterError> {
    expect_args(args, 1)?;
    Ok(Value::Number(input.to_arithmetic() - args[0].to_arithmetic()))
}

pub fn times(input: &Value, args: &[Value]) -> Result<Value, FilterError> {
    expect_args(args, 1)?;
    Ok(Value::Number(input.to_arithmetic() * args[0].to_arithmetic()))
}
