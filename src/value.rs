//! Value predicates shared by the rule catalog and message formatting.
//!
//! Values arrive as `Option<&Value>` where `None` means "absent": the path did
//! not resolve. Absent and `null` are distinct everywhere except in
//! [`is_empty`] and [`loose_eq`], where they are treated alike.

use serde_json::{Number, Value};

/// Returns `true` for absent, `null`, blank strings, and (optionally) empty
/// sequences and maps.
pub fn is_empty(value: Option<&Value>, include_empty_objects: bool, include_empty_arrays: bool) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => include_empty_arrays && items.is_empty(),
        Some(Value::Object(map)) => include_empty_objects && map.is_empty(),
        Some(Value::Bool(_)) | Some(Value::Number(_)) => false,
    }
}

/// [`is_empty`] with empty sequences and maps counted as empty.
pub fn is_blank(value: Option<&Value>) -> bool {
    is_empty(value, true, true)
}

/// Parses a numeric string the way a form input would be read: surrounding
/// whitespace is ignored and non-finite results are rejected.
fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_ascii_lowercase();
    if lowered.contains("inf") || lowered.contains("nan") {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Numeric view of a number or numeric string.
pub fn to_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Returns `true` for finite numbers and strings that parse as one.
pub fn is_number(value: Option<&Value>) -> bool {
    to_number(value).is_some()
}

/// Returns `true` for numbers (or numeric strings) without a fractional part.
pub fn is_integer(value: Option<&Value>) -> bool {
    to_number(value).is_some_and(|n| n.fract() == 0.0)
}

/// Type-coercing equality.
///
/// `"5"` equals `5`, `true` equals `1` and `"1"`, absent equals `null`.
/// Sequences and maps compare structurally against each other and by their
/// rendered text against scalars.
pub fn loose_eq(a: Option<&Value>, b: Option<&Value>) -> bool {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => true,
        (None, Some(_)) | (Some(_), None) => false,
        (Some(a), Some(b)) => loose_eq_present(a, b),
    }
}

fn loose_eq_present(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(fx), Some(fy)) => fx == fy,
            _ => x == y,
        },
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Bool(x), other) | (other, Value::Bool(x)) => {
            let n = if *x { 1.0 } else { 0.0 };
            coerce_to_number(other).is_some_and(|o| o == n)
        }
        (Value::Number(x), Value::String(s)) | (Value::String(s), Value::Number(x)) => {
            match (x.as_f64(), coerce_str_to_number(s)) {
                (Some(fx), Some(fs)) => fx == fs,
                _ => false,
            }
        }
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => a == b,
        (Value::Array(_) | Value::Object(_), scalar) | (scalar, Value::Array(_) | Value::Object(_)) => {
            let container = if a.is_array() || a.is_object() { a } else { b };
            let rendered = Value::String(display_value(Some(container)));
            loose_eq_present(&rendered, scalar)
        }
        _ => false,
    }
}

/// Empty and whitespace-only strings coerce to zero.
fn coerce_str_to_number(s: &str) -> Option<f64> {
    if s.trim().is_empty() {
        return Some(0.0);
    }
    parse_number(s)
}

fn coerce_to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => coerce_str_to_number(s),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Reads loosely-typed flags.
///
/// `"true"`, `"1"`, `1` become `true`; `"false"`, `"0"`, `0`, `null` and
/// absent become `false`. Other strings come back trimmed and lower-cased,
/// anything else unchanged.
pub fn to_boolean(value: Option<&Value>) -> Value {
    let Some(value) = value else {
        return Value::Bool(false);
    };
    match value {
        Value::Null => Value::Bool(false),
        Value::Bool(_) => value.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 1.0 => Value::Bool(true),
            Some(f) if f == 0.0 => Value::Bool(false),
            _ => value.clone(),
        },
        Value::String(s) => {
            let normalized = s.trim().to_lowercase();
            match normalized.as_str() {
                "true" | "1" => Value::Bool(true),
                "false" | "0" => Value::Bool(false),
                _ => Value::String(normalized),
            }
        }
        _ => value.clone(),
    }
}

/// Human rendering used for `{value}` substitution and string-form rules.
///
/// Absent renders as `undefined`; sequences render their elements joined by
/// `,`; maps render as compact JSON.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => display_number(n),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_value(Some(other)),
            })
            .collect::<Vec<_>>()
            .join(","),
        Some(v @ Value::Object(_)) => serde_json::to_string(v).unwrap_or_default(),
    }
}

/// Integral floats render without a fraction (`5.0` as `5`), and negative
/// zero as `0`.
fn display_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f == 0.0 => "0".to_string(),
        Some(f) if n.is_f64() => f.to_string(),
        _ => n.to_string(),
    }
}
