//! Canonical "no value".
//!
//! Inputs report emptiness inconsistently: text inputs emit `""`, multi
//! selects emit `[]`, checkboxes emit `false`. The store keeps a single
//! representation for all of them, `null`.

use serde_json::Value;

/// `null`, `false`, `""`, `[]` and `{}`.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Map blank or absent values to `null`, pass everything else through.
pub fn normalize(value: Option<Value>) -> Value {
    match value {
        Some(v) if !is_blank(&v) => v,
        _ => Value::Null,
    }
}

/// JavaScript truthiness.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Whether the value's `length` is exactly zero.
///
/// Only strings and arrays have a length; an object counts only if it carries
/// a numeric `length` entry equal to zero. Numbers, booleans and `null` are
/// never empty by this rule.
pub fn has_zero_length(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map
            .get("length")
            .and_then(Value::as_f64)
            .is_some_and(|len| len == 0.0),
        _ => false,
    }
}
