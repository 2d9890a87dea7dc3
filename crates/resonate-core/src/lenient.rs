//! Forgiving serde deserializers for third-party JSON.
//!
//! Lookup services disagree on types: counts arrive as numbers, numeric
//! strings, `null` or `-1`. These helpers collapse every such shape onto the
//! field's default instead of failing the whole payload.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::Duration;

fn value_to_number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// String field; `null`, arrays and objects become `""`.
pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(value_to_string(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Optional string field; empty strings become `None`.
pub fn opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(value_to_string(Value::deserialize(deserializer)?).filter(|s| !s.is_empty()))
}

/// Unsigned count; negative, fractional-negative or unparsable values become 0.
pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(value_to_number(&Value::deserialize(deserializer)?).unwrap_or(0))
}

/// Optional unsigned count.
pub fn opt_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(value_to_number(&Value::deserialize(deserializer)?))
}

/// Optional boolean, also accepting `"true"`/`"false"` and `0`/`1`.
pub fn opt_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => Some(b),
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64().map(|n| n != 0),
        _ => None,
    })
}

/// Boolean flag; anything [`opt_flag`] cannot read becomes `false`.
pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    opt_flag(deserializer).map(Option::unwrap_or_default)
}

/// Duration in whole seconds.
pub fn duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    number(deserializer).map(Duration::from_seconds)
}
