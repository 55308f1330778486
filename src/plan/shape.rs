//! Shape coercion for loosely-typed payload fields.
//!
//! Models routinely send a scalar where a list is expected, numbers as
//! strings, or padded names. These helpers turn such values into canonical
//! Rust values; absent or empty input is empty output, not an error.

use serde_json::Value;

use crate::error::{GuardError, GuardResult};

/// Coerce a scalar-or-list value into trimmed, non-empty strings.
///
/// - `null` -> `[]`
/// - `"col"` -> `["col"]`
/// - `["a", null, " b "]` -> `["a", "b"]`
/// - `42` -> `["42"]`
pub(crate) fn str_list(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}

/// Trimmed text of a scalar; `None` for null, blank, arrays and objects.
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Trim an optional name; blank becomes `None`.
pub(crate) fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Coerce an optional integer field (`limit`, `offset`).
///
/// Accepts JSON integers, integral floats and numeric strings.
pub(crate) fn optional_int(value: Option<&Value>, field: &str) -> GuardResult<Option<i64>> {
    let invalid = || GuardError::InvalidPayload(format!("{} must be an integer", field));
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Ok(Some(i))
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
                    _ => Err(invalid()),
                }
            }
        }
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<i64>().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}
