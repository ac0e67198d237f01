//! Data binding expressions

use crate::{Result, TemplateError};
use serde_json::Value;

/// Resolve a JSONPath-like binding expression against data
///
/// Supports simple paths like:
/// - `$.field` - Root field
/// - `$.object.field` - Nested field
/// - `$.array[0]` - Array index
/// - `$.array[0].field` - Array element field
pub fn resolve_binding<'a>(path: &str, data: &'a Value) -> Option<&'a Value> {
    let path = path.strip_prefix("$.")?;
    let mut current = data;

    for segment in path.split('.') {
        // Check for array index
        if let Some(bracket_pos) = segment.find('[') {
            let field = &segment[..bracket_pos];
            let index: usize = segment[bracket_pos + 1..]
                .strip_suffix(']')?
                .parse()
                .ok()?;

            if !field.is_empty() {
                current = current.get(field)?;
            }
            current = current.get(index)?;
        } else {
            current = current.get(segment)?;
        }
    }

    Some(current)
}

/// Like [`resolve_binding`], but a missing value is an error
pub fn require_binding<'a>(path: &str, data: &'a Value) -> Result<&'a Value> {
    resolve_binding(path, data).ok_or_else(|| TemplateError::MissingField(path.to_string()))
}

/// Convert a JSON value to string for rendering
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Coerce a JSON value to a number
///
/// Numeric strings are parsed (surrounding whitespace allowed) and booleans
/// count as 1 or 0. Anything else is 0.
pub fn value_to_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => 0.0,
    }
}
