//! Shared types used across the pipeline.
//!
//! Front matter, menus, and template contexts all travel as JSON values: it
//! is the shape the template engine consumes, and it is closed over the
//! handful of value kinds that YAML and TOML front matter can express
//! (string, number, boolean, null, list, mapping).

use serde_json::Value;

/// Free-form document metadata, in authoring order.
pub type Metadata = serde_json::Map<String, Value>;

/// Menu name → ordered list of item records, as loaded from `menu.yaml`.
pub type Menus = serde_json::Map<String, Value>;

/// Render a scalar metadata value as a string.
///
/// Strings are returned as-is, numbers and booleans in their canonical
/// textual form. Null, lists, and mappings have no scalar form and yield
/// `None`, which callers treat as "not set".
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
