//! Flattens a nested event record into ordered (path, value) rows for
//! the key/value detail table and CSV export.

use serde_json::Value;

/// Flatten a JSON tree depth-first into dotted/indexed paths.
///
/// Map children extend the path with `.<key>`, list children with
/// `[<index>]`. A scalar at the root gets the placeholder path
/// `(value)`. Timestamps arrive from the API as RFC 3339 strings and
/// are already leaves, so a `start.dateTime` never explodes into
/// component fields. Inputs are plain deserialized payloads with no
/// back-references, so there is no cycle guard.
pub fn flatten_value(value: &Value) -> Vec<(String, Value)> {
    flatten_into("", value)
}

fn flatten_into(prefix: &str, value: &Value) -> Vec<(String, Value)> {
    let mut rows = Vec::new();
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                push_child(&mut rows, join_path(prefix, key), child);
            }
        }
        Value::Array(items) => {
            for (ix, child) in items.iter().enumerate() {
                push_child(&mut rows, join_path(prefix, &format!("[{}]", ix)), child);
            }
        }
        scalar => {
            let path = if prefix.is_empty() {
                "(value)".to_string()
            } else {
                prefix.to_string()
            };
            rows.push((path, scalar.clone()));
        }
    }
    rows
}

fn push_child(rows: &mut Vec<(String, Value)>, path: String, child: &Value) {
    if child.is_object() || child.is_array() {
        rows.extend(flatten_into(&path, child));
    } else {
        rows.push((path, child.clone()));
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Render a flattened leaf for display or CSV. Null becomes an empty
/// string; residual composites (empty maps/lists) are compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        composite => serde_json::to_string(composite).unwrap_or_default(),
    }
}
