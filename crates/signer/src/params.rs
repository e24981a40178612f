use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ClientError, Result};

/// Flat dotted-path view of a parameter tree, e.g. `Filters.0.Name`.
///
/// Keys are kept in lexicographic order, which is the order both signing
/// protocols need when they build a canonical string.
pub type CanonicalParams = BTreeMap<String, String>;

/// Serializes `params` into a parameter tree and flattens it.
///
/// Fails with [`ClientError::ClientParams`] when the value cannot be
/// represented as a tree (e.g. maps with non-string keys).
pub fn flatten<T: Serialize + ?Sized>(params: &T) -> Result<CanonicalParams> {
    let tree = serde_json::to_value(params)?;
    Ok(flatten_value(&tree))
}

/// Flattens an existing parameter tree.
///
/// Sequence elements contribute their index as a path segment, mapping
/// entries their key. `null` leaves are omitted. A scalar root yields a
/// single entry under the empty key.
pub fn flatten_value(tree: &Value) -> CanonicalParams {
    let mut out = CanonicalParams::new();
    flatten_into(&mut out, "", tree);
    out
}

fn flatten_into(out: &mut CanonicalParams, prefix: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                flatten_into(out, &join_path(prefix, &idx.to_string()), item);
            }
        }
        Value::Object(entries) => {
            for (key, item) in entries {
                flatten_into(out, &join_path(prefix, key), item);
            }
        }
        scalar => {
            if let Some(rendered) = scalar_to_string(scalar) {
                out.insert(prefix.to_string(), rendered);
            }
        }
    }
}

fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

/// Renders a scalar leaf the way it travels on the wire. Returns `None` for
/// containers and `null`.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Signing protocols inject their own top-level fields, so the root of the
/// tree has to be a mapping. `null` stands for "no parameters".
pub(crate) fn require_mapping(tree: &Value) -> Result<Map<String, Value>> {
    match tree {
        Value::Object(map) => Ok(map.clone()),
        Value::Null => Ok(Map::new()),
        other => Err(ClientError::ClientParams(format!(
            "request parameters must be a mapping, got {}",
            type_name(other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
