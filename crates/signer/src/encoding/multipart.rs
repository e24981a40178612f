use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::Result;
use crate::params::scalar_to_string;

/// Fresh random boundary for one multipart body.
pub fn new_boundary() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Encodes the top-level entries of `params` as `multipart/form-data`.
///
/// Sequences and mappings are sent as inline JSON with their own
/// `Content-Type: application/json` line. `null` entries are skipped. An
/// empty mapping produces an empty body rather than a bare closing delimiter.
pub fn encode_multipart(params: &Map<String, Value>, boundary: &str) -> Result<Vec<u8>> {
    let mut body = String::new();
    for (name, value) in params {
        let (rendered, is_json) = match value {
            Value::Null => continue,
            Value::Array(_) | Value::Object(_) => (serde_json::to_string(value)?, true),
            scalar => (scalar_to_string(scalar).unwrap_or_default(), false),
        };

        body.push_str(&format!("--{boundary}\r\n"));
        body.push_str(&format!("Content-Disposition: form-data; name=\"{name}\"\r\n"));
        if is_json {
            body.push_str("Content-Type: application/json\r\n");
        }
        body.push_str(&format!("\r\n{rendered}\r\n"));
    }
    if !body.is_empty() {
        body.push_str(&format!("--{boundary}--\r\n"));
    }
    Ok(body.into_bytes())
}
