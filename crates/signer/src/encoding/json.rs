use serde_json::{Map, Value};

use crate::error::Result;

/// Serializes the parameter tree as a compact JSON body.
pub fn encode_json(params: &Map<String, Value>) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(params)?)
}
