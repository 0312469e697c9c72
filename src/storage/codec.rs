//! Encoding of a collection's ordered sequence into slot bytes.
//!
//! A slot always holds a JSON array. Anything else found in a slot is
//! reported as a decode error rather than coerced.

use crate::core::{Result, StoreError};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value as JsonValue;

pub fn encode_sequence<'a, T, I>(name: &str, items: I, pretty: bool) -> Result<Vec<u8>>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let items: Vec<&T> = items.into_iter().collect();
    let encoded = if pretty {
        serde_json::to_vec_pretty(&items)
    } else {
        serde_json::to_vec(&items)
    };
    encoded.map_err(|err| StoreError::Encode(name.to_string(), err.to_string()))
}

pub fn decode_sequence<T: DeserializeOwned>(name: &str, bytes: &[u8]) -> Result<Vec<T>> {
    let value: JsonValue = serde_json::from_slice(bytes)
        .map_err(|err| StoreError::Decode(name.to_string(), err.to_string()))?;

    match value {
        JsonValue::Array(_) => serde_json::from_value(value)
            .map_err(|err| StoreError::Decode(name.to_string(), err.to_string())),
        other => Err(StoreError::Decode(
            name.to_string(),
            format!("expected a top-level array, found {}", json_kind(&other)),
        )),
    }
}

/// Bytes of an empty sequence.
pub fn empty_sequence() -> Vec<u8> {
    b"[]".to_vec()
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
