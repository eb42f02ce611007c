use std::collections::BTreeMap;
use std::iter::FromIterator;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::errors::CakeError;

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serializes a value into canonical JSON bytes with deterministic key ordering.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CakeError> {
    let value =
        serde_json::to_value(value).map_err(|err| CakeError::serde("json_serialize", err))?;
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonicalize(value))
        .map_err(|err| CakeError::serde("json_write", err))?;
    Ok(bytes)
}

/// Deserializes a value from JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, CakeError> {
    serde_json::from_slice(data).map_err(|err| CakeError::serde("json_deserialize", err))
}

/// Stable SHA-256 hex digest of the canonical JSON form of `value`.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, CakeError> {
    let bytes = to_canonical_json_bytes(value)?;
    Ok(format!("{:x}", Sha256::digest(bytes)))
}
