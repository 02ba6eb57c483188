use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{DocPath, Document, StoreError};

/// Serialize a typed document into store fields.
pub fn encode<T: Serialize>(path: &DocPath, value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::Codec {
            path: path.to_string(),
            detail: format!("expected an object, got {other}"),
        }),
        Err(err) => Err(StoreError::Codec {
            path: path.to_string(),
            detail: err.to_string(),
        }),
    }
}

pub fn decode<T: DeserializeOwned>(path: &DocPath, doc: Document) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(doc)).map_err(|err| StoreError::Codec {
        path: path.to_string(),
        detail: err.to_string(),
    })
}

/// Turn a `json!({...})` literal into a partial-update field set.
pub fn fields(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}
