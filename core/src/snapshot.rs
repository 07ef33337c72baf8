//! Reshaping of keyed reads.
//!
//! A filtered read answers with a JSON object mapping record keys to values.
//! When nothing matches the store may instead answer `null` (no data at the
//! path) or `{}` (filter matched nothing). `Snapshot` makes both of those an
//! explicit `Empty` case.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Result of a keyed read: nothing, or records in the store's return order.
/// `Records` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot<T> {
    Empty,
    Records(Vec<(String, T)>),
}

impl<T: DeserializeOwned> Snapshot<T> {
    pub fn from_body(body: &str) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_str(body).map_err(ApiError::Deserialization)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        let map = match value {
            Value::Null => return Ok(Snapshot::Empty),
            Value::Object(map) if map.is_empty() => return Ok(Snapshot::Empty),
            Value::Object(map) => map,
            other => return Err(ApiError::UnexpectedShape(kind(&other))),
        };

        map.into_iter()
            .map(|(key, value)| match serde_json::from_value(value) {
                Ok(record) => Ok((key, record)),
                Err(source) => Err(ApiError::InvalidRecord { key, source }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Snapshot::Records)
    }
}

impl<T> Snapshot<T> {
    pub fn into_records(self) -> Vec<(String, T)> {
        match self {
            Snapshot::Empty => Vec::new(),
            Snapshot::Records(records) => records,
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
