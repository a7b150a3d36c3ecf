//! Claims
//!
//! Raw JSON claims payload with typed deserialization on demand.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProtocolError;

/// JSON object of claims as returned by the provider.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Parse a response body that must be a JSON object.
    pub fn from_json(body: &str) -> Result<Self, ProtocolError> {
        match serde_json::from_str::<Value>(body).map_err(ProtocolError::invalid_json)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ProtocolError::InvalidResponse {
                message: "expected a JSON object".to_string(),
            }),
        }
    }

    /// Decode the payload into a caller-chosen shape.
    pub fn deserialize_claims<T: DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        serde_json::from_value(Value::Object(self.0.clone())).map_err(ProtocolError::invalid_json)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}
