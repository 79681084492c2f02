//! Dedup store wire contract
//!
//! The JSON shapes below are fixed; players, front ends and the store itself
//! must agree on them byte for byte.
//!
//! - `POST /` `{"key": k, "value": v, "action": "create"}` -> 201
//! - `POST /` `{"value": v, "action": "delete"}` -> 204
//! - `GET /?key=k` -> 200 `{"key": k, "value": [..]}`
//! - malformed body or missing field -> 400 `{"reason": ..}`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Separator of composite (multi-field) keys
pub const MULTIFIELD_KEY_SEPARATOR: &str = ",";

/// Body returned by `GET /?key=..`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieveResponse {
    /// Key exactly as it was sent
    pub key: String,
    /// Values associated with the key
    pub value: Vec<String>,
}

/// Body of every 400 response to a POST
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub reason: String,
}

/// POST action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Delete,
}

/// POST body
///
/// Field order matters on the wire: `key`, `value`, `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KvRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: String,
    pub action: Action,
}

/// Reasons a POST body is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Request contains invalid JSON")]
    InvalidJson,

    #[error("Missing mandatory field '{0}'")]
    MissingField(&'static str),

    #[error("Field '{0}' must be a string")]
    NotAString(&'static str),

    #[error("Invalid action {0}")]
    InvalidAction(String),
}

impl KvRequest {
    /// Associate `value` with `key`
    pub fn create(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: value.into(),
            action: Action::Create,
        }
    }

    /// Remove `value` from every key it is associated with
    pub fn delete(value: impl Into<String>) -> Self {
        Self {
            key: None,
            value: value.into(),
            action: Action::Delete,
        }
    }

    /// Parse and validate a raw POST body
    ///
    /// `action` is checked before the other fields so an unknown action is
    /// reported even when the rest of the body is incomplete.
    pub fn parse(body: &[u8]) -> Result<Self, RequestError> {
        let content: Value = serde_json::from_slice(body).map_err(|_| RequestError::InvalidJson)?;
        let Value::Object(fields) = content else {
            return Err(RequestError::InvalidJson);
        };

        let action = match fields.get("action") {
            None => return Err(RequestError::MissingField("action")),
            Some(Value::String(s)) if s == "create" => Action::Create,
            Some(Value::String(s)) if s == "delete" => Action::Delete,
            Some(Value::String(s)) => return Err(RequestError::InvalidAction(s.clone())),
            Some(other) => return Err(RequestError::InvalidAction(other.to_string())),
        };

        let string_field = |name: &'static str| match fields.get(name) {
            None => Err(RequestError::MissingField(name)),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(RequestError::NotAString(name)),
        };

        match action {
            Action::Create => {
                let key = string_field("key")?;
                let value = string_field("value")?;
                Ok(Self::create(key, value))
            }
            Action::Delete => Ok(Self::delete(string_field("value")?)),
        }
    }
}

/// Split a raw key into its fields
pub fn split_key(raw: &str, separator: &str) -> Vec<String> {
    raw.split(separator).map(str::to_string).collect()
}
