use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const KEY_POSITION_X: &str = "position.x";
pub const KEY_POSITION_Y: &str = "position.y";
pub const KEY_VELOCITY_X: &str = "v.x";
pub const KEY_VELOCITY_Y: &str = "v.y";
pub const KEY_ID: &str = "id";
pub const KEY_EVENT: &str = "event";
pub const KEY_KIND: &str = "kind";
pub const KEY_VERSION: &str = "version";

/// Value of `event` announcing that the sender's base was destroyed
pub const LOSS_EVENT: &str = "youLoose";

/// Current wire format version
pub const WIRE_VERSION: &str = "1";

/// Errors raised while encoding or decoding wire messages
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Payload is not a JSON object")]
    NotAnObject,

    #[error("Value for key '{key}' is not a string")]
    NotFlat { key: String },

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid number for '{key}': {value}")]
    InvalidNumber { key: String, value: String },

    #[error("Projectile id cannot be empty")]
    InvalidId,

    #[error("Unsupported wire version: {0}")]
    UnsupportedVersion(String),

    #[error("Unknown message kind: {0}")]
    UnknownKind(String),

    #[error("Unrecognized message shape (keys: {keys:?})")]
    UnrecognizedShape { keys: Vec<String> },
}

/// Flat string-keyed record exchanged between peers.
///
/// Values are always strings; numbers travel as decimal text. Nested values
/// are rejected on decode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WireMessage(BTreeMap<String, String>);

impl WireMessage {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read a numeric field written as decimal text
    pub fn number(&self, key: &'static str) -> Result<f64, CodecError> {
        let raw = self.get(key).ok_or(CodecError::MissingField(key))?;
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| CodecError::InvalidNumber {
                key: key.to_string(),
                value: raw.to_string(),
            })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        let serde_json::Value::Object(map) = value else {
            return Err(CodecError::NotAnObject);
        };

        let mut fields = BTreeMap::new();
        for (key, value) in map {
            match value {
                serde_json::Value::String(text) => {
                    fields.insert(key, text);
                }
                _ => return Err(CodecError::NotFlat { key }),
            }
        }

        Ok(Self(fields))
    }
}

impl FromIterator<(String, String)> for WireMessage {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
