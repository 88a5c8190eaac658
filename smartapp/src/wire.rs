//! JSON encoding of lifecycle documents

use serde::{de::DeserializeOwned, Serialize};

use crate::models::lifecycle::LifecycleRequest;

/// Parse a lifecycle request body.
///
/// Fails on malformed JSON, an unknown `lifecycle` phase, a missing
/// required field, or an unknown setting, value or event discriminator.
pub fn parse_request(body: &str) -> Result<LifecycleRequest, serde_json::Error> {
    serde_json::from_str(body)
}

/// Serialize a lifecycle document (or definition) to indented JSON
pub fn to_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Deserialize a lifecycle document (or definition) from JSON
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(json)
}
