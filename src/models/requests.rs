//! Request DTOs for the resource cache API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::cache::{InvalidationRule, ResourceValue};

/// Maximum accepted key length in bytes.
pub const MAX_KEY_LENGTH: usize = 1024;

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value; strings are stored as text
/// - `ttl`: Optional TTL in milliseconds (derived from usage if not specified)
/// - `tags`: Optional labels for tag invalidation
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: serde_json::Value,
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl: Option<i64>,
    /// Optional labels
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }

    /// Converts the JSON payload into the cached representation.
    pub fn resource_value(&self) -> ResourceValue {
        match &self.value {
            serde_json::Value::String(text) => ResourceValue::Text(text.clone()),
            other => ResourceValue::Json(other.clone()),
        }
    }
}

/// Request body for POST /invalidate
///
/// Either a bare `pattern`, or a `key_pattern` and/or `tags`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidateRequest {
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub key_pattern: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl InvalidateRequest {
    pub fn validate(&self) -> Option<String> {
        if self.pattern.is_some() && (self.key_pattern.is_some() || !self.tags.is_empty()) {
            return Some("Use either 'pattern' or 'key_pattern'/'tags', not both".to_string());
        }
        if self.pattern.is_none() && self.key_pattern.is_none() && self.tags.is_empty() {
            return Some("A pattern, key_pattern or tags must be provided".to_string());
        }
        None
    }

    /// Returns the structured rule, or None for a bare pattern.
    pub fn rule(&self) -> Option<InvalidationRule> {
        if self.pattern.is_some() {
            return None;
        }
        Some(InvalidationRule {
            key_pattern: self.key_pattern.clone(),
            tags: self.tags.clone(),
        })
    }
}

/// Query string for GET /keys
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeysQuery {
    #[serde(default)]
    pub pattern: Option<String>,
}

/// Validates a key taken from a request path or body.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}
