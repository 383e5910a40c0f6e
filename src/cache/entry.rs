//! Cache Entry Module
//!
//! Defines cached resource values and the per-entry metadata used by the
//! TTL and eviction policies.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Size assumed for values whose serialized form cannot be measured.
pub const FALLBACK_VALUE_SIZE: u64 = 1024;

// == Resource Value ==
/// Opaque payload stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ResourceValue {
    /// UTF-8 text, sized by byte length
    Text(String),
    /// Raw buffer, sized by length
    Bytes(Vec<u8>),
    /// Arbitrary structured data, sized by its JSON encoding
    Json(serde_json::Value),
}

impl ResourceValue {
    // == Size Estimate ==
    /// Estimates the number of bytes this value occupies.
    pub fn estimated_size(&self) -> u64 {
        match self {
            ResourceValue::Text(text) => text.len() as u64,
            ResourceValue::Bytes(bytes) => bytes.len() as u64,
            ResourceValue::Json(json) => serde_json::to_vec(json)
                .map(|encoded| encoded.len() as u64)
                .unwrap_or(FALLBACK_VALUE_SIZE),
        }
    }
}

impl From<String> for ResourceValue {
    fn from(text: String) -> Self {
        ResourceValue::Text(text)
    }
}

impl From<&str> for ResourceValue {
    fn from(text: &str) -> Self {
        ResourceValue::Text(text.to_string())
    }
}

impl From<Vec<u8>> for ResourceValue {
    fn from(bytes: Vec<u8>) -> Self {
        ResourceValue::Bytes(bytes)
    }
}

impl From<serde_json::Value> for ResourceValue {
    fn from(json: serde_json::Value) -> Self {
        ResourceValue::Json(json)
    }
}

// == Cache Entry ==
/// A stored value together with its bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: ResourceValue,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Last time the value was written (Unix milliseconds)
    pub last_modified: u64,
    /// Last successful read (Unix milliseconds)
    pub last_accessed: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
    /// Estimated size of `value` in bytes
    pub size: u64,
    /// Number of hits since the entry was written
    pub access_count: u64,
    /// Free-form labels used by tag invalidation
    pub tags: Vec<String>,
    /// Monotonic touch counter, orders entries touched within the same millisecond
    pub(crate) access_seq: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a fresh entry written at `now`.
    ///
    /// A `ttl_ms` of zero or less leaves the entry without an expiry.
    pub fn new(value: ResourceValue, size: u64, ttl_ms: i64, now: u64) -> Self {
        Self {
            value,
            created_at: now,
            last_modified: now,
            last_accessed: now,
            expires_at: expiry_from(now, ttl_ms),
            size,
            access_count: 0,
            tags: Vec::new(),
            access_seq: 0,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry expired at or before `now`.
    pub fn is_expired_at(&self, now: u64) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    /// Checks whether the entry has expired right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(current_timestamp_ms()))
    }

    // == Record Access ==
    pub(crate) fn record_access(&mut self, now: u64, seq: u64) {
        self.access_count += 1;
        self.last_accessed = now;
        self.access_seq = seq;
    }

    // == Extend ==
    /// Moves the expiry `ttl_ms` past `now`; a non-positive TTL clears it.
    pub(crate) fn extend(&mut self, ttl_ms: i64, now: u64) {
        self.expires_at = expiry_from(now, ttl_ms);
    }
}

fn expiry_from(now: u64, ttl_ms: i64) -> Option<u64> {
    if ttl_ms > 0 {
        Some(now.saturating_add(ttl_ms as u64))
    } else {
        None
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
