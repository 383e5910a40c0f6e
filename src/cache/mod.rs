//! Cache Module
//!
//! In-memory resource cache with adaptive TTLs, LRU and value-scored
//! eviction, and pluggable revalidation.

mod access;
mod entry;
mod eviction;
mod pattern;
mod stats;
mod store;
mod ttl;
mod validity;


use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;

// Re-export public types
pub use access::{AccessPattern, AccessPatternTracker, PATTERN_RETENTION_MS};
pub use entry::{current_timestamp_ms, CacheEntry, ResourceValue, FALLBACK_VALUE_SIZE};
pub use eviction::{EvictionPolicy, ValueScoreWeights};
pub use pattern::{InvalidationRule, KeyPattern};
pub use stats::{CacheStats, CacheStatsSnapshot, KeyAccess};
pub use store::{MaintenanceReport, ResourceCache};
pub use ttl::TtlPolicy;
pub use validity::{FileRevalidator, Revalidator, FILE_SCHEME};

/// A cache shared between request handlers and the maintenance task.
pub type SharedCache = Arc<RwLock<ResourceCache>>;

// == Cache Config ==
/// Tunables recognised by `ResourceCache`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub max_size: usize,
    /// Base TTL in milliseconds
    pub default_ttl_ms: u64,
    /// Ceiling on the summed entry sizes, in bytes
    pub max_memory_usage: u64,
    /// Record per-key access patterns on hits
    pub enable_access_tracking: bool,
    /// Revalidate expired entries instead of dropping them
    pub enable_validity_check: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 100,
            default_ttl_ms: 3_600_000,
            max_memory_usage: 50 * 1024 * 1024,
            enable_access_tracking: true,
            enable_validity_check: true,
        }
    }
}
