//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::CacheConfig;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_size: usize,
    /// Base TTL in milliseconds for entries without explicit TTL
    pub default_ttl_ms: u64,
    /// Ceiling on the summed size of cached values, in bytes
    pub max_memory_usage: u64,
    /// Track per-key access patterns
    pub enable_access_tracking: bool,
    /// Revalidate expired entries before dropping them
    pub enable_validity_check: bool,
    /// HTTP server port
    pub server_port: u16,
    /// Background maintenance interval in seconds
    pub maintenance_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 100)
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 3600000)
    /// - `CACHE_MAX_MEMORY_BYTES` - Memory ceiling in bytes (default: 52428800)
    /// - `CACHE_ACCESS_TRACKING` - `true`/`false` (default: true)
    /// - `CACHE_VALIDITY_CHECK` - `true`/`false` (default: true)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `MAINTENANCE_INTERVAL` - Maintenance frequency in seconds (default: 120)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_size: env_or("CACHE_MAX_SIZE", defaults.max_size),
            default_ttl_ms: env_or("CACHE_DEFAULT_TTL_MS", defaults.default_ttl_ms),
            max_memory_usage: env_or("CACHE_MAX_MEMORY_BYTES", defaults.max_memory_usage),
            enable_access_tracking: env_flag("CACHE_ACCESS_TRACKING", defaults.enable_access_tracking),
            enable_validity_check: env_flag("CACHE_VALIDITY_CHECK", defaults.enable_validity_check),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            maintenance_interval: env_or("MAINTENANCE_INTERVAL", defaults.maintenance_interval),
        }
    }

    /// Returns the cache settings portion of the configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_size: self.max_size,
            default_ttl_ms: self.default_ttl_ms,
            max_memory_usage: self.max_memory_usage,
            enable_access_tracking: self.enable_access_tracking,
            enable_validity_check: self.enable_validity_check,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let cache = CacheConfig::default();
        Self {
            max_size: cache.max_size,
            default_ttl_ms: cache.default_ttl_ms,
            max_memory_usage: cache.max_memory_usage,
            enable_access_tracking: cache.enable_access_tracking,
            enable_validity_check: cache.enable_validity_check,
            server_port: 3000,
            maintenance_interval: 120,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
