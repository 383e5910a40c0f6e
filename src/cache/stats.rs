//! Cache Statistics Module
//!
//! Tracks request counters and builds point-in-time statistics snapshots.

use serde::Serialize;

/// Number of keys reported in `CacheStatsSnapshot::top_keys`.
pub const TOP_KEYS_LIMIT: usize = 5;

// == Cache Stats ==
/// Running request counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of `get` calls that returned a value
    pub hits: u64,
    /// Number of `get` calls, hit or miss
    pub requests: u64,
    /// Number of entries removed by capacity or memory pressure
    pub evictions: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / requests, or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.hits as f64 / self.requests as f64
        }
    }

    pub fn misses(&self) -> u64 {
        self.requests - self.hits
    }

    // == Record Hit ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
        self.requests += 1;
    }

    // == Record Miss ==
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    // == Record Eviction ==
    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    // == Reset ==
    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// == Snapshot ==
/// A key and how many times it was read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyAccess {
    pub key: String,
    pub access_count: u64,
}

/// Aggregate view of the cache at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsSnapshot {
    /// Number of live entries
    pub size: usize,
    pub hit_rate: f64,
    /// Sum of entry sizes in bytes
    pub memory_usage: u64,
    pub average_access_count: f64,
    /// Most-read keys, busiest first
    pub top_keys: Vec<KeyAccess>,
    pub hits: u64,
    pub misses: u64,
    pub requests: u64,
    pub evictions: u64,
}

impl CacheStatsSnapshot {
    /// Builds a snapshot from the counters and `(key, access_count, size)` rows.
    pub fn build<'a, I>(counters: &CacheStats, rows: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, u64, u64)>,
    {
        let mut size = 0usize;
        let mut memory_usage = 0u64;
        let mut total_accesses = 0u64;
        let mut top_keys = Vec::new();

        for (key, access_count, entry_size) in rows {
            size += 1;
            memory_usage += entry_size;
            total_accesses += access_count;
            top_keys.push(KeyAccess {
                key: key.to_string(),
                access_count,
            });
        }

        top_keys.sort_by(|a, b| {
            b.access_count
                .cmp(&a.access_count)
                .then_with(|| a.key.cmp(&b.key))
        });
        top_keys.truncate(TOP_KEYS_LIMIT);

        let average_access_count = if size == 0 {
            0.0
        } else {
            total_accesses as f64 / size as f64
        };

        Self {
            size,
            hit_rate: counters.hit_rate(),
            memory_usage,
            average_access_count,
            top_keys,
            hits: counters.hits,
            misses: counters.misses(),
            requests: counters.requests,
            evictions: counters.evictions,
        }
    }
}
