//! Access Pattern Module
//!
//! Tracks per-key access history used to predict future reads.

use std::collections::HashMap;

// == Constants ==
/// Weight kept from the previous average on each new interval sample.
const INTERVAL_SMOOTHING: f64 = 0.8;

/// Patterns idle for longer than this are dropped during maintenance.
pub const PATTERN_RETENTION_MS: u64 = 7 * 24 * 60 * 60 * 1000;

// == Access Pattern ==
/// Access history for a single key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessPattern {
    pub access_count: u64,
    pub total_accesses: u64,
    /// Timestamp of the most recent access (Unix milliseconds), 0 = never
    pub last_access: u64,
    /// Exponential moving average of the time between accesses, in milliseconds
    pub average_interval: f64,
}

impl AccessPattern {
    /// Folds an access at `now` into the pattern.
    ///
    /// The first access only records its timestamp.
    pub fn record(&mut self, now: u64) {
        if self.last_access > 0 {
            let interval = now.saturating_sub(self.last_access) as f64;
            self.average_interval = self.average_interval * INTERVAL_SMOOTHING
                + interval * (1.0 - INTERVAL_SMOOTHING);
        }
        self.access_count += 1;
        self.total_accesses += 1;
        self.last_access = now;
    }
}

// == Access Pattern Tracker ==
/// Keyed collection of access patterns, independent of the entry map.
#[derive(Debug, Default)]
pub struct AccessPatternTracker {
    patterns: HashMap<String, AccessPattern>,
}

impl AccessPatternTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an access to `key`, creating its pattern on first use.
    pub fn record(&mut self, key: &str, now: u64) {
        match self.patterns.get_mut(key) {
            Some(pattern) => pattern.record(now),
            None => {
                let mut pattern = AccessPattern::default();
                pattern.record(now);
                self.patterns.insert(key.to_string(), pattern);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&AccessPattern> {
        self.patterns.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<AccessPattern> {
        self.patterns.remove(key)
    }

    // == Prune ==
    /// Drops every pattern not accessed within `retention_ms` of `now`.
    ///
    /// Returns the number of patterns removed.
    pub fn prune_idle(&mut self, now: u64, retention_ms: u64) -> usize {
        let before = self.patterns.len();
        self.patterns
            .retain(|_, pattern| now.saturating_sub(pattern.last_access) <= retention_ms);
        before - self.patterns.len()
    }

    pub fn clear(&mut self) {
        self.patterns.clear();
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
