//! Cache Store Module
//!
//! Main cache engine combining entry storage, access tracking, adaptive TTLs,
//! eviction and revalidation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{
    current_timestamp_ms, AccessPattern, AccessPatternTracker, CacheConfig, CacheEntry,
    CacheStats, CacheStatsSnapshot, EvictionPolicy, FileRevalidator, InvalidationRule, KeyPattern,
    ResourceValue, Revalidator, TtlPolicy, ValueScoreWeights, PATTERN_RETENTION_MS,
};
use crate::error::{CacheError, Result};

// == Maintenance Report ==
/// Outcome of one maintenance sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaintenanceReport {
    /// Expired entries dropped
    pub expired_removed: usize,
    /// Expired entries kept after revalidation
    pub revalidated: usize,
    /// Idle access patterns dropped
    pub patterns_pruned: usize,
    /// Entries remaining after the sweep
    pub entries: usize,
    /// Bytes held after the sweep
    pub memory_usage: u64,
}

// == Resource Cache ==
/// In-memory resource cache.
///
/// Operations take `&mut self`; share it through [`crate::cache::SharedCache`]
/// so that eviction and insertion happen under one lock.
pub struct ResourceCache {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Per-key access history
    patterns: AccessPatternTracker,
    /// Request counters
    stats: CacheStats,
    config: CacheConfig,
    ttl_policy: TtlPolicy,
    eviction: EvictionPolicy,
    revalidator: Arc<dyn Revalidator>,
    /// Sum of entry sizes in bytes
    memory_usage: u64,
    /// Last issued access sequence number
    access_seq: u64,
}

impl fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCache")
            .field("entries", &self.entries.len())
            .field("patterns", &self.patterns.len())
            .field("memory_usage", &self.memory_usage)
            .field("stats", &self.stats)
            .field("config", &self.config)
            .finish()
    }
}

impl ResourceCache {
    // == Constructors ==
    /// Creates a cache that revalidates `file://` keys by modification time.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_revalidator(config, FileRevalidator)
    }

    /// Creates a cache with a custom revalidation hook.
    ///
    /// A `max_size` of zero is treated as one.
    pub fn with_revalidator<R>(mut config: CacheConfig, revalidator: R) -> Self
    where
        R: Revalidator + 'static,
    {
        config.max_size = config.max_size.max(1);
        Self {
            entries: HashMap::new(),
            patterns: AccessPatternTracker::new(),
            stats: CacheStats::new(),
            ttl_policy: TtlPolicy::new(config.default_ttl_ms),
            eviction: EvictionPolicy::default(),
            revalidator: Arc::new(revalidator),
            memory_usage: 0,
            access_seq: 0,
            config,
        }
    }

    /// Replaces the value-score coefficients used under memory pressure.
    pub fn with_eviction_weights(mut self, weights: ValueScoreWeights) -> Self {
        self.eviction = EvictionPolicy::new(weights);
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Set ==
    /// Stores a value under `key`, replacing any previous entry.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - TTL in milliseconds; `None` derives one from the key's usage,
    ///   zero or less stores the entry without an expiry
    pub fn set(&mut self, key: String, value: impl Into<ResourceValue>, ttl: Option<i64>) -> Result<()> {
        self.set_with_tags(key, value, ttl, Vec::new())
    }

    /// Stores a value like [`ResourceCache::set`], labelled with `tags`.
    pub fn set_with_tags(
        &mut self,
        key: String,
        value: impl Into<ResourceValue>,
        ttl: Option<i64>,
        tags: Vec<String>,
    ) -> Result<()> {
        let value = value.into();
        let size = value.estimated_size();
        if size > self.config.max_memory_usage {
            return Err(CacheError::ValueTooLarge {
                size,
                max: self.config.max_memory_usage,
            });
        }

        let now = current_timestamp_ms();
        let ttl = match ttl {
            Some(ttl) => ttl,
            None => {
                let optimal =
                    self.ttl_policy
                        .calculate_optimal_ttl(self.patterns.get(&key), size, now, now);
                i64::try_from(optimal).unwrap_or(i64::MAX)
            }
        };

        self.ensure_space(&key, size, now);

        let mut entry = CacheEntry::new(value, size, ttl, now);
        entry.tags = tags;
        entry.access_seq = self.next_seq();

        debug!(key = %key, size, ttl, "Caching entry");
        self.insert_entry(key, entry);
        Ok(())
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `Ok(None)` for missing keys and for expired entries that do
    /// not revalidate.
    pub fn get(&mut self, key: &str) -> Result<Option<ResourceValue>> {
        let now = current_timestamp_ms();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                self.stats.record_miss();
                return Ok(None);
            }
        };

        if expired && !self.settle_expired(key, now, true) {
            self.stats.record_miss();
            return Ok(None);
        }

        if self.config.enable_access_tracking {
            self.patterns.record(key, now);
        }

        let seq = self.next_seq();
        let Some(entry) = self.entries.get_mut(key) else {
            self.stats.record_miss();
            return Ok(None);
        };
        entry.record_access(now, seq);
        self.stats.record_hit();

        Ok(Some(entry.value.clone()))
    }

    // == Has ==
    /// Checks for a live entry without touching statistics.
    ///
    /// Expired entries are revalidated or removed exactly as `get` would.
    pub fn has(&mut self, key: &str) -> Result<bool> {
        let now = current_timestamp_ms();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => return Ok(false),
        };

        if expired {
            return Ok(self.settle_expired(key, now, true));
        }
        Ok(true)
    }

    // == Delete ==
    /// Removes an entry and its access pattern.
    ///
    /// Returns whether an entry was present.
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        self.patterns.remove(key);
        Ok(self.remove_entry(key).is_some())
    }

    // == Clear ==
    /// Removes every entry and pattern and resets the request counters.
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.patterns.clear();
        self.stats.reset();
        self.memory_usage = 0;
        Ok(())
    }

    // == Invalidate ==
    /// Removes every entry whose key matches `pattern`.
    ///
    /// `"prefix/*"` removes by prefix; any other pattern is a regular
    /// expression searched for in each key. Returns the number removed.
    pub fn invalidate(&mut self, pattern: &str) -> Result<usize> {
        let matcher = KeyPattern::for_invalidation(pattern)?;
        let removed = self.remove_matching(|key, _| matcher.matches(key));
        debug!(pattern, removed, "Invalidated entries");
        Ok(removed)
    }

    /// Removes entries selected by a key pattern and/or tags.
    pub fn invalidate_rule(&mut self, rule: &InvalidationRule) -> Result<usize> {
        if rule.is_empty() {
            return Ok(0);
        }

        let matcher = rule
            .key_pattern
            .as_deref()
            .map(KeyPattern::for_invalidation)
            .transpose()?;

        let removed = self.remove_matching(|key, entry| {
            let key_matches = matcher.as_ref().map_or(true, |m| m.matches(key));
            let tag_matches =
                rule.tags.is_empty() || entry.tags.iter().any(|tag| rule.tags.contains(tag));
            key_matches && tag_matches
        });
        debug!(?rule, removed, "Invalidated entries");
        Ok(removed)
    }

    // == Keys ==
    /// Lists keys, optionally filtered by a glob, in sorted order.
    pub fn keys(&self, pattern: Option<&str>) -> Vec<String> {
        let matcher = match pattern {
            None => KeyPattern::Any,
            Some(glob) => match KeyPattern::from_glob(glob) {
                Ok(matcher) => matcher,
                Err(err) => {
                    warn!("Ignoring key listing: {}", err);
                    return Vec::new();
                }
            },
        };

        let mut keys: Vec<String> = self
            .entries
            .keys()
            .filter(|key| matcher.matches(key))
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot::build(
            &self.stats,
            self.entries
                .iter()
                .map(|(key, entry)| (key.as_str(), entry.access_count, entry.size)),
        )
    }

    // == Maintenance ==
    /// Drops expired entries that fail revalidation and prunes idle access
    /// patterns.
    pub fn run_maintenance(&mut self) -> MaintenanceReport {
        let now = current_timestamp_ms();

        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        let mut report = MaintenanceReport::default();
        for key in expired {
            if self.settle_expired(&key, now, false) {
                report.revalidated += 1;
            } else {
                report.expired_removed += 1;
            }
        }

        report.patterns_pruned = self.patterns.prune_idle(now, PATTERN_RETENTION_MS);
        report.entries = self.entries.len();
        report.memory_usage = self.memory_usage;
        report
    }

    // == Destroy ==
    /// Drops all state. Call once the maintenance task has been stopped.
    pub fn destroy(&mut self) {
        self.entries.clear();
        self.patterns.clear();
        self.stats.reset();
        self.memory_usage = 0;
        debug!("Resource cache destroyed");
    }

    // == Introspection ==
    /// Returns the entry for `key` without affecting statistics or expiry.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn access_pattern(&self, key: &str) -> Option<&AccessPattern> {
        self.patterns.get(key)
    }

    /// Returns the summed size of all entries in bytes.
    pub fn memory_usage(&self) -> u64 {
        self.memory_usage
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Eviction ==
    /// Makes room for an entry of `size` bytes stored under `key`.
    fn ensure_space(&mut self, key: &str, size: u64, now: u64) {
        let replaced_size = self.entries.get(key).map(|entry| entry.size);

        if replaced_size.is_none() && self.entries.len() >= self.config.max_size {
            let victims = self.eviction.lru_victims(&self.entries);
            debug!(count = victims.len(), "Evicting least recently used entries");
            self.evict(&victims);
        }

        let projected = self.memory_usage - replaced_size.unwrap_or(0) + size;
        if projected > self.config.max_memory_usage {
            let needed = projected - self.config.max_memory_usage;
            let victims = self
                .eviction
                .value_victims(&self.entries, needed, now, |candidate| candidate == key);
            debug!(count = victims.len(), needed, "Evicting low-value entries");
            self.evict(&victims);
        }
    }

    fn evict(&mut self, victims: &[String]) {
        let mut evicted = 0;
        for key in victims {
            if self.remove_entry(key).is_some() {
                evicted += 1;
            }
        }
        self.stats.record_evictions(evicted);
    }

    // == Expiry ==
    /// Resolves an expired entry: keeps it with a fresh TTL if it revalidates,
    /// otherwise removes it. Returns whether the entry survived.
    fn settle_expired(&mut self, key: &str, now: u64, drop_pattern: bool) -> bool {
        let Some(entry) = self.entries.get(key) else {
            return false;
        };

        let valid = self.config.enable_validity_check
            && match self.revalidator.is_valid(key, entry) {
                Ok(valid) => valid,
                Err(err) => {
                    warn!(key, "Revalidation failed, treating entry as invalid: {}", err);
                    false
                }
            };

        if valid {
            let ttl = self.ttl_policy.calculate_optimal_ttl(
                self.patterns.get(key),
                entry.size,
                entry.last_modified,
                now,
            );
            if let Some(entry) = self.entries.get_mut(key) {
                entry.extend(i64::try_from(ttl).unwrap_or(i64::MAX), now);
            }
            debug!(key, ttl, "Expired entry revalidated");
            return true;
        }

        self.remove_entry(key);
        if drop_pattern {
            self.patterns.remove(key);
        }
        debug!(key, "Expired entry removed");
        false
    }

    // == Bookkeeping ==
    fn insert_entry(&mut self, key: String, entry: CacheEntry) {
        self.memory_usage += entry.size;
        if let Some(previous) = self.entries.insert(key, entry) {
            self.memory_usage -= previous.size;
        }
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let removed = self.entries.remove(key)?;
        self.memory_usage -= removed.size;
        Some(removed)
    }

    fn remove_matching<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&str, &CacheEntry) -> bool,
    {
        let matched: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, entry)| predicate(key.as_str(), entry))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &matched {
            self.remove_entry(key);
            self.patterns.remove(key);
        }
        matched.len()
    }

    fn next_seq(&mut self) -> u64 {
        self.access_seq += 1;
        self.access_seq
    }
}
