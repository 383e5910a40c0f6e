//! Eviction Policy Module
//!
//! Picks eviction victims under count pressure (LRU) and memory pressure
//! (value score).

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::cache::CacheEntry;

// == Constants ==
/// Share of the cache dropped by one LRU pass.
const LRU_EVICTION_FRACTION: f64 = 0.25;

const MS_PER_HOUR: f64 = 3_600_000.0;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// == Value Score Weights ==
/// Coefficients of the value score. Lower scores are evicted first.
///
/// `score = access_count * frequency - age_hours * age - size_mb * size
///          + recency_bonus (if accessed within recency_window_ms)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueScoreWeights {
    pub frequency: f64,
    pub age: f64,
    pub size: f64,
    pub recency_bonus: f64,
    pub recency_window_ms: u64,
}

impl Default for ValueScoreWeights {
    fn default() -> Self {
        Self {
            frequency: 1.0,
            age: 1.0,
            size: 1.0,
            recency_bonus: 10.0,
            recency_window_ms: 5 * 60 * 1000,
        }
    }
}

// == Eviction Policy ==
#[derive(Debug, Clone, Default)]
pub struct EvictionPolicy {
    weights: ValueScoreWeights,
}

impl EvictionPolicy {
    pub fn new(weights: ValueScoreWeights) -> Self {
        Self { weights }
    }

    // == LRU Victims ==
    /// Returns the oldest quarter of `entries` by last access (at least one).
    pub fn lru_victims(&self, entries: &HashMap<String, CacheEntry>) -> Vec<String> {
        if entries.is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<(&String, &CacheEntry)> = entries.iter().collect();
        candidates.sort_by_key(|(_, entry)| (entry.last_accessed, entry.access_seq));

        let count = ((entries.len() as f64 * LRU_EVICTION_FRACTION).floor() as usize).max(1);
        candidates
            .into_iter()
            .take(count)
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == Value Score ==
    /// Scores an entry's worth to the cache at `now`.
    pub fn value_score(&self, entry: &CacheEntry, now: u64) -> f64 {
        let w = &self.weights;
        let age_hours = now.saturating_sub(entry.created_at) as f64 / MS_PER_HOUR;
        let size_mb = entry.size as f64 / BYTES_PER_MB;

        let mut score =
            entry.access_count as f64 * w.frequency - age_hours * w.age - size_mb * w.size;
        if now.saturating_sub(entry.last_accessed) < w.recency_window_ms {
            score += w.recency_bonus;
        }
        score
    }

    // == Value Victims ==
    /// Returns the lowest-scoring entries whose combined size reaches
    /// `bytes_needed`, or every entry if that is not enough.
    ///
    /// Entries for which `skip` returns true are never chosen.
    pub fn value_victims<F>(
        &self,
        entries: &HashMap<String, CacheEntry>,
        bytes_needed: u64,
        now: u64,
        skip: F,
    ) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        let mut scored: Vec<(f64, u64, &String, u64)> = entries
            .iter()
            .filter(|(key, _)| !skip(key.as_str()))
            .map(|(key, entry)| (self.value_score(entry, now), entry.access_seq, key, entry.size))
            .collect();
        scored.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        let mut freed = 0u64;
        let mut victims = Vec::new();
        for (_, _, key, size) in scored {
            if freed >= bytes_needed {
                break;
            }
            freed += size;
            victims.push(key.clone());
        }
        victims
    }
}
