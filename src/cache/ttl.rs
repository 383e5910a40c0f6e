//! TTL Policy Module
//!
//! Derives an entry's time-to-live from how it is being used.

use crate::cache::AccessPattern;

// == Constants ==
const ONE_MB: u64 = 1024 * 1024;
const FRESHNESS_WINDOW_MS: u64 = 5 * 60 * 1000;

// == TTL Policy ==
/// Adaptive TTL calculation around a configured default.
///
/// Hot, small, stable and regularly read entries live longest; just-modified
/// or large entries expire sooner.
#[derive(Debug, Clone, Copy)]
pub struct TtlPolicy {
    default_ttl_ms: u64,
}

impl TtlPolicy {
    pub fn new(default_ttl_ms: u64) -> Self {
        Self { default_ttl_ms }
    }

    // == Optimal TTL ==
    /// Computes the TTL in milliseconds for an entry of `size` bytes last
    /// written at `last_modified`, given the key's access history.
    ///
    /// # Arguments
    /// * `pattern` - Access history of the key, if any
    /// * `size` - Estimated entry size in bytes
    /// * `last_modified` - Last write (Unix milliseconds)
    /// * `now` - Current time (Unix milliseconds)
    pub fn calculate_optimal_ttl(
        &self,
        pattern: Option<&AccessPattern>,
        size: u64,
        last_modified: u64,
        now: u64,
    ) -> u64 {
        let Some(pattern) = pattern else {
            return self.default_ttl_ms;
        };

        let mut multiplier = if pattern.access_count > 10 {
            2.0
        } else if pattern.access_count > 5 {
            1.5
        } else {
            1.0
        };

        if size > ONE_MB {
            multiplier *= 0.5;
        }

        if now.saturating_sub(last_modified) < FRESHNESS_WINDOW_MS {
            multiplier *= 0.33;
        }

        let heuristic = self.default_ttl_ms as f64 * multiplier;

        if pattern.average_interval > 0.0 && pattern.total_accesses > 3 {
            let predicted = (pattern.average_interval * 1.5).min(self.default_ttl_ms as f64 * 3.0);
            if predicted > heuristic {
                return predicted.floor() as u64;
            }
        }

        heuristic.floor() as u64
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: u64 = 3_600_000;
    const NOW: u64 = 100 * HOUR;
    const STALE: u64 = NOW - HOUR;

    fn pattern(access_count: u64, total_accesses: u64, average_interval: f64) -> AccessPattern {
        AccessPattern {
            access_count,
            total_accesses,
            last_access: NOW,
            average_interval,
        }
    }

    #[test]
    fn test_no_pattern_returns_default() {
        let policy = TtlPolicy::new(HOUR);
        assert_eq!(policy.calculate_optimal_ttl(None, ONE_MB * 4, NOW, NOW), HOUR);
    }

    #[test]
    fn test_frequency_tiers_are_not_cumulative() {
        let policy = TtlPolicy::new(HOUR);

        assert_eq!(policy.calculate_optimal_ttl(Some(&pattern(5, 0, 0.0)), 10, STALE, NOW), HOUR);
        assert_eq!(
            policy.calculate_optimal_ttl(Some(&pattern(6, 0, 0.0)), 10, STALE, NOW),
            HOUR * 3 / 2
        );
        assert_eq!(policy.calculate_optimal_ttl(Some(&pattern(11, 0, 0.0)), 10, STALE, NOW), HOUR * 2);
    }

    #[test]
    fn test_large_entries_live_shorter() {
        let policy = TtlPolicy::new(HOUR);
        let ttl = policy.calculate_optimal_ttl(Some(&pattern(11, 0, 0.0)), ONE_MB + 1, STALE, NOW);
        assert_eq!(ttl, HOUR);
    }

    #[test]
    fn test_fresh_entries_live_shorter() {
        let policy = TtlPolicy::new(HOUR);
        let ttl = policy.calculate_optimal_ttl(Some(&pattern(1, 0, 0.0)), 10, NOW - 1_000, NOW);
        assert_eq!(ttl, (HOUR as f64 * 0.33).floor() as u64);
    }

    #[test]
    fn test_hot_entry_outlives_cold_entry() {
        let policy = TtlPolicy::new(HOUR);
        let hot = policy.calculate_optimal_ttl(Some(&pattern(11, 11, 0.0)), 64, STALE, NOW);
        let cold = policy.calculate_optimal_ttl(Some(&pattern(0, 0, 0.0)), 64, STALE, NOW);
        assert!(hot > cold);
    }

    #[test]
    fn test_prediction_overrides_when_longer() {
        let policy = TtlPolicy::new(HOUR);
        // 1.5 * 2h = 3h beats the plain 1h heuristic
        let ttl = policy.calculate_optimal_ttl(Some(&pattern(4, 4, 2.0 * HOUR as f64)), 10, STALE, NOW);
        assert_eq!(ttl, 3 * HOUR);
    }

    #[test]
    fn test_prediction_is_capped() {
        let policy = TtlPolicy::new(HOUR);
        let ttl = policy.calculate_optimal_ttl(Some(&pattern(4, 4, 100.0 * HOUR as f64)), 10, STALE, NOW);
        assert_eq!(ttl, 3 * HOUR);
    }

    #[test]
    fn test_prediction_needs_enough_history() {
        let policy = TtlPolicy::new(HOUR);
        let ttl = policy.calculate_optimal_ttl(Some(&pattern(3, 3, 2.0 * HOUR as f64)), 10, STALE, NOW);
        assert_eq!(ttl, HOUR);
    }

    #[test]
    fn test_prediction_ignored_when_shorter() {
        let policy = TtlPolicy::new(HOUR);
        let ttl = policy.calculate_optimal_ttl(Some(&pattern(11, 11, 1_000.0)), 10, STALE, NOW);
        assert_eq!(ttl, 2 * HOUR);
    }

    #[test]
    fn test_zero_default_disables_caching() {
        let policy = TtlPolicy::new(0);
        assert_eq!(policy.calculate_optimal_ttl(Some(&pattern(11, 11, 0.0)), 10, STALE, NOW), 0);
    }
}
