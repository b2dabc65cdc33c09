//! Eviction Policy Module
//!
//! Picks which stored entries to drop when the storage backend runs out of
//! room: least frequently looked-up first.

use chrono::{DateTime, Utc};

use crate::cache::FrequencyTracker;

/// Default share of candidates removed per overflow
pub const DEFAULT_EVICTION_FRACTION: f64 = 0.10;

// == Eviction Candidate ==
/// A stored key that may be evicted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub key: String,
    /// Expiry of the stored entry, `None` if it could not be read
    pub expires_at: Option<DateTime<Utc>>,
}

// == Eviction Policy ==
/// Lowest-frequency-first eviction with a bounded batch per overflow.
#[derive(Debug, Clone, Copy)]
pub struct EvictionPolicy {
    fraction: f64,
}

impl EvictionPolicy {
    /// Creates a policy that evicts `fraction` of the candidates per overflow.
    ///
    /// Out-of-range fractions fall back to the default.
    pub fn new(fraction: f64) -> Self {
        let fraction = if fraction > 0.0 && fraction <= 1.0 {
            fraction
        } else {
            DEFAULT_EVICTION_FRACTION
        };
        Self { fraction }
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    // == Batch Size ==
    /// Number of keys evicted out of `candidates`, at least one when any exist.
    pub fn batch_size(&self, candidates: usize) -> usize {
        if candidates == 0 {
            return 0;
        }
        ((candidates as f64 * self.fraction).floor() as usize).clamp(1, candidates)
    }

    // == Select Victims ==
    /// Orders candidates by access count, then oldest expiry, then key, and
    /// returns the first batch.
    ///
    /// Candidates with an unreadable entry sort as the oldest.
    pub fn select_victims(
        &self,
        tracker: &FrequencyTracker,
        mut candidates: Vec<Candidate>,
    ) -> Vec<String> {
        let batch = self.batch_size(candidates.len());
        candidates.sort_by(|a, b| {
            tracker
                .count(&a.key)
                .cmp(&tracker.count(&b.key))
                .then_with(|| a.expires_at.cmp(&b.expires_at))
                .then_with(|| a.key.cmp(&b.key))
        });
        candidates.into_iter().take(batch).map(|c| c.key).collect()
    }
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EVICTION_FRACTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(key: &str, expires_ms: i64) -> Candidate {
        Candidate {
            key: key.to_string(),
            expires_at: DateTime::from_timestamp_millis(expires_ms),
        }
    }

    #[test]
    fn test_batch_size_minimum_one() {
        let policy = EvictionPolicy::default();
        assert_eq!(policy.batch_size(0), 0);
        assert_eq!(policy.batch_size(1), 1);
        assert_eq!(policy.batch_size(9), 1);
        assert_eq!(policy.batch_size(20), 2);
        assert_eq!(policy.batch_size(105), 10);
    }

    #[test]
    fn test_invalid_fraction_falls_back() {
        assert_eq!(EvictionPolicy::new(0.0).fraction(), DEFAULT_EVICTION_FRACTION);
        assert_eq!(EvictionPolicy::new(2.0).fraction(), DEFAULT_EVICTION_FRACTION);
        assert_eq!(EvictionPolicy::new(0.5).fraction(), 0.5);
    }

    #[test]
    fn test_lowest_frequency_first() {
        let mut tracker = FrequencyTracker::new();
        for _ in 0..3 {
            tracker.record("hot");
        }
        tracker.record("warm");

        let policy = EvictionPolicy::new(0.5);
        let victims = policy.select_victims(
            &tracker,
            vec![
                candidate("hot", 100),
                candidate("warm", 100),
                candidate("cold", 100),
                candidate("lukewarm", 100),
            ],
        );

        // cold and lukewarm were never counted
        assert_eq!(victims, vec!["cold".to_string(), "lukewarm".to_string()]);
    }

    #[test]
    fn test_ties_broken_by_oldest_expiry() {
        let mut tracker = FrequencyTracker::new();
        tracker.record("a");
        tracker.record("b");

        let policy = EvictionPolicy::new(0.5);
        let victims =
            policy.select_victims(&tracker, vec![candidate("a", 500), candidate("b", 200)]);

        assert_eq!(victims, vec!["b".to_string()]);
    }

    #[test]
    fn test_unreadable_entries_go_first_among_equals() {
        let tracker = FrequencyTracker::new();
        let policy = EvictionPolicy::new(0.5);

        let victims = policy.select_victims(
            &tracker,
            vec![
                candidate("readable", 100),
                Candidate {
                    key: "corrupt".to_string(),
                    expires_at: None,
                },
            ],
        );

        assert_eq!(victims, vec!["corrupt".to_string()]);
    }
}
