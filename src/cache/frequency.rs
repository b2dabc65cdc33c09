//! Frequency Tracker Module
//!
//! Counts lookups per cache key as input to eviction.

use std::collections::HashMap;

// == Frequency Tracker ==
/// Per-key access counters.
///
/// Counts only ever grow while the cache lives; they have no bearing on
/// freshness.
#[derive(Debug, Default)]
pub struct FrequencyTracker {
    counts: HashMap<String, u64>,
}

impl FrequencyTracker {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }

    // == Record ==
    /// Counts one lookup of `key` and returns the new total.
    pub fn record(&mut self, key: &str) -> u64 {
        let count = self.counts.entry(key.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    // == Count ==
    /// Lookups recorded for `key`, zero if never seen.
    pub fn count(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    // == Contains ==
    pub fn contains(&self, key: &str) -> bool {
        self.counts.contains_key(key)
    }

    /// Iterates over tracked keys and their counts.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
