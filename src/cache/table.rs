//! Cache Table Module
//!
//! Main cache engine: the in-memory table of live entries, hydrated lazily
//! from the entry store, with TTL expiry, session reset and overflow
//! eviction.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::eviction::Candidate;
use crate::cache::{
    CacheEntry, CacheEntryStore, CacheKey, CacheStats, Clock, EvictionPolicy, FrequencyTracker,
    UrlAllowList, WriteOutcome,
};
use crate::config::Config;
use crate::store::KeyValueStore;

// == Cache Table ==
/// Hot layer of the cache.
///
/// Every resident key has a persisted record behind it, but a key missing
/// from memory may still be in the store; reads check there before reporting
/// a miss.
#[derive(Debug)]
pub struct CacheTable {
    /// Resident entries
    entries: HashMap<String, CacheEntry>,
    /// Persistent layer
    store: CacheEntryStore,
    /// Lookup counters for eviction
    frequency: FrequencyTracker,
    eviction: EvictionPolicy,
    stats: CacheStats,
    allow_list: Arc<UrlAllowList>,
    /// Writes under this URL start a new session
    entry_url: Option<String>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl CacheTable {
    // == Constructor ==
    /// Creates a table over `store` whose entries live for `ttl`.
    pub fn new(
        store: CacheEntryStore,
        allow_list: Arc<UrlAllowList>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            entries: HashMap::new(),
            store,
            frequency: FrequencyTracker::new(),
            eviction: EvictionPolicy::default(),
            stats: CacheStats::new(),
            allow_list,
            entry_url: None,
            ttl,
            clock,
        }
    }

    /// Creates a table from configuration over an already opened backend.
    pub fn from_config(
        config: &Config,
        backend: Box<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let allow_list = Arc::new(UrlAllowList::new(&config.cache_url_list));
        Self::new(CacheEntryStore::new(backend), allow_list, config.ttl(), clock)
            .with_entry_url(config.entry_init_url.clone())
            .with_eviction(EvictionPolicy::new(config.eviction_fraction))
    }

    pub fn with_entry_url(mut self, entry_url: Option<String>) -> Self {
        self.entry_url = entry_url;
        self
    }

    pub fn with_eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }

    // == Record Access ==
    /// Counts a lookup of `key` for eviction purposes.
    pub fn record_access(&mut self, key: &CacheKey) -> u64 {
        self.frequency.record(key.as_str())
    }

    // == Read ==
    /// Returns the cached value for `key` if it is fresh.
    ///
    /// An expired entry is removed from memory and storage in the same call,
    /// so it can never be observed again.
    pub fn read(&mut self, key: &CacheKey) -> Option<Value> {
        let raw = key.as_str();
        let now = self.clock.now();

        let entry = match self.load(raw) {
            Some(entry) => entry,
            None => {
                self.stats.record_miss();
                debug!("Cache miss: {}", raw);
                return None;
            }
        };

        if entry.is_expired(now) {
            self.expire(raw);
            self.stats.record_expiration();
            self.stats.record_miss();
            debug!("Cache entry expired: {}", raw);
            return None;
        }

        self.stats.record_hit();
        debug!("Cache hit: {}", raw);
        Some(entry.value)
    }

    fn load(&mut self, raw: &str) -> Option<CacheEntry> {
        if let Some(entry) = self.entries.get(raw) {
            return Some(entry.clone());
        }
        let entry = self.store.read(raw)?;
        self.entries.insert(raw.to_string(), entry.clone());
        self.stats.set_resident_entries(self.entries.len());
        Some(entry)
    }

    // == Write ==
    /// Stores `value` under `key` with a fresh TTL.
    ///
    /// A write under the entry URL resets the session first. On storage
    /// overflow a batch of rarely used entries is evicted and the write is
    /// retried once; if it still does not fit it is dropped.
    pub fn write(&mut self, key: &CacheKey, value: Value) -> WriteOutcome {
        if self.entry_url.as_deref() == Some(key.url()) {
            self.reset_session();
        }

        let raw = key.as_str();
        let entry = CacheEntry::new(value, self.clock.now(), self.ttl);

        let mut outcome = self.store.write(raw, &entry);
        if outcome == WriteOutcome::Overflow && self.evict_for(raw) > 0 {
            outcome = self.store.write(raw, &entry);
        }

        match outcome {
            WriteOutcome::Stored => {
                self.entries.insert(raw.to_string(), entry);
            }
            WriteOutcome::Overflow | WriteOutcome::Failed => {
                // Whatever is still persisted is what the next read sees
                self.entries.remove(raw);
                self.stats.record_dropped_write();
                warn!("Cache write dropped for {} ({:?})", raw, outcome);
            }
        }
        self.stats.set_resident_entries(self.entries.len());
        outcome
    }

    // == Evict ==
    /// Evicts one batch of stored entries to make room for `writing`.
    ///
    /// Returns the number of entries removed.
    fn evict_for(&mut self, writing: &str) -> usize {
        let candidates: Vec<Candidate> = self
            .store
            .keys()
            .into_iter()
            .filter(|key| key != writing && self.allow_list.owns_key(key))
            .map(|key| {
                let expires_at = self
                    .entries
                    .get(&key)
                    .map(|e| e.expires_at)
                    .or_else(|| self.store.read(&key).map(|e| e.expires_at));
                Candidate { key, expires_at }
            })
            .collect();

        let victims = self.eviction.select_victims(&self.frequency, candidates);
        for key in &victims {
            self.entries.remove(key);
        }
        self.store.remove_many(&victims);
        self.stats.record_evictions(victims.len());

        if !victims.is_empty() {
            info!("Storage full: evicted {} least used entries", victims.len());
        }
        victims.len()
    }

    // == Expire ==
    /// Removes `raw` from memory and storage. Returns true if it was cached.
    pub fn expire(&mut self, raw: &str) -> bool {
        let resident = self.entries.remove(raw).is_some();
        let stored = self.store.contains(raw);
        self.store.remove(raw);
        self.stats.set_resident_entries(self.entries.len());
        resident || stored
    }

    // == Session Reset ==
    /// Drops every resident entry and every stored record owned by the
    /// allow-list.
    pub fn reset_session(&mut self) -> usize {
        self.entries.clear();
        let owned: Vec<String> = self
            .store
            .keys()
            .into_iter()
            .filter(|key| self.allow_list.owns_key(key))
            .collect();
        self.store.remove_many(&owned);

        self.stats.record_session_reset();
        self.stats.set_resident_entries(0);
        info!("Session reset: cleared {} cached responses", owned.len());
        owned.len()
    }

    // == Clear ==
    /// Wipes the whole storage namespace, including records not written by
    /// this cache.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.store.clear();
        self.stats.set_resident_entries(0);
    }

    // == Purge Expired ==
    /// Removes every expired entry owned by the allow-list.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let expired: Vec<String> = self
            .store
            .keys()
            .into_iter()
            .filter(|key| self.allow_list.owns_key(key))
            .filter(|key| {
                self.entries
                    .get(key)
                    .cloned()
                    .or_else(|| self.store.read(key))
                    .is_some_and(|entry| entry.is_expired(now))
            })
            .collect();

        for key in &expired {
            self.entries.remove(key);
            self.stats.record_expiration();
        }
        self.store.remove_many(&expired);
        self.stats.set_resident_entries(self.entries.len());
        expired.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_resident_entries(self.entries.len());
        stats
    }

    pub fn frequency(&self) -> &FrequencyTracker {
        &self.frequency
    }

    pub fn allow_list(&self) -> &UrlAllowList {
        &self.allow_list
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Length ==
    /// Returns the number of resident entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if `key` is resident in memory.
    pub fn is_resident(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key.as_str())
    }

    /// True if `key` has a persisted record.
    pub fn is_stored(&self, key: &CacheKey) -> bool {
        self.store.contains(key.as_str())
    }
}
