//! Cache Entry Store Module
//!
//! Typed layer over a [`KeyValueStore`]: encodes entries as JSON and absorbs
//! decode and overflow failures so they never reach the request path.

use tracing::{debug, warn};

use crate::cache::CacheEntry;
use crate::error::StoreError;
use crate::store::KeyValueStore;

// == Write Outcome ==
/// Result of a persisted write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Entry is persisted
    Stored,
    /// Backend quota would be exceeded; nothing was written
    Overflow,
    /// Backend failed for another reason; nothing was written
    Failed,
}

// == Cache Entry Store ==
#[derive(Debug)]
pub struct CacheEntryStore {
    backend: Box<dyn KeyValueStore>,
}

impl CacheEntryStore {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    // == Read ==
    /// Loads and decodes the entry under `key`.
    ///
    /// Missing or corrupt records both read as `None`.
    pub fn read(&self, key: &str) -> Option<CacheEntry> {
        let raw = self.backend.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Discarding unreadable cache record {}: {}", key, StoreError::from(e));
                None
            }
        }
    }

    // == Write ==
    /// Encodes and persists `entry` under `key`.
    pub fn write(&mut self, key: &str, entry: &CacheEntry) -> WriteOutcome {
        let encoded = match serde_json::to_string(entry) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode cache entry {}: {}", key, e);
                return WriteOutcome::Failed;
            }
        };

        match self.backend.set(key, encoded) {
            Ok(()) => WriteOutcome::Stored,
            Err(StoreError::QuotaExceeded { required, quota }) => {
                debug!(
                    "Storage overflow writing {} ({} of {} bytes)",
                    key, required, quota
                );
                WriteOutcome::Overflow
            }
            Err(e) => {
                warn!("Dropping cache write for {}: {}", key, e);
                WriteOutcome::Failed
            }
        }
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            warn!("Failed to remove cache record {}: {}", key, e);
        }
    }

    pub fn remove_many(&mut self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        if let Err(e) = self.backend.remove_many(keys) {
            warn!("Failed to remove {} cache records: {}", keys.len(), e);
        }
    }

    // == Clear ==
    pub fn clear(&mut self) {
        if let Err(e) = self.backend.clear() {
            warn!("Failed to clear cache storage: {}", e);
        }
    }

    /// Lists every key in the backend, including ones this cache did not write.
    pub fn keys(&self) -> Vec<String> {
        self.backend.keys()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.backend.get(key).is_some()
    }
}
