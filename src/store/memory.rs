//! Memory Store Module
//!
//! Session-scoped backend: a quota-bounded HashMap that lives as long as the
//! cache instance.

use std::collections::HashMap;

use crate::error::StoreError;
use crate::store::KeyValueStore;

// == Memory Store ==
/// In-memory key/value store with a byte quota.
///
/// Usage is the sum of key and value lengths, mirroring how browser storage
/// accounts for its quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
    used_bytes: usize,
    quota_bytes: usize,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store that accepts at most `quota_bytes`.
    pub fn new(quota_bytes: usize) -> Self {
        Self {
            items: HashMap::new(),
            used_bytes: 0,
            quota_bytes,
        }
    }

    /// Bytes currently in use.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// Configured byte quota.
    pub fn quota_bytes(&self) -> usize {
        self.quota_bytes
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn items(&self) -> &HashMap<String, String> {
        &self.items
    }
}

fn footprint(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let previous = self
            .items
            .get(key)
            .map(|old| footprint(key, old))
            .unwrap_or(0);
        let required = self.used_bytes - previous + footprint(key, &value);

        if required > self.quota_bytes {
            return Err(StoreError::QuotaExceeded {
                required,
                quota: self.quota_bytes,
            });
        }

        self.items.insert(key.to_string(), value);
        self.used_bytes = required;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if let Some(old) = self.items.remove(key) {
            self.used_bytes -= footprint(key, &old);
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.items.clear();
        self.used_bytes = 0;
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }
}
