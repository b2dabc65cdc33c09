//! Storage Module
//!
//! Key/value storage backends underneath the response cache. Both backends
//! hold string values under string keys and enforce a byte quota.

mod file;
mod memory;

use std::fmt::Debug;

use crate::config::{Config, StorageMode};
use crate::error::{Result, StoreError};

pub use file::FileStore;
pub use memory::MemoryStore;

// == Public Constants ==
/// Default byte quota for a storage backend (5 MiB)
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

// == Key Value Store ==
/// A size-bounded string key/value store.
///
/// A write that would exceed the quota fails with [`StoreError::QuotaExceeded`]
/// and must leave the store unchanged.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Returns the raw value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String) -> std::result::Result<(), StoreError>;

    /// Removes `key`. Missing keys are a no-op.
    fn remove(&mut self, key: &str) -> std::result::Result<(), StoreError>;

    /// Removes every key in `keys`.
    fn remove_many(&mut self, keys: &[String]) -> std::result::Result<(), StoreError> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }

    /// Removes everything.
    fn clear(&mut self) -> std::result::Result<(), StoreError>;

    /// Lists all stored keys.
    fn keys(&self) -> Vec<String>;
}

// == Backend Selection ==
/// Opens the backend selected by `config.mode`.
///
/// Session mode lives in memory and dies with the process; persistent mode
/// is backed by a JSON file that survives restarts.
pub fn open_backend(config: &Config) -> Result<Box<dyn KeyValueStore>> {
    match config.mode {
        StorageMode::Session => Ok(Box::new(MemoryStore::new(config.storage_quota_bytes))),
        StorageMode::Persistent => {
            let path = config.resolve_storage_path()?;
            let store = FileStore::open(path, config.storage_quota_bytes)?;
            Ok(Box::new(store))
        }
    }
}
