//! File Store Module
//!
//! Persistent backend: the quota-bounded map is mirrored to a JSON file so
//! cached responses survive restarts.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::store::{KeyValueStore, MemoryStore};

// == File Store ==
/// Key/value store persisted as a single JSON object on disk.
///
/// Every mutation rewrites the file through a temporary sibling and a rename,
/// so a crash never leaves a half-written file behind.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    // == Open ==
    /// Opens (or creates) the store at `path`.
    ///
    /// A file that cannot be parsed is treated as empty. Records that do not
    /// fit the quota are skipped.
    pub fn open(path: impl Into<PathBuf>, quota_bytes: usize) -> Result<Self, StoreError> {
        let path = path.into();
        let mut inner = MemoryStore::new(quota_bytes);

        if path.exists() {
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str::<HashMap<String, String>>(&content) {
                Ok(items) => {
                    for (key, value) in items {
                        if let Err(e) = inner.set(&key, value) {
                            warn!("Skipping persisted record {}: {}", key, e);
                        }
                    }
                }
                Err(e) => warn!("Ignoring unreadable cache file {}: {}", path.display(), e),
            }
        }

        debug!(
            "Opened file store at {} with {} records",
            path.display(),
            inner.len()
        );
        Ok(Self { path, inner })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // == Flush ==
    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(self.inner.items())?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Flushes after a removal, putting `removed` back in memory if the file
    /// could not be rewritten.
    fn flush_or_restore(&mut self, removed: Vec<(String, String)>) -> Result<(), StoreError> {
        if let Err(e) = self.flush() {
            warn!(
                "Could not persist removal of {} records, keeping them: {}",
                removed.len(),
                e
            );
            for (key, value) in removed {
                self.inner.set(&key, value)?;
            }
            return Err(e);
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let previous = self.inner.get(key);
        self.inner.set(key, value)?;

        if let Err(e) = self.flush() {
            // Roll the in-memory view back to what is on disk
            match previous {
                Some(old) => self.inner.set(key, old)?,
                None => self.inner.remove(key)?,
            }
            return Err(e);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.remove_many(&[key.to_string()])
    }

    fn remove_many(&mut self, keys: &[String]) -> Result<(), StoreError> {
        let mut removed = Vec::new();
        for key in keys {
            if let Some(value) = self.inner.get(key) {
                self.inner.remove(key)?;
                removed.push((key.clone(), value));
            }
        }
        if removed.is_empty() {
            return Ok(());
        }
        self.flush_or_restore(removed)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        let removed: Vec<(String, String)> = self
            .inner
            .items()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self.inner.clear()?;
        self.flush_or_restore(removed)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store(quota: usize) -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::open(temp_dir.path().join("store.json"), quota)
            .expect("Open should succeed");
        (store, temp_dir)
    }

    #[test]
    fn test_set_writes_file() {
        let (mut store, _temp_dir) = create_test_store(1024);

        store.set("key", "value".to_string()).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("\"key\""));
        assert!(content.contains("\"value\""));
    }

    #[test]
    fn test_records_survive_reopen() {
        let (mut store, temp_dir) = create_test_store(1024);
        store.set("a", "1".to_string()).unwrap();
        store.set("b", "2".to_string()).unwrap();
        store.remove("a").unwrap();
        drop(store);

        let reopened = FileStore::open(temp_dir.path().join("store.json"), 1024).unwrap();
        assert_eq!(reopened.get("a"), None);
        assert_eq!(reopened.get("b"), Some("2".to_string()));
    }

    #[test]
    fn test_corrupt_file_opens_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");
        fs::write(&path, "{ this is not json").unwrap();

        let store = FileStore::open(&path, 1024).unwrap();

        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_quota_exceeded_does_not_touch_file() {
        let (mut store, _temp_dir) = create_test_store(8);
        store.set("a", "1".to_string()).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let result = store.set("b", "too large".to_string());

        assert!(matches!(result, Err(StoreError::QuotaExceeded { .. })));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn test_creates_missing_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("store.json");
        let mut store = FileStore::open(&path, 1024).unwrap();

        store.set("k", "v".to_string()).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_clear_empties_file() {
        let (mut store, temp_dir) = create_test_store(1024);
        store.set("a", "1".to_string()).unwrap();

        store.clear().unwrap();

        let reopened = FileStore::open(temp_dir.path().join("store.json"), 1024).unwrap();
        assert!(reopened.keys().is_empty());
    }

    #[test]
    fn test_failed_flush_keeps_removed_records() {
        let (mut store, _temp_dir) = create_test_store(1024);
        store.set("a", "1".to_string()).unwrap();
        store.set("b", "2".to_string()).unwrap();

        // A directory in place of the file makes the rename fail
        fs::remove_file(store.path()).unwrap();
        fs::create_dir(store.path()).unwrap();
        fs::write(store.path().join("blocker"), "x").unwrap();

        assert!(store.remove_many(&["a".to_string()]).is_err());
        assert!(store.clear().is_err());

        assert_eq!(store.get("a"), Some("1".to_string()));
        assert_eq!(store.get("b"), Some("2".to_string()));
    }
}
