//! Expiry Purge Task
//!
//! Background task that periodically removes expired cache entries, so
//! responses nobody asks for again do not sit in storage until the next
//! overflow.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::interceptor::ResponseCache;

/// Spawns a background task that periodically purges expired entries.
///
/// The task loops forever, sleeping for `interval` between runs, and takes
/// the cache's write lock for each purge.
///
/// # Arguments
/// * `cache` - Handle to the cache to purge
/// * `interval` - Time between purge runs
///
/// # Returns
/// A JoinHandle for the spawned task; abort it on shutdown.
///
/// # Example
/// ```ignore
/// let client = ApiCache::new(config, HttpTransport::new())?.start();
/// let purge_handle = spawn_purge_task(client.cache().clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// purge_handle.abort();
/// ```
pub fn spawn_purge_task(cache: ResponseCache, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting expiry purge task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired().await;

            if removed > 0 {
                info!("Expiry purge: removed {} expired entries", removed);
            } else {
                debug!("Expiry purge: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::cache::{CacheEntryStore, CacheKey, CacheTable, ManualClock, UrlAllowList};
    use crate::store::MemoryStore;

    fn create_cache(clock: &ManualClock) -> ResponseCache {
        let mut table = CacheTable::new(
            CacheEntryStore::new(Box::new(MemoryStore::new(4096))),
            Arc::new(UrlAllowList::new(["*"])),
            chrono::Duration::minutes(1),
            Arc::new(clock.clone()),
        );
        table.write(&CacheKey::new("/short", None), json!("value"));
        ResponseCache::new(table)
    }

    #[tokio::test]
    async fn test_purge_task_removes_expired_entries() {
        let clock = ManualClock::default();
        let cache = create_cache(&clock);
        clock.advance(chrono::Duration::minutes(2));

        let handle = spawn_purge_task(cache.clone(), Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(200)).await;

        let stats = cache.stats().await;
        assert_eq!(stats.expirations, 1, "Expired entry should have been purged");
        assert_eq!(stats.resident_entries, 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_purge_task_preserves_fresh_entries() {
        let clock = ManualClock::default();
        let cache = create_cache(&clock);

        let handle = spawn_purge_task(cache.clone(), Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(cache.stats().await.expirations, 0);
        assert!(cache.expire("/short", None).await, "Fresh entry should remain");

        handle.abort();
    }

    #[tokio::test]
    async fn test_purge_task_can_be_aborted() {
        let clock = ManualClock::default();
        let handle = spawn_purge_task(create_cache(&clock), Duration::from_secs(1));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
