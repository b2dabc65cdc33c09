//! Request Interceptor
//!
//! Decides per call whether a request is answered from cache or forwarded,
//! and writes forwarded results back into the cache.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheKey, CacheStats, CacheTable, UrlAllowList};
use crate::error::TransportError;
use crate::transport::{Method, Transport};

// == Response Cache ==
/// Shared handle to one cache instance.
///
/// Cloning is cheap; clones operate on the same table. The allow-list is kept
/// outside the lock since it never changes.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    table: Arc<RwLock<CacheTable>>,
    allow_list: Arc<UrlAllowList>,
}

impl ResponseCache {
    pub fn new(table: CacheTable) -> Self {
        let allow_list = Arc::new(table.allow_list().clone());
        Self {
            table: Arc::new(RwLock::new(table)),
            allow_list,
        }
    }

    /// True if calls to `url` take part in caching.
    pub fn is_cacheable(&self, url: &str) -> bool {
        self.allow_list.matches(url)
    }

    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.table.read().await.stats()
    }

    /// Lookups recorded for the call `url` with `params`.
    pub async fn access_count(&self, url: &str, params: Option<&Value>) -> u64 {
        let key = CacheKey::new(url, params);
        self.table.read().await.frequency().count(key.as_str())
    }

    /// Drops the cached response for one call. Returns true if one existed.
    pub async fn expire(&self, url: &str, params: Option<&Value>) -> bool {
        let key = CacheKey::new(url, params);
        self.table.write().await.expire(key.as_str())
    }

    /// Drops every cached response, as a login under the entry URL would.
    pub async fn reset(&self) -> usize {
        self.table.write().await.reset_session()
    }

    /// Wipes the whole storage namespace.
    pub async fn clear(&self) {
        self.table.write().await.clear();
    }

    /// Removes every expired entry. Returns the number removed.
    pub async fn purge_expired(&self) -> usize {
        self.table.write().await.purge_expired()
    }
}

// == Intercept ==
/// Answers one call from cache or through `forward`.
///
/// URLs outside the allow-list go straight to `forward` without being
/// counted. Otherwise the lookup is counted, a fresh entry is returned
/// without calling `forward`, and on a miss the forwarded result is cached
/// before being returned. Transport errors pass through and are not cached.
///
/// The table lock is released while `forward` runs, so two concurrent misses
/// for the same key both reach the transport.
pub async fn intercept<F, Fut>(
    cache: &ResponseCache,
    method: Method,
    url: &str,
    params: Option<&Value>,
    forward: F,
) -> Result<Value, TransportError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value, TransportError>>,
{
    if !cache.is_cacheable(url) {
        debug!("{} {} bypasses cache", method, url);
        return forward().await;
    }

    let key = CacheKey::new(url, params);
    let cached = {
        let mut table = cache.table.write().await;
        table.record_access(&key);
        table.read(&key)
    };

    if let Some(value) = cached {
        debug!("{} {} served from cache", method, url);
        return Ok(value);
    }

    let value = forward().await?;
    cache.table.write().await.write(&key, value.clone());
    Ok(value)
}

// == Cached Transport ==
/// A transport whose GET and POST go through the cache first.
///
/// It implements [`Transport`] itself, so callers cannot tell it apart from
/// the transport it wraps.
#[derive(Debug)]
pub struct CachedTransport<T> {
    inner: T,
    cache: ResponseCache,
}

impl<T: Transport> CachedTransport<T> {
    pub fn new(inner: T, cache: ResponseCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// The wrapped transport, bypassing the cache.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for CachedTransport<T> {
    async fn get(&self, url: &str, params: Option<&Value>) -> Result<Value, TransportError> {
        intercept(&self.cache, Method::Get, url, params, || {
            self.inner.get(url, params)
        })
        .await
    }

    async fn post(&self, url: &str, params: Option<&Value>) -> Result<Value, TransportError> {
        intercept(&self.cache, Method::Post, url, params, || {
            self.inner.post(url, params)
        })
        .await
    }
}
