//! Cache Construction
//!
//! Builds a cache instance from configuration and installs it in front of a
//! transport.

use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::{CacheTable, Clock, SystemClock, UrlAllowList};
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::interceptor::{CachedTransport, ResponseCache};
use crate::store::{self, KeyValueStore};
use crate::transport::Transport;

// == Api Cache ==
/// A configured cache waiting to be installed on its transport.
///
/// # Example
/// ```ignore
/// let config = Config {
///     expires_minutes: 1.0,
///     cache_url_list: vec!["/api/users".to_string()],
///     ..Config::default()
/// };
/// let client = ApiCache::new(config, HttpTransport::new())?.start();
/// let users = client.get("/api/users", None).await?;
/// ```
#[derive(Debug)]
pub struct ApiCache<T> {
    cache: ResponseCache,
    transport: T,
}

impl<T: Transport> ApiCache<T> {
    /// Builds a cache with the system clock and the backend selected by
    /// `config.mode`.
    pub fn new(config: Config, transport: T) -> Result<Self> {
        Self::builder().config(config).transport(transport).build()
    }

    pub fn builder() -> ApiCacheBuilder<T> {
        ApiCacheBuilder::new()
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    // == Start ==
    /// Installs the interceptors and hands back the wrapped transport.
    pub fn start(self) -> CachedTransport<T> {
        info!("Response cache installed on transport");
        CachedTransport::new(self.transport, self.cache)
    }
}

// == Builder ==
/// Step-by-step construction of an [`ApiCache`].
///
/// Only the transport is mandatory.
#[derive(Debug)]
pub struct ApiCacheBuilder<T> {
    config: Config,
    transport: Option<T>,
    backend: Option<Box<dyn KeyValueStore>>,
    clock: Option<Arc<dyn Clock>>,
}

impl<T: Transport> ApiCacheBuilder<T> {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            transport: None,
            backend: None,
            clock: None,
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn transport(mut self, transport: T) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Overrides the backend that `config.mode` would open.
    pub fn backend(mut self, backend: Box<dyn KeyValueStore>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    // == Build ==
    /// Validates the configuration and opens storage.
    ///
    /// # Errors
    /// - `ConfigError::MissingTransport` if no transport was given
    /// - any `ConfigError` from [`Config::validate`]
    /// - storage errors while opening a persistent backend
    pub fn build(self) -> Result<ApiCache<T>> {
        let transport = self.transport.ok_or(ConfigError::MissingTransport)?;
        self.config.validate()?;

        if let Some(entry_url) = &self.config.entry_init_url {
            if !UrlAllowList::new(&self.config.cache_url_list).matches(entry_url) {
                warn!(
                    "Entry URL {} is not cacheable; session resets will never trigger",
                    entry_url
                );
            }
        }

        let backend = match self.backend {
            Some(backend) => backend,
            None => store::open_backend(&self.config)?,
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let table = CacheTable::from_config(&self.config, backend, clock);

        info!(
            "Response cache configured: mode={}, expires={}min, patterns={}, entry_url={:?}",
            self.config.mode,
            self.config.expires_minutes,
            self.config.cache_url_list.len(),
            self.config.entry_init_url
        );

        Ok(ApiCache {
            cache: ResponseCache::new(table),
            transport,
        })
    }
}

impl<T: Transport> Default for ApiCacheBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
