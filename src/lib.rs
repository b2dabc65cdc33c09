//! API Cache - A response cache for HTTP clients
//!
//! Serves repeated GET/POST calls to slowly changing endpoints from a
//! two-tier cache with TTL expiration, session reset on login and
//! frequency-based eviction when storage runs out.

pub mod api_cache;
pub mod cache;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod store;
pub mod tasks;
pub mod transport;

pub use api_cache::{ApiCache, ApiCacheBuilder};
pub use config::{Config, StorageMode};
pub use error::{CacheError, ConfigError, Result, StoreError, TransportError};
pub use interceptor::{intercept, CachedTransport, ResponseCache};
pub use tasks::spawn_purge_task;
pub use transport::{HttpTransport, Method, Transport};
