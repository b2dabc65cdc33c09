//! Cache Module
//!
//! Provides the two-tier response cache: an in-memory table over a
//! persisted entry store, with TTL expiration, session reset and
//! frequency-based eviction.

mod allow_list;
mod clock;
mod entry;
mod entry_store;
pub mod eviction;
mod frequency;
mod key;
mod stats;
mod table;


// Re-export public types
pub use allow_list::{UrlAllowList, UrlPattern};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use entry_store::{CacheEntryStore, WriteOutcome};
pub use eviction::EvictionPolicy;
pub use frequency::FrequencyTracker;
pub use key::{canonical_params, CacheKey, EMPTY_PARAMS_TOKEN};
pub use stats::CacheStats;
pub use table::CacheTable;
