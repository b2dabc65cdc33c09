//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a cache is in use.
//!
//! # Tasks
//! - Expiry purge: Removes expired entries at a configured interval

mod purge;

pub use purge::spawn_purge_task;
