//! Error types for the response cache
//!
//! Provides unified error handling using thiserror. Storage errors are
//! recovered inside the cache; transport and configuration errors reach callers.

use thiserror::Error;

// == Store Error Enum ==
/// Errors raised by a key/value storage backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Write would exceed the backend's byte quota
    #[error("Storage quota exceeded: {required} bytes required, {quota} bytes available")]
    QuotaExceeded { required: usize, quota: usize },

    /// Persisted data could not be decoded
    #[error("Failed to decode stored data: {0}")]
    Decode(#[from] serde_json::Error),

    /// Backing medium failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// == Transport Error Enum ==
/// Errors raised by the wrapped HTTP transport.
///
/// The cache never inspects or retries these; they are handed back as-is.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Server answered with a non-success status
    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// Request could not be sent or its body could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Any other transport failure
    #[error("Transport error: {0}")]
    Other(String),
}

// == Config Error Enum ==
/// Construction-time configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Unknown storage mode
    #[error("Invalid storage mode: {0} (expected \"session\" or \"persistent\")")]
    InvalidMode(String),

    /// Builder was finished without a transport
    #[error("No transport was provided")]
    MissingTransport,

    /// A numeric setting could not be parsed or is out of range
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    /// Persistent mode without an explicit path and no home directory
    #[error("Could not determine a storage directory for persistent mode")]
    NoStorageDir,
}

// == Cache Error Enum ==
/// Unified error type for the response cache.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

// == Result Type Alias ==
/// Convenience Result type for the response cache.
pub type Result<T> = std::result::Result<T, CacheError>;
