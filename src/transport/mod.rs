//! Transport Module
//!
//! The HTTP capability the cache wraps. Anything that can answer GET and
//! POST with a JSON value can sit behind the cache.

mod http;

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

pub use http::HttpTransport;

// == Method ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

// == Transport ==
/// An HTTP client exposing the two calls the cache intercepts.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a GET; `params` travel as the query string.
    async fn get(&self, url: &str, params: Option<&Value>) -> Result<Value, TransportError>;

    /// Issues a POST; `params` travel as the JSON body.
    async fn post(&self, url: &str, params: Option<&Value>) -> Result<Value, TransportError>;
}
