//! Cache Key Module
//!
//! Derives the storage key for a request from its URL and parameters.

use std::fmt;

use serde_json::Value;

/// Token standing in for absent parameters (a JSON empty string)
pub const EMPTY_PARAMS_TOKEN: &str = "\"\"";

// == Cache Key ==
/// Key identifying one cached call: the URL followed by its canonical params.
///
/// Two request shapes that canonicalize to the same string share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    url: String,
    raw: String,
}

impl CacheKey {
    /// Derives the key for `url` called with `params`.
    pub fn new(url: &str, params: Option<&Value>) -> Self {
        let raw = format!("{}{}", url, canonical_params(params));
        Self {
            url: url.to_string(),
            raw,
        }
    }

    /// URL component of the key.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Full key as stored.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Serializes params as compact JSON.
///
/// Object keys come out sorted because `serde_json::Map` is ordered, so
/// `{"b":1,"a":2}` and `{"a":2,"b":1}` produce the same text.
pub fn canonical_params(params: Option<&Value>) -> String {
    match params {
        None | Some(Value::Null) => EMPTY_PARAMS_TOKEN.to_string(),
        Some(value) => value.to_string(),
    }
}
