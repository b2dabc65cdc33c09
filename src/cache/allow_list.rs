//! URL Allow-List Module
//!
//! Decides which URLs take part in caching and which stored keys belong to
//! them.

use serde_json::Value;

// == URL Pattern ==
/// One allow-list rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPattern {
    /// `*`: every URL
    Any,
    /// `/prefix/*`: every URL starting with `/prefix/`
    Prefix(String),
    /// Anything else: this URL only
    Exact(String),
}

impl UrlPattern {
    /// Parses a pattern string.
    pub fn parse(pattern: &str) -> Self {
        let pattern = pattern.trim();
        if pattern == "*" {
            UrlPattern::Any
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            UrlPattern::Prefix(prefix.to_string())
        } else {
            UrlPattern::Exact(pattern.to_string())
        }
    }

    /// Checks a request URL against the pattern.
    pub fn matches(&self, url: &str) -> bool {
        match self {
            UrlPattern::Any => true,
            UrlPattern::Prefix(prefix) => url.starts_with(prefix.as_str()),
            UrlPattern::Exact(exact) => url == exact,
        }
    }

    /// Checks whether a stored cache key was derived from a matching URL.
    ///
    /// A key is a URL followed by a JSON params token, so an exact pattern
    /// owns a key when the remainder after the URL parses as JSON.
    pub fn owns_key(&self, key: &str) -> bool {
        match self {
            UrlPattern::Any => true,
            UrlPattern::Prefix(prefix) => key.starts_with(prefix.as_str()),
            UrlPattern::Exact(exact) => key
                .strip_prefix(exact.as_str())
                .is_some_and(|rest| serde_json::from_str::<Value>(rest).is_ok()),
        }
    }
}

// == URL Allow-List ==
/// Ordered set of patterns, fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct UrlAllowList {
    patterns: Vec<UrlPattern>,
}

impl UrlAllowList {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| UrlPattern::parse(p.as_ref()))
                .collect(),
        }
    }

    /// True if any pattern matches `url`.
    pub fn matches(&self, url: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(url))
    }

    /// True if any pattern owns the stored `key`.
    pub fn owns_key(&self, key: &str) -> bool {
        self.patterns.iter().any(|p| p.owns_key(key))
    }

    pub fn patterns(&self) -> &[UrlPattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
