//! Configuration Module
//!
//! Handles loading and validating cache configuration, either built in code
//! or read from environment variables.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use directories::ProjectDirs;

use crate::cache::eviction::DEFAULT_EVICTION_FRACTION;
use crate::error::ConfigError;
use crate::store::DEFAULT_QUOTA_BYTES;

/// Default entry lifetime in minutes
pub const DEFAULT_EXPIRES_MINUTES: f64 = 10.0;

/// Longest accepted entry lifetime, about 1900 years
pub const MAX_EXPIRES_MINUTES: f64 = 1_000_000_000.0;

// == Storage Mode ==
/// Which backend holds persisted entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// In-memory, scoped to the cache instance
    #[default]
    Session,
    /// JSON file on disk, survives restarts
    Persistent,
}

impl FromStr for StorageMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "session" => Ok(StorageMode::Session),
            "persistent" | "local" => Ok(StorageMode::Persistent),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageMode::Session => write!(f, "session"),
            StorageMode::Persistent => write!(f, "persistent"),
        }
    }
}

/// Cache configuration parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// Storage backend selection
    pub mode: StorageMode,
    /// Entry lifetime in minutes, fractions allowed
    pub expires_minutes: f64,
    /// URL patterns eligible for caching (`*`, `/prefix/*` or exact)
    pub cache_url_list: Vec<String>,
    /// URL whose cached write signals a new session
    pub entry_init_url: Option<String>,
    /// Byte quota of the storage backend
    pub storage_quota_bytes: usize,
    /// Share of candidate keys evicted per overflow
    pub eviction_fraction: f64,
    /// File used by persistent mode; defaults to the user cache directory
    pub storage_path: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `API_CACHE_MODE` - `session` or `persistent` (default: session)
    /// - `API_CACHE_EXPIRES_MINUTES` - Entry lifetime (default: 10)
    /// - `API_CACHE_URLS` - Comma separated URL patterns (default: none)
    /// - `API_CACHE_ENTRY_URL` - Session start URL (default: unset)
    /// - `API_CACHE_QUOTA_BYTES` - Storage quota (default: 5 MiB)
    /// - `API_CACHE_EVICTION_FRACTION` - Eviction batch share (default: 0.1)
    /// - `API_CACHE_STORAGE_PATH` - Persistent store file
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    ///
    /// Unset variables fall back to defaults; set but malformed ones are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let mode = match lookup("API_CACHE_MODE") {
            Some(v) => v.parse()?,
            None => defaults.mode,
        };
        let expires_minutes =
            parse_var(&lookup, "API_CACHE_EXPIRES_MINUTES")?.unwrap_or(defaults.expires_minutes);
        let cache_url_list = lookup("API_CACHE_URLS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        let entry_init_url = lookup("API_CACHE_ENTRY_URL").filter(|v| !v.trim().is_empty());
        let storage_quota_bytes =
            parse_var(&lookup, "API_CACHE_QUOTA_BYTES")?.unwrap_or(defaults.storage_quota_bytes);
        let eviction_fraction = parse_var(&lookup, "API_CACHE_EVICTION_FRACTION")?
            .unwrap_or(defaults.eviction_fraction);
        let storage_path = lookup("API_CACHE_STORAGE_PATH").map(PathBuf::from);

        let config = Self {
            mode,
            expires_minutes,
            cache_url_list,
            entry_init_url,
            storage_quota_bytes,
            eviction_fraction,
            storage_path,
        };
        config.validate()?;
        Ok(config)
    }

    // == Validate ==
    /// Checks value ranges that the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=MAX_EXPIRES_MINUTES).contains(&self.expires_minutes) {
            return Err(ConfigError::InvalidValue {
                name: "expires_minutes",
                value: self.expires_minutes.to_string(),
            });
        }
        if !(self.eviction_fraction > 0.0 && self.eviction_fraction <= 1.0) {
            return Err(ConfigError::InvalidValue {
                name: "eviction_fraction",
                value: self.eviction_fraction.to_string(),
            });
        }
        if self.storage_quota_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                name: "storage_quota_bytes",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Entry lifetime as a duration, rounded to the millisecond.
    ///
    /// Values outside the accepted range are clamped to it.
    pub fn ttl(&self) -> chrono::Duration {
        let minutes = if self.expires_minutes.is_nan() {
            0.0
        } else {
            self.expires_minutes.clamp(0.0, MAX_EXPIRES_MINUTES)
        };
        chrono::Duration::milliseconds((minutes * 60_000.0).round() as i64)
    }

    /// File backing persistent mode.
    pub fn resolve_storage_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.storage_path {
            return Ok(path.clone());
        }
        let dirs = ProjectDirs::from("", "", "api-cache").ok_or(ConfigError::NoStorageDir)?;
        Ok(dirs.cache_dir().join("responses.json"))
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        None => Ok(None),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: StorageMode::Session,
            expires_minutes: DEFAULT_EXPIRES_MINUTES,
            cache_url_list: Vec::new(),
            entry_init_url: None,
            storage_quota_bytes: DEFAULT_QUOTA_BYTES,
            eviction_fraction: DEFAULT_EVICTION_FRACTION,
            storage_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.mode, StorageMode::Session);
        assert_eq!(config.expires_minutes, 10.0);
        assert!(config.cache_url_list.is_empty());
        assert!(config.entry_init_url.is_none());
        assert_eq!(config.ttl(), chrono::Duration::minutes(10));
    }

    #[test]
    fn test_config_from_lookup_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.mode, StorageMode::Session);
        assert_eq!(config.expires_minutes, 10.0);
        assert_eq!(config.storage_quota_bytes, DEFAULT_QUOTA_BYTES);
    }

    #[test]
    fn test_config_from_lookup_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("API_CACHE_MODE", "persistent"),
            ("API_CACHE_EXPIRES_MINUTES", "1"),
            ("API_CACHE_URLS", "/api/users, /api/items/*,"),
            ("API_CACHE_ENTRY_URL", "/api/login"),
            ("API_CACHE_EVICTION_FRACTION", "0.25"),
        ]))
        .unwrap();

        assert_eq!(config.mode, StorageMode::Persistent);
        assert_eq!(config.expires_minutes, 1.0);
        assert_eq!(config.cache_url_list, vec!["/api/users", "/api/items/*"]);
        assert_eq!(config.entry_init_url.as_deref(), Some("/api/login"));
        assert_eq!(config.eviction_fraction, 0.25);
    }

    #[test]
    fn test_invalid_mode_fails_fast() {
        let result = Config::from_lookup(lookup_from(&[("API_CACHE_MODE", "cookie")]));
        assert!(matches!(result, Err(ConfigError::InvalidMode(m)) if m == "cookie"));
    }

    #[test]
    fn test_local_is_alias_for_persistent() {
        assert_eq!("local".parse::<StorageMode>().unwrap(), StorageMode::Persistent);
        assert_eq!("Session".parse::<StorageMode>().unwrap(), StorageMode::Session);
    }

    #[test]
    fn test_malformed_number_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[("API_CACHE_EXPIRES_MINUTES", "ten")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                name: "API_CACHE_EXPIRES_MINUTES",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_eviction_fraction_range() {
        let config = Config {
            eviction_fraction: 0.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            eviction_fraction: 1.5,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fractional_expiry() {
        let config = Config::from_lookup(lookup_from(&[("API_CACHE_EXPIRES_MINUTES", "0.5")]))
            .unwrap();

        assert_eq!(config.ttl(), chrono::Duration::seconds(30));
    }

    #[test]
    fn test_validate_expires_minutes_range() {
        for minutes in [-1.0, f64::NAN, f64::INFINITY, MAX_EXPIRES_MINUTES * 2.0, 1e12] {
            let config = Config {
                expires_minutes: minutes,
                ..Config::default()
            };
            assert!(
                matches!(
                    config.validate(),
                    Err(ConfigError::InvalidValue {
                        name: "expires_minutes",
                        ..
                    })
                ),
                "{} minutes should be rejected",
                minutes
            );
        }

        let config = Config {
            expires_minutes: MAX_EXPIRES_MINUTES,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ttl_clamps_out_of_range_values() {
        let config = Config {
            expires_minutes: f64::MAX,
            ..Config::default()
        };
        assert_eq!(
            config.ttl(),
            chrono::Duration::minutes(MAX_EXPIRES_MINUTES as i64)
        );

        let config = Config {
            expires_minutes: -5.0,
            ..Config::default()
        };
        assert_eq!(config.ttl(), chrono::Duration::zero());
    }

    #[test]
    fn test_explicit_storage_path_wins() {
        let config = Config {
            storage_path: Some(PathBuf::from("/tmp/cache.json")),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_storage_path().unwrap(),
            PathBuf::from("/tmp/cache.json")
        );
    }
}
