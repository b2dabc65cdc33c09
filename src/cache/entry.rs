//! Cache Entry Module
//!
//! Defines the persisted record for a cached response with its expiry instant.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// A cached response payload and the instant it stops being fresh.
///
/// Entries are never mutated; a refresh writes a whole new entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// The response payload
    pub value: Value,
    /// Expiration instant, persisted as Unix milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry written at `now` that lives for `ttl`.
    ///
    /// The expiry saturates at the latest representable instant.
    pub fn new(value: Value, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: now
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once `now` reaches
    /// `expires_at`, so it is fresh only while `now < expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, zero once expired.
    pub fn ttl_remaining(&self, now: DateTime<Utc>) -> Duration {
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn instant(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn test_entry_fresh_until_ttl_elapses() {
        let now = instant(1_000_000);
        let entry = CacheEntry::new(json!({"id": 1}), now, Duration::minutes(1));

        assert!(!entry.is_expired(now));
        assert!(!entry.is_expired(now + Duration::seconds(59)));
        assert!(entry.is_expired(now + Duration::seconds(61)));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = instant(1_000_000);
        let entry = CacheEntry::new(json!("v"), now, Duration::zero());

        assert!(entry.is_expired(now), "Entry should be expired at boundary");
    }

    #[test]
    fn test_ttl_remaining() {
        let now = instant(1_000_000);
        let entry = CacheEntry::new(json!(null), now, Duration::seconds(10));

        assert_eq!(entry.ttl_remaining(now), Duration::seconds(10));
        assert_eq!(
            entry.ttl_remaining(now + Duration::seconds(4)),
            Duration::seconds(6)
        );
        assert_eq!(
            entry.ttl_remaining(now + Duration::seconds(30)),
            Duration::zero()
        );
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let now = instant(1_000_000);
        let entry = CacheEntry::new(json!(1), now, Duration::days(100_000_000));

        assert_eq!(entry.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(!entry.is_expired(now));

        let encoded = serde_json::to_string(&entry).unwrap();
        let decoded: CacheEntry = serde_json::from_str(&encoded).unwrap();
        assert_eq!(
            decoded.expires_at.timestamp_millis(),
            entry.expires_at.timestamp_millis()
        );
    }

    #[test]
    fn test_persisted_format() {
        let entry = CacheEntry::new(json!({"id": 1}), instant(5_000), Duration::seconds(1));

        let encoded = serde_json::to_string(&entry).unwrap();

        assert_eq!(encoded, r#"{"value":{"id":1},"expiresAt":6000}"#);
    }
}
