//! Cache entry metadata and expiry policy.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long a stored value stays live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Kept until deleted explicitly.
    Never,
    /// Expires this long after being written.
    After(Duration),
}

impl Expiry {
    /// A zero or negative lifetime means no expiry.
    pub fn from_duration(ttl: Duration) -> Self {
        if ttl <= Duration::zero() {
            Self::Never
        } else {
            Self::After(ttl)
        }
    }

    /// Deadline for an entry written at `now`.
    ///
    /// A deadline past the representable range means the entry never expires.
    pub fn deadline(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Never => None,
            Self::After(ttl) => now.checked_add_signed(*ttl),
        }
    }
}

/// A stored value's key and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Store key, e.g. `trips:CP:LIS->OPO-2025.05.01.09:00:00:...`.
    pub key: String,
    pub metadata: CacheMetadata,
}

/// Metadata for expiry checks and listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// When this entry was written.
    pub cached_at: DateTime<Utc>,
    /// When it expires, if ever.
    pub expires_at: Option<DateTime<Utc>>,
    /// Serialized size in bytes.
    pub size_bytes: u64,
}

impl CacheEntry {
    /// Create metadata for a value written at `now`.
    pub fn new(key: impl Into<String>, now: DateTime<Utc>, expiry: Expiry, size_bytes: u64) -> Self {
        Self {
            key: key.into(),
            metadata: CacheMetadata {
                cached_at: now,
                expires_at: expiry.deadline(now),
                size_bytes,
            },
        }
    }

    /// Check whether the entry has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.metadata
            .expires_at
            .is_some_and(|expires_at| now >= expires_at)
    }

    /// Get the age of this entry at `now`.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.metadata.cached_at)
    }
}

impl CacheMetadata {
    /// Remaining TTL in seconds, `None` for entries that never expire.
    pub fn remaining_ttl_at(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at
            .map(|expires_at| expires_at.signed_duration_since(now).num_seconds().max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_never_expires() {
        assert_eq!(Expiry::from_duration(Duration::zero()), Expiry::Never);
        assert_eq!(
            Expiry::from_duration(Duration::minutes(5)),
            Expiry::After(Duration::minutes(5))
        );
    }

    #[test]
    fn huge_ttl_does_not_overflow() {
        let expiry = Expiry::After(Duration::MAX);
        assert_eq!(expiry.deadline(Utc::now()), None);

        let entry = CacheEntry::new("k", Utc::now(), expiry, 1);
        assert!(!entry.is_expired_at(Utc::now()));
    }

    #[test]
    fn entry_with_ttl_expires() {
        let now = Utc::now();
        let entry = CacheEntry::new("k", now, Expiry::After(Duration::hours(1)), 10);

        assert!(!entry.is_expired_at(now));
        assert!(!entry.is_expired_at(now + Duration::minutes(59)));
        assert!(entry.is_expired_at(now + Duration::hours(1)));
    }

    #[test]
    fn indefinite_entry_never_expires() {
        let now = Utc::now();
        let entry = CacheEntry::new("k", now, Expiry::Never, 10);

        assert!(!entry.is_expired_at(now + Duration::days(3650)));
        assert_eq!(entry.metadata.remaining_ttl_at(now), None);
    }

    #[test]
    fn remaining_ttl_calculation() {
        let now = Utc::now();
        let entry = CacheEntry::new("k", now, Expiry::After(Duration::hours(1)), 0);

        assert_eq!(
            entry.metadata.remaining_ttl_at(now + Duration::minutes(10)),
            Some(3000)
        );
        assert_eq!(
            entry.metadata.remaining_ttl_at(now + Duration::hours(2)),
            Some(0)
        );
    }

    #[test]
    fn entry_age() {
        let now = Utc::now();
        let entry = CacheEntry::new("k", now, Expiry::Never, 0);

        assert_eq!(entry.age_at(now + Duration::seconds(90)).num_seconds(), 90);
    }
}
