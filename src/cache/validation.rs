//! Cache freshness checks, maintenance and TTL parsing.

use anyhow::{bail, Result};
use chrono::Duration;

use super::{CacheEntry, CacheStore};

/// Cache validator for checking entry freshness.
pub struct CacheValidator<'a> {
    store: &'a dyn CacheStore,
}

/// Result of cache validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Entry is fresh and valid.
    Fresh,
    /// Entry expired (TTL).
    Expired,
    /// Entry not found.
    NotFound,
}

/// Summary of a store's contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub expired: usize,
    /// Entries without expiry (window indexes).
    pub indefinite: usize,
    pub total_bytes: u64,
}

impl<'a> CacheValidator<'a> {
    /// Create a new cache validator.
    pub fn new(store: &'a dyn CacheStore) -> Self {
        Self { store }
    }

    /// Check a single key without purging it.
    pub fn validate(&self, key: &str) -> Result<ValidationResult> {
        let now = self.store.now();
        let result = match self.store.entries()?.into_iter().find(|e| e.key == key) {
            None => ValidationResult::NotFound,
            Some(entry) if entry.is_expired_at(now) => ValidationResult::Expired,
            Some(_) => ValidationResult::Fresh,
        };
        Ok(result)
    }

    /// Remove expired entries, returning how many were removed.
    pub fn cleanup_expired(&self) -> Result<usize> {
        let now = self.store.now();
        let mut removed = 0;

        for entry in self.store.entries()? {
            if entry.is_expired_at(now) && self.store.delete(&entry.key)? {
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Get entries older than a duration.
    pub fn entries_older_than(&self, age: Duration) -> Result<Vec<CacheEntry>> {
        let cutoff = self.store.now() - age;

        Ok(self
            .store
            .entries()?
            .into_iter()
            .filter(|e| e.metadata.cached_at < cutoff)
            .collect())
    }

    /// Count entries by state.
    pub fn stats(&self) -> Result<CacheStats> {
        let now = self.store.now();
        let entries = self.store.entries()?;

        Ok(CacheStats {
            entries: entries.len(),
            expired: entries.iter().filter(|e| e.is_expired_at(now)).count(),
            indefinite: entries
                .iter()
                .filter(|e| e.metadata.expires_at.is_none())
                .count(),
            total_bytes: entries.iter().map(|e| e.metadata.size_bytes).sum(),
        })
    }
}

/// Longest TTL accepted, in days.
pub const MAX_TTL_DAYS: i64 = 36_500;

/// Parse a TTL string like "7d", "1h", "30m".
///
/// `0` disables expiry. Negative values and anything longer than
/// [`MAX_TTL_DAYS`] are rejected.
pub fn parse_ttl(ttl: &str) -> Result<Duration> {
    let ttl = ttl.trim().to_lowercase();

    let (amount, unit): (&str, fn(i64) -> Option<Duration>) =
        if let Some(days) = ttl.strip_suffix('d') {
            (days, Duration::try_days)
        } else if let Some(hours) = ttl.strip_suffix('h') {
            (hours, Duration::try_hours)
        } else if let Some(mins) = ttl.strip_suffix('m') {
            (mins, Duration::try_minutes)
        } else if let Some(secs) = ttl.strip_suffix('s') {
            (secs, Duration::try_seconds)
        } else {
            // Assume seconds if no suffix
            (ttl.as_str(), Duration::try_seconds)
        };

    let amount: i64 = amount.trim().parse()?;
    if amount < 0 {
        bail!("TTL must not be negative: {}", ttl);
    }
    match unit(amount) {
        Some(duration) if duration <= Duration::days(MAX_TTL_DAYS) => Ok(duration),
        _ => bail!("TTL is too long (max {}d): {}", MAX_TTL_DAYS, ttl),
    }
}

/// Format a duration for display.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.num_seconds();

    if secs >= 86400 {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
