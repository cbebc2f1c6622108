//! Per-identity index of previously requested windows.
//!
//! The index lives in the cache store without expiry. Its order is insertion
//! order, which is the order the cache consults overlapping windows in.

use anyhow::Result;
use tracing::warn;

use super::entry::Expiry;
use super::store::CacheStore;
use crate::identity::QueryIdentity;
use crate::window::TimeWindow;

/// Store key of an identity's window index.
pub fn index_key(identity: &QueryIdentity) -> String {
    format!("windows:{}", identity.cache_key())
}

/// Store key of the records fetched for one exact window.
pub fn entry_key(identity: &QueryIdentity, window: &TimeWindow) -> String {
    format!("trips:{}", identity.window_key(window))
}

/// Window bookkeeping on top of a [`CacheStore`].
pub struct WindowIndex<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: CacheStore + ?Sized> WindowIndex<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Windows known for `identity`, oldest first.
    ///
    /// A missing or unreadable index is empty.
    pub fn load(&self, identity: &QueryIdentity) -> Vec<TimeWindow> {
        let key = index_key(identity);
        match self.store.get(&key) {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!("Discarding unreadable window index {}: {}", key, e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read window index {}: {}", key, e);
                Vec::new()
            }
        }
    }

    /// Persist the windows for `identity` without expiry.
    pub fn save(&self, identity: &QueryIdentity, windows: &[TimeWindow]) -> Result<()> {
        let value = serde_json::to_value(windows)?;
        self.store.set(&index_key(identity), value, Expiry::Never)
    }
}
