//! Per-identity mutual exclusion.
//!
//! Lookups, source calls and writes for one identity run under that
//! identity's lock, so overlapping concurrent requests fetch once. Different
//! identities never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
pub struct IdentityLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl IdentityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `key`.
    pub fn with_lock<T>(&self, key: &str, f: impl FnOnce() -> T) -> T {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            // Slots only referenced by the map are idle.
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots.entry(key.to_string()).or_default().clone()
        };

        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}
