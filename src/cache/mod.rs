//! Time-window-aware result caching.
//!
//! This module provides the expiring [`CacheStore`] backends, the per-identity
//! [`WindowIndex`], and [`TimeWindowCache`], which decides between reusing
//! earlier windows and calling a source.

pub mod clock;
pub mod entry;
pub mod filter;
pub mod index;
pub mod locks;
pub mod store;
pub mod validation;
pub mod window_cache;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, CacheMetadata, Expiry};
pub use filter::within_window;
pub use index::{entry_key, index_key, WindowIndex};
pub use locks::IdentityLocks;
pub use store::{CacheStore, DiskStore, MemoryStore};
pub use validation::{
    format_duration, parse_ttl, CacheStats, CacheValidator, ValidationResult, MAX_TTL_DAYS,
};
pub use window_cache::{TimeWindowCache, DEFAULT_ENTRY_TTL_SECS};
