//! The time-window-aware result cache.
//!
//! [`TimeWindowCache::fetch`] memoizes a source per (identity, window) pair.
//! A request is answered from the exact entry when one exists, otherwise
//! from any earlier window that contains it. Windows the request contains
//! are superseded by one broader fetch, and partially overlapping windows
//! contribute their records alongside it. Every result is finally narrowed
//! to the requested window.

use chrono::Duration;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::entry::Expiry;
use super::filter::within_window;
use super::index::{entry_key, WindowIndex};
use super::locks::IdentityLocks;
use super::store::CacheStore;
use crate::error::{Result, TripCacheError};
use crate::gate::ContextGate;
use crate::identity::QueryIdentity;
use crate::source::Source;
use crate::trip::Timed;
use crate::window::TimeWindow;

/// Lifetime of the records stored for one window.
pub const DEFAULT_ENTRY_TTL_SECS: i64 = 3600;

/// What a scan decided about one previously known window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    /// Stays in the index.
    Keep,
    /// Its entry expired; forget the window.
    Stale,
    /// The request contains it; delete its entry and forget it.
    Supersede,
}

/// Outcome of consulting the window index.
struct Scan<R> {
    records: Vec<R>,
    verdicts: Vec<(TimeWindow, Verdict)>,
    satisfied: bool,
}

/// Time-window-aware cache in front of [`Source`]s.
pub struct TimeWindowCache<S, G> {
    store: S,
    gate: G,
    entry_ttl: Duration,
    locks: IdentityLocks,
}

impl<S: CacheStore, G: ContextGate> TimeWindowCache<S, G> {
    /// Create a cache over `store`, active whenever `gate` says so.
    pub fn new(store: S, gate: G) -> Self {
        Self {
            store,
            gate,
            entry_ttl: Duration::seconds(DEFAULT_ENTRY_TTL_SECS),
            locks: IdentityLocks::new(),
        }
    }

    /// Override how long fetched records stay cached.
    pub fn with_entry_ttl(mut self, ttl: Duration) -> Self {
        self.entry_ttl = ttl;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn gate(&self) -> &G {
        &self.gate
    }

    pub fn entry_ttl(&self) -> Duration {
        self.entry_ttl
    }

    /// Windows currently indexed for `identity`, oldest first.
    pub fn known_windows(&self, identity: &QueryIdentity) -> Vec<TimeWindow> {
        WindowIndex::new(&self.store).load(identity)
    }

    /// Records for `identity` lying in `window`, deduplicated.
    ///
    /// Calls `source` only when no cached window covers the request. A
    /// source failure is returned as [`TripCacheError::SourceFailed`] and
    /// leaves the store untouched.
    pub fn fetch<R, Src>(
        &self,
        identity: &QueryIdentity,
        window: &TimeWindow,
        source: &Src,
    ) -> Result<Vec<R>>
    where
        R: Timed + Clone + PartialEq + Serialize + DeserializeOwned,
        Src: Source<R> + ?Sized,
    {
        if identity.is_degenerate() {
            debug!("Skipping query with identical endpoints: {}", identity);
            return Ok(Vec::new());
        }

        let records = if self.gate.is_active() {
            self.locks.with_lock(&identity.cache_key(), || {
                self.fetch_cached(identity, window, source)
            })?
        } else {
            debug!("No cache scope active, calling {} directly", source.name());
            call_source(source, identity, window)?
        };

        Ok(within_window(records, window))
    }

    fn fetch_cached<R, Src>(
        &self,
        identity: &QueryIdentity,
        window: &TimeWindow,
        source: &Src,
    ) -> Result<Vec<R>>
    where
        R: Clone + Serialize + DeserializeOwned,
        Src: Source<R> + ?Sized,
    {
        let key = entry_key(identity, window);
        if let Some(records) = self.load_records(&key) {
            debug!("Cache used for key: {}", key);
            return Ok(records);
        }

        let index = WindowIndex::new(&self.store);
        let known = index.load(identity);
        let scan = self.scan(identity, window, &known);

        let Scan {
            mut records,
            verdicts,
            satisfied,
        } = scan;

        let fresh = if satisfied {
            debug!("Window {} covered by an earlier fetch for {}", window, identity);
            None
        } else {
            Some(call_source(source, identity, window)?)
        };

        let mut windows = self.apply_verdicts(identity, verdicts);

        if let Some(fresh) = fresh {
            match self.store_records(&key, &fresh) {
                Ok(()) => {
                    if !windows.contains(window) {
                        windows.push(*window);
                    }
                }
                Err(e) => warn!("Failed to cache {}: {}", key, e),
            }
            records.extend(fresh);
        }

        if windows != known {
            if let Err(e) = index.save(identity, &windows) {
                warn!("Failed to update window index for {}: {}", identity, e);
            }
        }

        Ok(records)
    }

    /// Walk known windows in insertion order, collecting reusable records.
    fn scan<R>(&self, identity: &QueryIdentity, window: &TimeWindow, known: &[TimeWindow]) -> Scan<R>
    where
        R: DeserializeOwned,
    {
        let mut scan = Scan {
            records: Vec::new(),
            verdicts: Vec::with_capacity(known.len()),
            satisfied: false,
        };

        for cached in known {
            if scan.satisfied || !cached.overlaps(window) {
                scan.verdicts.push((*cached, Verdict::Keep));
                continue;
            }

            let Some(records) = self.load_records::<R>(&entry_key(identity, cached)) else {
                debug!("Dropping expired window {} for {}", cached, identity);
                scan.verdicts.push((*cached, Verdict::Stale));
                continue;
            };
            scan.records.extend(records);

            if cached.contains(window) {
                scan.satisfied = true;
                scan.verdicts.push((*cached, Verdict::Keep));
            } else if window.contains(cached) {
                scan.verdicts.push((*cached, Verdict::Supersede));
            } else {
                scan.verdicts.push((*cached, Verdict::Keep));
            }
        }

        scan
    }

    /// Delete superseded entries and return the surviving windows in order.
    ///
    /// A window whose entry could not be deleted stays indexed.
    fn apply_verdicts(
        &self,
        identity: &QueryIdentity,
        verdicts: Vec<(TimeWindow, Verdict)>,
    ) -> Vec<TimeWindow> {
        let mut windows = Vec::with_capacity(verdicts.len());
        for (cached, verdict) in verdicts {
            match verdict {
                Verdict::Keep => windows.push(cached),
                Verdict::Stale => {}
                Verdict::Supersede => {
                    let key = entry_key(identity, &cached);
                    match self.store.delete(&key) {
                        Ok(_) => debug!("Evicted superseded window {} for {}", cached, identity),
                        Err(e) => {
                            warn!("Failed to evict {}: {}", key, e);
                            windows.push(cached);
                        }
                    }
                }
            }
        }
        windows
    }

    fn load_records<R: DeserializeOwned>(&self, key: &str) -> Option<Vec<R>> {
        match self.store.get(key) {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(records) => Some(records),
                Err(e) => {
                    warn!("Ignoring unreadable cache entry {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read cache entry {}: {}", key, e);
                None
            }
        }
    }

    fn store_records<R: Serialize>(&self, key: &str, records: &[R]) -> anyhow::Result<()> {
        let value = serde_json::to_value(records)?;
        self.store.set(key, value, Expiry::from_duration(self.entry_ttl))
    }
}

fn call_source<R, Src>(source: &Src, identity: &QueryIdentity, window: &TimeWindow) -> Result<Vec<R>>
where
    Src: Source<R> + ?Sized,
{
    info!("Fetching {} for {} {}", source.name(), identity, window);
    source
        .fetch(identity, window)
        .map_err(|error| TripCacheError::SourceFailed {
            source_name: source.name().to_string(),
            error,
        })
}
