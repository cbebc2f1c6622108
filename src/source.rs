//! Data sources the cache sits in front of.
//!
//! A [`Source`] produces the records for one identity and one exact window.
//! It may be slow and it may fail; it never touches cache state.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::identity::QueryIdentity;
use crate::trip::TripRecord;
use crate::window::TimeWindow;

/// An expensive fetch function wrapped by the cache.
pub trait Source<R = TripRecord>: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Fetch records covering `window` for `identity`.
    fn fetch(&self, identity: &QueryIdentity, window: &TimeWindow) -> Result<Vec<R>>;
}

impl<R, S: Source<R> + ?Sized> Source<R> for std::sync::Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self, identity: &QueryIdentity, window: &TimeWindow) -> Result<Vec<R>> {
        (**self).fetch(identity, window)
    }
}

/// A named closure acting as a source.
pub struct FnSource<F> {
    name: String,
    func: F,
}

impl<F> FnSource<F> {
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<R, F> Source<R> for FnSource<F>
where
    F: Fn(&QueryIdentity, &TimeWindow) -> Result<Vec<R>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, identity: &QueryIdentity, window: &TimeWindow) -> Result<Vec<R>> {
        (self.func)(identity, window)
    }
}

/// Serves trip records from a JSON file.
///
/// The file holds an array of [`TripRecord`]s. A fetch returns the records
/// whose endpoints match the identity and whose departure lies in the window.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    name: String,
    path: PathBuf,
    trips: Vec<TripRecord>,
}

impl FixtureSource {
    /// Load a fixture file.
    pub fn load(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read fixture {:?}", path))?;
        let trips: Vec<TripRecord> = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse fixture {:?}", path))?;
        Ok(Self {
            name: name.into(),
            path,
            trips,
        })
    }

    /// Build a fixture source from records already in memory.
    pub fn from_trips(name: impl Into<String>, trips: Vec<TripRecord>) -> Self {
        Self {
            name: name.into(),
            path: PathBuf::new(),
            trips,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}

impl Source<TripRecord> for FixtureSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, identity: &QueryIdentity, window: &TimeWindow) -> Result<Vec<TripRecord>> {
        let trips: Vec<TripRecord> = self
            .trips
            .iter()
            .filter(|t| t.origin == identity.origin && t.destination == identity.destination)
            .filter(|t| window.includes(t.departure))
            .cloned()
            .collect();
        debug!(
            "Fixture {} served {} trips for {} {}",
            self.name,
            trips.len(),
            identity,
            window
        );
        Ok(trips)
    }
}
