//! Expiring key-value stores.
//!
//! [`CacheStore`] is the storage seam of the cache. [`MemoryStore`] keeps
//! everything in a process-local map; [`DiskStore`] writes one JSON file per
//! key next to a metadata file so entries survive restarts.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::clock::{Clock, SystemClock};
use super::entry::{CacheEntry, Expiry};

/// An expiring key-value store.
///
/// `get` on an expired entry behaves as not-found and may purge it.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn set(&self, key: &str, value: Value, expiry: Expiry) -> Result<()>;

    /// Remove an entry, returning whether one existed.
    fn delete(&self, key: &str) -> Result<bool>;

    /// All stored entries, expired ones included, newest first.
    fn entries(&self) -> Result<Vec<CacheEntry>>;

    /// Remove every entry, returning how many there were.
    fn clear(&self) -> Result<usize>;

    /// Current time according to the store's clock.
    fn now(&self) -> DateTime<Utc>;
}

impl<S: CacheStore + ?Sized> CacheStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Value, expiry: Expiry) -> Result<()> {
        (**self).set(key, value, expiry)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        (**self).delete(key)
    }

    fn entries(&self) -> Result<Vec<CacheEntry>> {
        (**self).entries()
    }

    fn clear(&self) -> Result<usize> {
        (**self).clear()
    }

    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

fn newest_first(entries: &mut [CacheEntry]) {
    entries.sort_by(|a, b| b.metadata.cached_at.cmp(&a.metadata.cached_at));
}

/// In-process store.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (CacheEntry, Value)>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Create an empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, (CacheEntry, Value)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let now = self.clock.now();
        let mut entries = self.lock();

        let live = match entries.get(key) {
            None => return Ok(None),
            Some((entry, value)) => (!entry.is_expired_at(now)).then(|| value.clone()),
        };
        if live.is_none() {
            entries.remove(key);
        }
        Ok(live)
    }

    fn set(&self, key: &str, value: Value, expiry: Expiry) -> Result<()> {
        let size = value.to_string().len() as u64;
        let entry = CacheEntry::new(key, self.clock.now(), expiry, size);
        self.lock().insert(key.to_string(), (entry, value));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.lock().remove(key).is_some())
    }

    fn entries(&self) -> Result<Vec<CacheEntry>> {
        let mut entries: Vec<CacheEntry> =
            self.lock().values().map(|(entry, _)| entry.clone()).collect();
        newest_first(&mut entries);
        Ok(entries)
    }

    fn clear(&self) -> Result<usize> {
        let mut entries = self.lock();
        let count = entries.len();
        entries.clear();
        Ok(count)
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

/// Store backed by a directory of JSON files.
pub struct DiskStore {
    /// Root directory for cache.
    root: PathBuf,
    clock: Arc<dyn Clock>,
}

impl DiskStore {
    /// Create a new disk store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_clock(root, Arc::new(SystemClock))
    }

    pub fn with_clock(root: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            root: root.into(),
            clock,
        }
    }

    /// Get the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensure the cache directory exists.
    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create cache directory {:?}", self.root))
    }

    /// Get the path for storing a key's value.
    pub fn content_path(&self, key: &str) -> PathBuf {
        let hash = Sha256::digest(key.as_bytes());
        let hash_str = hex::encode(&hash[..16]);
        self.root.join(hash_str)
    }

    /// Get the metadata file path for a key.
    fn metadata_path(&self, key: &str) -> PathBuf {
        self.content_path(key).with_extension("meta.json")
    }

    fn load_entry(&self, key: &str) -> Result<Option<CacheEntry>> {
        let meta_path = self.metadata_path(key);
        if !meta_path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&meta_path)?;
        let entry: CacheEntry = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse cache metadata {:?}", meta_path))?;
        Ok(Some(entry))
    }

    fn remove_files(&self, key: &str) -> Result<bool> {
        let content_path = self.content_path(key);
        let meta_path = self.metadata_path(key);

        let mut removed = false;

        if content_path.exists() {
            fs::remove_file(&content_path)?;
            removed = true;
        }

        if meta_path.exists() {
            fs::remove_file(&meta_path)?;
            removed = true;
        }

        Ok(removed)
    }
}

impl CacheStore for DiskStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let entry = match self.load_entry(key)? {
            Some(entry) => entry,
            None => return Ok(None),
        };

        if entry.is_expired_at(self.clock.now()) {
            self.remove_files(key)?;
            return Ok(None);
        }

        let content_path = self.content_path(key);
        if !content_path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&content_path).with_context(|| {
            format!("Failed to read cached content from {:?}", content_path)
        })?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn set(&self, key: &str, value: Value, expiry: Expiry) -> Result<()> {
        self.ensure_dir()?;

        let content = serde_json::to_string(&value)?;
        let content_path = self.content_path(key);
        fs::write(&content_path, &content)
            .with_context(|| format!("Failed to write cache entry {:?}", content_path))?;

        let entry = CacheEntry::new(key, self.clock.now(), expiry, content.len() as u64);
        let meta_path = self.metadata_path(key);
        let json = serde_json::to_string_pretty(&entry)?;
        fs::write(&meta_path, json)
            .with_context(|| format!("Failed to write cache metadata {:?}", meta_path))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        self.remove_files(key)
    }

    fn entries(&self) -> Result<Vec<CacheEntry>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().is_some_and(|e| e == "json") {
                if let Ok(json) = fs::read_to_string(&path) {
                    if let Ok(cache_entry) = serde_json::from_str::<CacheEntry>(&json) {
                        entries.push(cache_entry);
                    }
                }
            }
        }

        newest_first(&mut entries);
        Ok(entries)
    }

    fn clear(&self) -> Result<usize> {
        let entries = self.entries()?;
        let count = entries.len();

        for entry in entries {
            let _ = self.remove_files(&entry.key);
        }

        Ok(count)
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
