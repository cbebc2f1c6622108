//! Configuration schema definitions for tripcache.
//!
//! This module contains the struct definitions that map to the YAML
//! configuration file format.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cache::parse_ttl;
use crate::error::{Result, TripCacheError};
use crate::identity::{Station, DEFAULT_MAX_DISTANCE_KM};
use crate::trip::Transport;
use crate::window::{parse_time_of_day, DayBounds};

/// Root configuration structure for `.tripcache/config.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripCacheConfig {
    /// Cache settings
    pub cache: CacheSettings,

    /// Search defaults
    pub search: SearchSettings,

    /// Providers to query, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<ProviderConfig>,
}

/// Where cached windows live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local map, gone when the process exits.
    Memory,
    /// JSON files under `cache.dir`.
    #[default]
    Disk,
}

/// Cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub backend: StoreBackend,

    /// Cache directory for the disk backend (relative to project root)
    pub dir: PathBuf,

    /// Lifetime of fetched records, e.g. "1h", "30m"; "0" keeps them until cleared
    pub ttl: String,

    /// Disable to always call sources directly
    pub enabled: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            dir: default_cache_dir(),
            ttl: default_ttl(),
            enabled: true,
        }
    }
}

impl CacheSettings {
    /// Parsed record lifetime.
    pub fn entry_ttl(&self) -> Result<chrono::Duration> {
        parse_ttl(&self.ttl).map_err(|e| TripCacheError::ConfigValidationError {
            message: format!("cache.ttl '{}' is invalid: {}", self.ttl, e),
        })
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".tripcache").join("cache")
}

fn default_ttl() -> String {
    "1h".to_string()
}

/// Search defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Radius for matching a location to a provider station
    pub max_distance_km: f64,

    /// Time used when a departure is given as a bare date
    pub default_departure_time: String,

    /// Time used when an arrival is given as a bare date
    pub default_arrival_time: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            default_departure_time: "09:00:00".to_string(),
            default_arrival_time: "23:59:59".to_string(),
        }
    }
}

impl SearchSettings {
    /// Parsed times of day for date-only bounds.
    pub fn day_bounds(&self) -> Result<DayBounds> {
        Ok(DayBounds {
            departure: parse_time_of_day(&self.default_departure_time)?,
            arrival: parse_time_of_day(&self.default_arrival_time)?,
        })
    }
}

/// A provider backed by a fixture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name, also the source name in cache keys
    pub name: String,

    pub transport: Transport,

    /// JSON file of trip records (relative to project root)
    pub fixture: PathBuf,

    /// Stations locations resolve to
    #[serde(default)]
    pub stations: Vec<Station>,
}
