//! Configuration loading, parsing, and validation for tripcache.
//!
//! This module handles all aspects of configuration:
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use tripcache::config::{load_config, StoreBackend};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".tripcache");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "cache:\n  backend: memory").unwrap();
//!
//! let config = load_config(temp.path(), None).unwrap();
//! assert_eq!(config.cache.backend, StoreBackend::Memory);
//! ```

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{default_config_path, find_config, load_config, load_config_file, parse_config};
pub use schema::{CacheSettings, ProviderConfig, SearchSettings, StoreBackend, TripCacheConfig};
pub use validator::{validate, validate_config, ValidationError};
