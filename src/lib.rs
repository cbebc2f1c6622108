//! tripcache - time-window-aware caching of travel-trip searches.
//!
//! Trip sources answer "which trips run between these two places inside this
//! time window". tripcache sits between callers and those sources and reuses
//! earlier answers whenever a stored window fully contains the requested one,
//! filtering the stored trips down to the narrower request.
//!
//! # Modules
//!
//! - [`window`] - Half-open time windows and request parsing
//! - [`trip`] - Trip records and transports
//! - [`identity`] - Query identities, locations and station resolution
//! - [`source`] - The trip source seam and fixture-backed sources
//! - [`gate`] - Whether caching is active for the current call
//! - [`cache`] - Stores, the window index and the [`TimeWindowCache`]
//! - [`aggregate`] - Searching many providers through one cache
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`cli`] - Command-line interface and argument parsing
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```
//! use tripcache::cache::{MemoryStore, TimeWindowCache};
//! use tripcache::gate::AlwaysActive;
//! use tripcache::identity::QueryIdentity;
//! use tripcache::source::FnSource;
//! use tripcache::trip::{Transport, TripRecord};
//! use tripcache::window::{parse_timestamp, TimeWindow};
//!
//! let source = FnSource::new("CP", |_: &QueryIdentity, _: &TimeWindow| -> anyhow::Result<Vec<TripRecord>> {
//!     Ok(vec![TripRecord::new(
//!         "CP",
//!         Transport::Train,
//!         "LIS",
//!         "OPO",
//!         parse_timestamp("2025-05-01 10:00:00")?,
//!         parse_timestamp("2025-05-01 12:45:00")?,
//!     )])
//! });
//!
//! let cache = TimeWindowCache::new(MemoryStore::new(), AlwaysActive);
//! let identity = QueryIdentity::new("CP", "LIS", "OPO");
//! let day = TimeWindow::parse("2025-05-01 00:00:00", "2025-05-01 23:59:59").unwrap();
//! let morning = TimeWindow::parse("2025-05-01 09:00:00", "2025-05-01 13:00:00").unwrap();
//!
//! assert_eq!(cache.fetch(&identity, &day, &source).unwrap().len(), 1);
//! // Served from the stored day without calling the source again.
//! assert_eq!(cache.fetch(&identity, &morning, &source).unwrap().len(), 1);
//! ```

pub mod aggregate;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod identity;
pub mod source;
pub mod trip;
pub mod window;

pub use cache::TimeWindowCache;
pub use error::{Result, TripCacheError};
