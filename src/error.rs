//! Error types for tripcache operations.
//!
//! This module defines [`TripCacheError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Source failures are wrapped in `SourceFailed` and never cached
//! - Cache store failures are logged and degrade to misses, they do not
//!   surface here
//! - Use `anyhow::Error` (via `TripCacheError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tripcache operations.
#[derive(Debug, Error)]
pub enum TripCacheError {
    /// A data source failed to produce results.
    #[error("Source '{source_name}' failed: {error}")]
    SourceFailed {
        source_name: String,
        #[source]
        error: anyhow::Error,
    },

    /// A time window whose start is not before its end.
    #[error("Invalid time window: {start} is not before {end}")]
    InvalidWindow { start: String, end: String },

    /// A timestamp that could not be parsed.
    #[error("Invalid timestamp '{value}': {message}")]
    InvalidTimestamp { value: String, message: String },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for tripcache operations.
pub type Result<T> = std::result::Result<T, TripCacheError>;
