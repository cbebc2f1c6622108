//! Configuration validation rules.
//!
//! This module validates configuration for correctness:
//! - Provider names must be non-empty and unique
//! - Providers need at least one station
//! - TTL must parse and stay within range, default times must parse
//! - The station search radius must be positive

use std::collections::HashSet;

use crate::config::schema::TripCacheConfig;
use crate::error::{Result, TripCacheError};

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
    /// Provider name if error is provider-specific
    pub provider: Option<String>,
}

impl ValidationError {
    fn new(rule: &str, message: String, provider: Option<&str>) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            provider: provider.map(str::to_string),
        }
    }
}

/// Validate a configuration and return all errors.
pub fn validate_config(config: &TripCacheConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.cache.entry_ttl().is_err() {
        errors.push(ValidationError::new(
            "invalid-ttl",
            format!("cache.ttl '{}' is not a valid duration", config.cache.ttl),
            None,
        ));
    }

    if config.search.day_bounds().is_err() {
        errors.push(ValidationError::new(
            "invalid-time",
            "search default times must use HH:MM:SS".to_string(),
            None,
        ));
    }

    if config.search.max_distance_km <= 0.0 {
        errors.push(ValidationError::new(
            "invalid-distance",
            "search.max_distance_km must be positive".to_string(),
            None,
        ));
    }

    let mut seen = HashSet::new();
    for provider in &config.providers {
        let name = provider.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::new(
                "missing-name",
                "Every provider needs a name".to_string(),
                None,
            ));
            continue;
        }
        if !seen.insert(name) {
            errors.push(ValidationError::new(
                "duplicate-provider",
                format!("Provider '{}' is defined more than once", name),
                Some(name),
            ));
        }
        if provider.stations.is_empty() {
            errors.push(ValidationError::new(
                "missing-stations",
                format!("Provider '{}' has no stations", name),
                Some(name),
            ));
        }
    }

    errors
}

/// Validate and return a single error joining every message.
pub fn validate(config: &TripCacheConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(TripCacheError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ProviderConfig;
    use crate::identity::Station;
    use crate::trip::Transport;

    fn provider(name: &str) -> ProviderConfig {
        ProviderConfig {
            name: name.to_string(),
            transport: Transport::Train,
            fixture: "cp.json".into(),
            stations: vec![Station::new("LIS", 38.71, -9.14)],
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&TripCacheConfig::default()).is_ok());
    }

    #[test]
    fn duplicate_providers_rejected() {
        let mut config = TripCacheConfig::default();
        config.providers = vec![provider("CP"), provider("CP")];

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].rule, "duplicate-provider");
        assert_eq!(errors[0].provider.as_deref(), Some("CP"));
    }

    #[test]
    fn provider_without_stations_rejected() {
        let mut config = TripCacheConfig::default();
        let mut cp = provider("CP");
        cp.stations.clear();
        config.providers = vec![cp];

        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.rule == "missing-stations"));
    }

    #[test]
    fn out_of_range_ttl_rejected() {
        let mut config = TripCacheConfig::default();
        config.cache.ttl = "100000000d".into();

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].rule, "invalid-ttl");
        assert!(matches!(
            validate(&config),
            Err(TripCacheError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = TripCacheConfig::default();
        config.cache.ttl = "never".into();
        config.search.max_distance_km = 0.0;
        config.providers = vec![provider(" ")];

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 3);

        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("max_distance_km"));
    }
}
