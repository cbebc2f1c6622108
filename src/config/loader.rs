//! Configuration file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::TripCacheConfig;
use crate::config::validator::validate;
use crate::error::{Result, TripCacheError};

/// Project config location relative to the project root.
pub fn default_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".tripcache").join("config.yml")
}

/// Find project config at .tripcache/config.yml
pub fn find_config(project_root: &Path) -> Option<PathBuf> {
    let path = default_config_path(project_root);
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

/// Load a single config file and parse it into TripCacheConfig.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<TripCacheConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TripCacheError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            TripCacheError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into TripCacheConfig.
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_config(content: &str, source_path: &Path) -> Result<TripCacheConfig> {
    serde_yaml::from_str(content).map_err(|e| TripCacheError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and validate the config for a project.
///
/// An explicit path wins over the project default.
pub fn load_config(project_root: &Path, explicit: Option<&Path>) -> Result<TripCacheConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => find_config(project_root).ok_or_else(|| TripCacheError::ConfigNotFound {
            path: default_config_path(project_root),
        })?,
    };

    tracing::debug!("Loading config from {:?}", path);
    let config = load_config_file(&path)?;
    validate(&config)?;
    Ok(config)
}
