//! Wiring configuration into stores and providers.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::aggregate::Provider;
use crate::cache::{CacheStore, DiskStore, MemoryStore};
use crate::config::{StoreBackend, TripCacheConfig};
use crate::error::Result;
use crate::source::FixtureSource;

/// Open the configured cache store.
pub fn open_store(config: &TripCacheConfig, project_root: &Path) -> Arc<dyn CacheStore> {
    match config.cache.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Disk => Arc::new(DiskStore::new(project_root.join(&config.cache.dir))),
    }
}

/// Load every configured provider's fixture.
pub fn load_providers(config: &TripCacheConfig, project_root: &Path) -> Result<Vec<Provider>> {
    config
        .providers
        .iter()
        .map(|provider| -> Result<Provider> {
            let path = project_root.join(&provider.fixture);
            let source = FixtureSource::load(&provider.name, &path)
                .with_context(|| format!("Failed to load provider '{}'", provider.name))?;
            tracing::debug!(
                "Loaded {} trips for provider {}",
                source.len(),
                provider.name
            );
            Ok(Provider::new(
                &provider.name,
                provider.transport,
                provider.stations.clone(),
                Arc::new(source),
            ))
        })
        .collect()
}
