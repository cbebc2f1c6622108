//! Cache command implementation.
//!
//! Provides `tripcache cache list`, `tripcache cache clear`, etc.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Subcommand};
use console::style;

use crate::cache::{format_duration, CacheStore, CacheValidator};
use crate::cli::runtime::open_store;
use crate::config::{find_config, load_config, StoreBackend, TripCacheConfig};

use super::dispatcher::{Command, CommandResult};

/// Arguments for the cache command.
#[derive(Debug, Clone, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

/// Cache subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum CacheSubcommand {
    /// List cached entries.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Clear the cache.
    Clear {
        /// Only clear expired entries.
        #[arg(long)]
        expired: bool,
    },
    /// Show cache statistics.
    Stats,
}

/// The cache command implementation.
pub struct CacheCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: CacheArgs,
}

impl CacheCommand {
    /// Create a new cache command.
    pub fn new(project_root: &Path, config_path: Option<&Path>, args: CacheArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path: config_path.map(Path::to_path_buf),
            args,
        }
    }

    /// The project config, or defaults when the project has none.
    fn config(&self) -> crate::error::Result<TripCacheConfig> {
        if self.config_path.is_some() || find_config(&self.project_root).is_some() {
            load_config(&self.project_root, self.config_path.as_deref())
        } else {
            Ok(TripCacheConfig::default())
        }
    }
}

impl Command for CacheCommand {
    fn execute(&self, out: &mut dyn Write) -> crate::error::Result<CommandResult> {
        let config = self.config()?;
        let store = open_store(&config, &self.project_root);

        match &self.args.command {
            CacheSubcommand::List { json } => list_cache(store.as_ref(), *json, out)?,
            CacheSubcommand::Clear { expired } => clear_cache(store.as_ref(), *expired, out)?,
            CacheSubcommand::Stats => {
                show_stats(store.as_ref(), out)?;
                let location = match config.cache.backend {
                    StoreBackend::Memory => "memory".to_string(),
                    StoreBackend::Disk => self.project_root.join(&config.cache.dir).display().to_string(),
                };
                writeln!(out, "  Location: {}", location)?;
            }
        }

        Ok(CommandResult::success())
    }
}

fn list_cache(store: &dyn CacheStore, json: bool, out: &mut dyn Write) -> Result<()> {
    let entries = store.entries()?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
        return Ok(());
    }

    if entries.is_empty() {
        writeln!(out, "Cache is empty")?;
        return Ok(());
    }

    writeln!(out, "{} cached entries:\n", entries.len())?;

    let now = store.now();
    for entry in entries {
        let status = if entry.is_expired_at(now) {
            style("expired").red()
        } else {
            style("fresh").green()
        };
        let ttl = match entry.metadata.remaining_ttl_at(now) {
            None => "no expiry".to_string(),
            Some(0) => "expired".to_string(),
            Some(secs) => format_duration(chrono::Duration::seconds(secs)),
        };

        writeln!(out, "  {} [{}] {}", entry.key, status, ttl)?;
    }

    Ok(())
}

fn clear_cache(store: &dyn CacheStore, expired_only: bool, out: &mut dyn Write) -> Result<()> {
    if expired_only {
        let removed = CacheValidator::new(store).cleanup_expired()?;
        writeln!(out, "{} Cleared {} expired entries", style("✓").green(), removed)?;
        return Ok(());
    }

    let cleared = store.clear()?;
    if cleared == 0 {
        writeln!(out, "Cache is already empty")?;
    } else {
        writeln!(out, "{} Cleared {} entries", style("✓").green(), cleared)?;
    }

    Ok(())
}

fn show_stats(store: &dyn CacheStore, out: &mut dyn Write) -> Result<()> {
    let stats = CacheValidator::new(store).stats()?;

    writeln!(out, "Cache Statistics:\n")?;
    writeln!(out, "  Total entries: {}", stats.entries)?;
    writeln!(out, "  Fresh: {}", stats.entries - stats.expired)?;
    writeln!(out, "  Expired: {}", stats.expired)?;
    writeln!(out, "  Window indexes: {}", stats.indefinite)?;
    writeln!(out, "  Total size: {} bytes", stats.total_bytes)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Expiry, ManualClock, MemoryStore};
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn run<F>(f: F) -> String
    where
        F: FnOnce(&mut dyn Write) -> Result<()>,
    {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn list_empty_cache() {
        let store = MemoryStore::new();
        let text = run(|out| list_cache(&store, false, out));
        assert!(text.contains("Cache is empty"));
    }

    #[test]
    fn list_with_entries() {
        let store = MemoryStore::new();
        store.set("trips:a", json!([]), Expiry::After(chrono::Duration::seconds(3600))).unwrap();
        store.set("windows:a", json!([]), Expiry::Never).unwrap();

        let text = run(|out| list_cache(&store, false, out));
        assert!(text.contains("2 cached entries"));
        assert!(text.contains("trips:a"));
        assert!(text.contains("no expiry"));
    }

    #[test]
    fn list_as_json() {
        let store = MemoryStore::new();
        store.set("trips:a", json!([]), Expiry::Never).unwrap();

        let text = run(|out| list_cache(&store, true, out));
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["key"], "trips:a");
    }

    #[test]
    fn clear_expired_only() {
        let clock = Arc::new(ManualClock::default());
        let store = MemoryStore::with_clock(clock.clone());
        store.set("old", json!(1), Expiry::After(chrono::Duration::seconds(60))).unwrap();
        store.set("keep", json!(1), Expiry::Never).unwrap();
        clock.advance(chrono::Duration::minutes(5));

        let text = run(|out| clear_cache(&store, true, out));
        assert!(text.contains("Cleared 1 expired entries"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clear_everything() {
        let store = MemoryStore::new();
        store.set("a", json!(1), Expiry::Never).unwrap();
        store.set("b", json!(1), Expiry::Never).unwrap();

        let text = run(|out| clear_cache(&store, false, out));
        assert!(text.contains("Cleared 2 entries"));
        assert!(store.is_empty());
    }

    #[test]
    fn stats_report_counts() {
        let store = MemoryStore::new();
        store.set("trips:a", json!([1, 2]), Expiry::After(chrono::Duration::seconds(60))).unwrap();
        store.set("windows:a", json!([]), Expiry::Never).unwrap();

        let text = run(|out| show_stats(&store, out));
        assert!(text.contains("Total entries: 2"));
        assert!(text.contains("Window indexes: 1"));
    }

    #[test]
    fn runs_without_project_config() {
        let temp = TempDir::new().unwrap();
        let command = CacheCommand::new(
            temp.path(),
            None,
            CacheArgs {
                command: CacheSubcommand::Stats,
            },
        );

        let mut out = Vec::new();
        let result = command.execute(&mut out).unwrap();
        assert!(result.success);
        assert!(String::from_utf8(out).unwrap().contains("Location:"));
    }
}
