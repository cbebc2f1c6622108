//! Search command implementation.
//!
//! Provides `tripcache search`, which runs one search through the cache
//! inside a caching scope and prints the combined trips.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use console::style;

use crate::aggregate::{SearchResults, TripAggregator, TripSearch};
use crate::cache::TimeWindowCache;
use crate::cli::args::SearchArgs;
use crate::cli::runtime::{load_providers, open_store};
use crate::config::load_config;
use crate::error::Result;
use crate::gate::{ContextGate, NeverActive, ScopedGate};
use crate::identity::StationResolver;
use crate::trip::TripRecord;
use crate::window::TimeWindow;

use super::dispatcher::{Command, CommandResult};

/// The search command implementation.
pub struct SearchCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: SearchArgs,
}

impl SearchCommand {
    /// Create a new search command.
    pub fn new(project_root: &Path, config_path: Option<&Path>, args: SearchArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path: config_path.map(Path::to_path_buf),
            args,
        }
    }
}

impl Command for SearchCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let config = load_config(&self.project_root, self.config_path.as_deref())?;
        let bounds = config.search.day_bounds()?;
        let window = TimeWindow::parse_request(&self.args.departure, &self.args.arrival, &bounds)?;

        let scopes = Arc::new(ScopedGate::new());
        let gate: Arc<dyn ContextGate> = if config.cache.enabled {
            scopes.clone()
        } else {
            Arc::new(NeverActive)
        };
        let cache = TimeWindowCache::new(open_store(&config, &self.project_root), gate)
            .with_entry_ttl(config.cache.entry_ttl()?);

        let aggregator = TripAggregator::new(
            Arc::new(cache),
            load_providers(&config, &self.project_root)?,
        )
        .with_resolver(StationResolver::new(config.search.max_distance_km));

        let mut search = TripSearch::new(self.args.from.clone(), self.args.to.clone(), window)
            .with_passengers(self.args.passengers)
            .except(self.args.except.clone());
        if !self.args.only.is_empty() {
            search = search.only(self.args.only.clone());
        }

        let results = {
            let _scope = scopes.enter();
            aggregator.search(&search)
        };

        if self.args.json {
            writeln!(out, "{}", serde_json::to_string_pretty(&results).map_err(anyhow::Error::from)?)?;
        } else {
            print_results(&results, &window, out)?;
        }

        if results.all_failed() {
            Ok(CommandResult::failure(1))
        } else {
            Ok(CommandResult::success())
        }
    }
}

fn print_results(results: &SearchResults, window: &TimeWindow, out: &mut dyn Write) -> Result<()> {
    if results.trips.is_empty() {
        writeln!(out, "No trips found in {}", window)?;
    } else {
        writeln!(out, "{} trips in {}:\n", results.trips.len(), window)?;
        for trip in &results.trips {
            writeln!(out, "  {}", format_trip(trip))?;
        }
    }

    for provider in &results.skipped {
        writeln!(
            out,
            "{} {} has no station near the endpoints",
            style("skipped:").yellow(),
            provider
        )?;
    }
    for failure in &results.failures {
        writeln!(
            out,
            "{} {}: {}",
            style("failed:").red(),
            failure.provider,
            failure.message
        )?;
    }
    Ok(())
}

fn format_trip(trip: &TripRecord) -> String {
    let minutes = trip.duration_minutes();
    let price = match (trip.price, &trip.currency) {
        (Some(price), Some(currency)) => format!("{:.2} {}", price, currency),
        (Some(price), None) => format!("{:.2}", price),
        _ => "-".to_string(),
    };
    format!(
        "{:<10} {:<10} {} -> {}  {}h{:02}m  {}",
        style(&trip.provider).bold(),
        trip.transport,
        trip.departure.format("%Y-%m-%d %H:%M"),
        trip.arrival.format("%Y-%m-%d %H:%M"),
        minutes / 60,
        minutes % 60,
        price
    )
}
