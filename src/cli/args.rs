//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::identity::Location;
use crate::trip::Transport;

use super::commands::cache::CacheArgs;

/// tripcache - Time-window-aware travel search cache.
#[derive(Debug, Parser)]
#[command(name = "tripcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default .tripcache/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Search trips across configured providers
    Search(SearchArgs),

    /// Inspect and maintain the result cache
    Cache(CacheArgs),
}

/// Arguments for the `search` command.
#[derive(Debug, Clone, clap::Args)]
pub struct SearchArgs {
    /// Origin as LAT,LNG
    #[arg(long, value_parser = Location::parse_coords, allow_hyphen_values = true)]
    pub from: Location,

    /// Destination as LAT,LNG
    #[arg(long, value_parser = Location::parse_coords, allow_hyphen_values = true)]
    pub to: Location,

    /// Earliest departure (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)
    #[arg(long)]
    pub departure: String,

    /// Latest arrival (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)
    #[arg(long)]
    pub arrival: String,

    /// Number of passengers
    #[arg(long, default_value_t = 1)]
    pub passengers: u32,

    /// Only search these transports (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<Transport>,

    /// Skip these transports (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub except: Vec<Transport>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search() {
        let cli = Cli::parse_from([
            "tripcache",
            "search",
            "--from",
            "38.72,-9.14",
            "--to",
            "41.15,-8.61",
            "--departure",
            "2025-05-01",
            "--arrival",
            "2025-05-01 20:00:00",
            "--only",
            "train,bus",
        ]);

        let Commands::Search(args) = cli.command else {
            panic!("Expected Search command");
        };
        assert_eq!(args.from.lat, 38.72);
        assert_eq!(args.to.lng, -8.61);
        assert_eq!(args.passengers, 1);
        assert_eq!(args.only, vec![Transport::Train, Transport::Bus]);
        assert!(args.except.is_empty());
    }

    #[test]
    fn rejects_bad_coordinates() {
        let result = Cli::try_parse_from([
            "tripcache",
            "search",
            "--from",
            "lisbon",
            "--to",
            "41.15,-8.61",
            "--departure",
            "2025-05-01",
            "--arrival",
            "2025-05-01",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tripcache", "cache", "stats", "--config", "x.yml", "--debug"]);
        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("x.yml")));
    }
}
