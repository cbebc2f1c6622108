//! Command-line interface for tripcache.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations
//! - [`runtime`] - Building stores and providers from configuration

pub mod args;
pub mod commands;
pub mod runtime;

pub use args::{Cli, Commands, SearchArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
