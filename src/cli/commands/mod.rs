//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands are
//! dispatched via [`CommandDispatcher`].

pub mod cache;
pub mod dispatcher;
pub mod search;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
