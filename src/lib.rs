//! Command-line entry layer for the Statup status monitor.
//!
//! `main.rs` collects arguments and bootstraps logging and `.env`; everything
//! with a decision in it lives here so it can be driven from tests.

pub mod cli;
pub mod config;
pub mod envfile;
pub mod logging;
pub mod platform;
pub mod release;
pub mod router;
pub mod run;
pub mod update;

#[cfg(test)]
pub(crate) mod testing;

pub use router::{CliError, Disposition, Router};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commit hash baked in at build time (`STATUP_COMMIT=$(git rev-parse --short HEAD)`).
pub const COMMIT: Option<&str> = option_env!("STATUP_COMMIT");
