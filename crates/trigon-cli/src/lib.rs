//! Trigon CLI library.
//!
//! Database setup, seed import, interactive play, calibration and history
//! browsing for the triangle tutoring engine.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod play;

pub use cli::{Cli, Command};
pub use config::CliConfig;
pub use error::{CliError, Result};
pub use output::{Formatter, OutputFormat};
