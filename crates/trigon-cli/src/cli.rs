//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Trigon - guided triangle exercises from the command line.
#[derive(Debug, Parser)]
#[command(name = "trigon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQLite database path
    #[arg(long, global = true, env = "TRIGON_DB", default_value = "trigon.db")]
    pub db: PathBuf,

    /// TOML file with [engine] and [calibration] tables
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "table")]
    pub format: CliFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the database schema
    Init,

    /// Import a knowledge-base seed (JSON)
    Import(ImportArgs),

    /// Play an interactive session
    Play(PlayArgs),

    /// Recalibrate multipliers and theorem statistics from saved sessions
    Calibrate(CalibrateArgs),

    /// Browse saved sessions
    History(HistoryArgs),
}

/// Arguments for the import command.
#[derive(Debug, Parser)]
pub struct ImportArgs {
    /// Seed file
    pub seed: PathBuf,
}

/// Arguments for the play command.
#[derive(Debug, Parser)]
pub struct PlayArgs {
    /// Seed for the opening question draw
    #[arg(long)]
    pub seed: Option<u64>,

    /// Only exclude the last N asked questions
    #[arg(long)]
    pub recent_window: Option<usize>,

    /// Treat answers without multiplier data as neutral
    #[arg(long)]
    pub lenient: bool,

    /// Do not save the session to history
    #[arg(long)]
    pub no_save: bool,
}

/// Arguments for the calibrate command.
#[derive(Debug, Parser)]
pub struct CalibrateArgs {
    /// Override the minimum number of sessions per multiplier
    #[arg(long)]
    pub min_sessions: Option<usize>,

    /// Override the learning rate
    #[arg(long)]
    pub learning_rate: Option<f64>,
}

/// Arguments for the history command.
#[derive(Debug, Parser)]
pub struct HistoryArgs {
    /// Maximum number of sessions
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Sessions to skip
    #[arg(long, default_value = "0")]
    pub offset: usize,

    /// Show aggregate statistics instead of sessions
    #[arg(long)]
    pub stats: bool,
}

impl From<CliFormat> for crate::output::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::output::OutputFormat::Table,
            CliFormat::Json => crate::output::OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_command() {
        let cli = Cli::parse_from(["trigon", "play", "--seed", "42", "--recent-window", "10"]);
        match cli.command {
            Command::Play(args) => {
                assert_eq!(args.seed, Some(42));
                assert_eq!(args.recent_window, Some(10));
                assert!(!args.lenient);
            }
            _ => panic!("Expected Play command"),
        }
    }

    #[test]
    fn test_global_db_flag() {
        let cli = Cli::parse_from(["trigon", "history", "--db", "/tmp/x.db", "--limit", "5"]);
        assert_eq!(cli.db, PathBuf::from("/tmp/x.db"));
        match cli.command {
            Command::History(args) => {
                assert_eq!(args.limit, 5);
                assert!(!args.stats);
            }
            _ => panic!("Expected History command"),
        }
    }

    #[test]
    fn test_import_requires_path() {
        assert!(Cli::try_parse_from(["trigon", "import"]).is_err());
    }

    #[test]
    fn test_format_conversion() {
        let format: crate::output::OutputFormat = CliFormat::Json.into();
        assert_eq!(format, crate::output::OutputFormat::Json);
    }
}
