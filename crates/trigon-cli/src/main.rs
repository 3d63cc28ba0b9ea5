//! Trigon CLI - guided triangle exercises from the command line.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use trigon_cli::commands;
use trigon_cli::{Cli, CliConfig, Command, Formatter};
use trigon_store::SqliteStore;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> trigon_cli::Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref())?;
    let formatter = Formatter::new(cli.format.into(), !cli.no_color);

    match cli.command {
        Command::Init => commands::execute_init(&cli.db, &formatter)?,
        Command::Import(args) => {
            let mut store = SqliteStore::new(&cli.db)?;
            commands::execute_import(args, &mut store, &formatter)?;
        }
        Command::Play(args) => {
            let store = SqliteStore::new(&cli.db)?;
            commands::execute_play(args, &store, &config, &formatter)?;
        }
        Command::Calibrate(args) => {
            let mut store = SqliteStore::new(&cli.db)?;
            commands::execute_calibrate(args, &mut store, &config, &formatter)?;
        }
        Command::History(args) => {
            let store = SqliteStore::new(&cli.db)?;
            commands::execute_history(args, &store, &formatter)?;
        }
    }

    Ok(())
}
