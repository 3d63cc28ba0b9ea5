//! Trigon server binary
//!
//! Starts the HTTP server for guided triangle exercises.

use std::env;
use std::process;
use tracing_subscriber::EnvFilter;
use trigon_server::{config::ServerConfig, start_server, ServerError};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        ServerConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        tracing::warn!("No config file specified, using default test configuration");
        eprintln!("Usage: trigon-server --config <path-to-config.toml>");
        eprintln!();
        ServerConfig::default_test_config()
    };

    start_server(config).await
}

fn print_help() {
    println!("Trigon Server - Guided Triangle Exercises over HTTP");
    println!();
    println!("USAGE:");
    println!("    trigon-server --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("EXAMPLE:");
    println!("    trigon-server --config config/server.toml");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file should contain:");
    println!("    - bind_address: IP address to bind (e.g., '127.0.0.1')");
    println!("    - bind_port: Port number (e.g., 8080)");
    println!("    - jwt_secret: Secret key for session token signing");
    println!("    - database_path: SQLite database (default: trigon.db)");
    println!("    - session_ttl_secs: Idle time before a session expires (default: 86400)");
    println!("    - [engine]: Optional engine tuning table");
    println!();
}
