//! Trigon Server
//!
//! HTTP shell around the belief-update engine: session lifecycle with JWT
//! session tokens, question and answer turns, feedback and history.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod session;
pub mod sweeper;

use config::ServerConfig;
use handlers::{create_router, AppState};
use session::TokenManager;
use std::sync::Arc;
use sweeper::SessionSweeper;
use tokio::net::TcpListener;
use tracing::info;
use trigon_domain::Engine;
use trigon_store::{SqliteStore, StoreError};

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Database could not be opened
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build application state from configuration
///
/// Opens (and if needed provisions) the database named in the config.
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    let store = SqliteStore::new(&config.database_path)?;
    let tokens = TokenManager::new(&config.jwt_secret, config.token_expiry_secs);
    Ok(AppState::new(Engine::new(config.engine.clone()), store, tokens))
}

/// Start the HTTP server
///
/// Runs the idle-session sweeper alongside the server and stops both on
/// Ctrl+C.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting Trigon server");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path.display());
    info!("Session TTL: {} seconds", config.session_ttl_secs);

    let state = build_state(&config)?;

    let sweeper = SessionSweeper::new(
        Arc::clone(&state.sessions),
        config.session_ttl(),
        config.sweep_interval(),
    );
    tokio::spawn(sweeper.run());

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received, stopping server");
            }
        })
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_state_from_test_config() {
        let config = ServerConfig::default_test_config();
        let state = build_state(&config).unwrap();
        assert_eq!(state.engine.config(), &config.engine);
    }
}
