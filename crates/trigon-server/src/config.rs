//! Configuration file parsing for the server.
//!
//! Loads settings from TOML: bind address, JWT secret, database path,
//! session lifetime and the engine tuning table.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use trigon_domain::EngineConfig;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// JWT secret for signing session tokens
    pub jwt_secret: String,

    /// Token expiry in seconds (default: 86400 = 24 hours)
    #[serde(default = "default_day_secs")]
    pub token_expiry_secs: u64,

    /// SQLite database path
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Idle time after which a live session is dropped (default: 24 hours)
    #[serde(default = "default_day_secs")]
    pub session_ttl_secs: u64,

    /// How often the sweeper looks for idle sessions (default: 5 minutes)
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Engine tuning
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_day_secs() -> u64 {
    24 * 60 * 60
}

fn default_database_path() -> PathBuf {
    PathBuf::from("trigon.db")
}

fn default_sweep_interval() -> u64 {
    300
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;

        if config.jwt_secret.is_empty() {
            return Err(ConfigError::MissingField("jwt_secret".to_string()));
        }

        Ok(config)
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            jwt_secret: "test-secret-key-do-not-use-in-production".to_string(),
            token_expiry_secs: default_day_secs(),
            database_path: PathBuf::from(":memory:"),
            session_ttl_secs: default_day_secs(),
            sweep_interval_secs: default_sweep_interval(),
            engine: EngineConfig::default(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// Session inactivity limit
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Sweeper period
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}
