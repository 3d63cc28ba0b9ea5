//! Optional tuning file for the CLI.
//!
//! ```toml
//! [engine]
//! elimination_floor = 0.05
//!
//! [calibration]
//! min_sessions = 20
//! ```

use crate::error::Result;
use serde::Deserialize;
use std::path::Path;
use trigon_domain::{CalibrationConfig, EngineConfig};

/// Engine and calibration settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Engine tuning
    pub engine: EngineConfig,

    /// Calibration parameters
    pub calibration: CalibrationConfig,
}

impl CliConfig {
    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse settings from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load from `path` if given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
