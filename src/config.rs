//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! tidal-config.toml file. Every section has defaults, so a partial file (or
//! no file at all) is fine.
//!
//! ```toml
//! [ingest]
//! header_lines = 12
//! missing_sentinel = -99.0
//!
//! [contiguity]
//! interval_minutes = 60
//! tolerance_seconds = 60
//!
//! [harmonic]
//! constituents = ["M2", "S2"]
//! epoch = "2000-01-01T00:00:00Z"
//! ```

use crate::{Result, TideError};
use chrono::{DateTime, Duration, FixedOffset};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default configuration file name
pub const CONFIG_FILE: &str = "tidal-config.toml";

/// Application configuration loaded from tidal-config.toml
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Station file reading
    pub ingest: IngestConfig,
    /// Contiguous run detection
    pub contiguity: ContiguityConfig,
    /// Harmonic analysis
    pub harmonic: HarmonicConfig,
}

/// Station file reading settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Header lines skipped at the top of each file
    pub header_lines: usize,
    /// Raw level that marks a missing observation
    pub missing_sentinel: f64,
}

/// Sampling regularity settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContiguityConfig {
    /// Nominal sampling interval in minutes
    pub interval_minutes: i64,
    /// Allowed deviation from the interval in seconds
    pub tolerance_seconds: i64,
}

/// Harmonic analysis settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HarmonicConfig {
    /// Constituents to fit, in report order
    pub constituents: Vec<String>,
    /// Phase reference as RFC 3339; the start of the analysed window when absent
    pub epoch: Option<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        IngestConfig {
            header_lines: 12,
            missing_sentinel: -99.0,
        }
    }
}

impl Default for ContiguityConfig {
    fn default() -> Self {
        ContiguityConfig {
            interval_minutes: 60,
            tolerance_seconds: 60,
        }
    }
}

impl Default for HarmonicConfig {
    fn default() -> Self {
        HarmonicConfig {
            constituents: vec!["M2".to_string(), "S2".to_string()],
            epoch: None,
        }
    }
}

impl ContiguityConfig {
    pub fn interval(&self) -> Duration {
        Duration::minutes(self.interval_minutes)
    }

    pub fn tolerance(&self) -> Duration {
        Duration::seconds(self.tolerance_seconds)
    }
}

impl HarmonicConfig {
    /// Parsed phase epoch, keeping its UTC offset.
    pub fn epoch(&self) -> Result<Option<DateTime<FixedOffset>>> {
        self.epoch
            .as_deref()
            .map(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| TideError::Config(format!("epoch '{raw}': {e}")))
            })
            .transpose()
    }
}

impl Config {
    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!("loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("invalid config file {}: {}", path.display(), e);
                    warn!("using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                info!("no config file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Save current configuration to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!("configuration saved to {}", path.as_ref().display());
        Ok(())
    }
}
