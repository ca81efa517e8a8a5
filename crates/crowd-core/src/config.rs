//! Configuration loading and typed config structures for the dashboard.
//!
//! The configuration lives in `crowd-config.yaml` in the working
//! directory. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads and validates the file.
//! Every field has a default, so an empty or missing file is valid.

use std::collections::BTreeSet;
use std::path::Path;

use crowd_types::Coordinates;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but a value is out of range.
    #[error("invalid config: {message}")]
    Invalid {
        /// Description of the offending value.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level dashboard configuration.
///
/// Mirrors the structure of `crowd-config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CrowdConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Simulated crowd-flow settings.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Locations registered at startup.
    #[serde(default = "default_locations")]
    pub locations: Vec<SeedLocation>,

    /// Per-subscriber buffer of pending update events.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

impl Default for CrowdConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            simulation: SimulationConfig::default(),
            locations: default_locations(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

impl CrowdConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// The `CROWD_PORT` environment variable overrides `server.port`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.server.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not a mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;

        if self.broadcast_capacity == 0 {
            return Err(invalid("broadcast_capacity must be at least 1"));
        }

        let mut seen = BTreeSet::new();
        for seed in &self.locations {
            if seed.key.trim().is_empty() || seed.name.trim().is_empty() {
                return Err(invalid("seed locations need a non-empty key and name"));
            }
            if !Coordinates(seed.lat, seed.lng).is_valid() {
                return Err(invalid(format!(
                    "seed location {} has invalid coordinates",
                    seed.key
                )));
            }
            if !seen.insert(seed.key.as_str()) {
                return Err(invalid(format!("duplicate seed location {}", seed.key)));
            }
        }
        Ok(())
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Override settings from environment variables.
    ///
    /// `CROWD_PORT` replaces the configured port.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `CROWD_PORT` is not a port number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("CROWD_PORT") {
            self.port = val
                .parse()
                .map_err(|e| invalid(format!("CROWD_PORT={val}: {e}")))?;
        }
        Ok(())
    }
}

/// Simulated crowd-flow configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Whether drivers are started at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Delay before drivers start ticking.
    #[serde(default = "default_startup_delay_ms")]
    pub startup_delay_ms: u64,

    /// Lower bound (inclusive) of the per-location tick interval.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Upper bound (exclusive) of the per-location tick interval.
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,

    /// Probability that a tick adds people rather than removes them.
    #[serde(default = "default_enter_probability")]
    pub enter_probability: f64,

    /// Largest number of people entering or leaving in one tick.
    #[serde(default = "default_max_change")]
    pub max_change: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            startup_delay_ms: default_startup_delay_ms(),
            min_interval_ms: default_min_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            enter_probability: default_enter_probability(),
            max_change: default_max_change(),
        }
    }
}

impl SimulationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_interval_ms == 0 || self.min_interval_ms >= self.max_interval_ms {
            return Err(invalid(
                "simulation.min_interval_ms must be positive and below max_interval_ms",
            ));
        }
        if !(0.0..=1.0).contains(&self.enter_probability) {
            return Err(invalid("simulation.enter_probability must be within [0, 1]"));
        }
        if self.max_change == 0 {
            return Err(invalid("simulation.max_change must be at least 1"));
        }
        Ok(())
    }
}

/// A location registered at process start.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeedLocation {
    /// Registry key (e.g. `college`).
    pub key: String,
    /// Display name.
    pub name: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl SeedLocation {
    fn new(key: &str, name: &str, lat: f64, lng: f64) -> Self {
        Self {
            key: key.to_owned(),
            name: name.to_owned(),
            lat,
            lng,
        }
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// The three campus locations the dashboard ships with.
pub fn default_locations() -> Vec<SeedLocation> {
    vec![
        SeedLocation::new("college", "College Grounds", 12.9719, 77.5946),
        SeedLocation::new("library", "Library", 12.9725, 77.5950),
        SeedLocation::new("canteen", "Canteen", 12.9710, 77.5940),
    ]
}

const fn default_broadcast_capacity() -> usize {
    256
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    3000
}

const fn default_true() -> bool {
    true
}

const fn default_startup_delay_ms() -> u64 {
    20_000
}

const fn default_min_interval_ms() -> u64 {
    3_000
}

const fn default_max_interval_ms() -> u64 {
    8_000
}

const fn default_enter_probability() -> f64 {
    0.6
}

const fn default_max_change() -> u32 {
    3
}
