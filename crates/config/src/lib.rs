//! Firehose Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! An empty file is a valid config - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use firehose_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[history]\ncapacity = 10").unwrap();
//! assert_eq!(config.history.capacity, 10);
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [log]
//! level = "info"
//! format = "console"
//!
//! [log.targets]
//! firehose_tap = "debug"
//!
//! [history]
//! capacity = 100
//! max_sources = 0
//!
//! [stream]
//! queue_capacity = 256
//! max_subscribers = 1024
//! max_consecutive_drops = 0
//! cleanup_interval_secs = 5
//! ```

mod error;
mod history;
mod logging;
mod stream;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use history::{HistoryConfig, MAX_HISTORY_CAPACITY};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use stream::StreamConfig;

use serde::Deserialize;

/// Environment variable holding the config file path
pub const CONFIG_ENV: &str = "FIREHOSE_CONFIG";

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Per-source recent history
    pub history: HistoryConfig,

    /// Live stream fan-out
    pub stream: StreamConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML, or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Load configuration from the file named by `FIREHOSE_CONFIG`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnv` if the variable is unset or empty,
    /// otherwise the same errors as [`Config::from_file`].
    pub fn from_env() -> Result<Self> {
        Self::from_env_var(CONFIG_ENV)
    }

    fn from_env_var(var: &'static str) -> Result<Self> {
        match std::env::var_os(var) {
            Some(path) if !path.is_empty() => Self::from_file(path),
            _ => Err(ConfigError::MissingEnv { var }),
        }
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate value ranges
    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
