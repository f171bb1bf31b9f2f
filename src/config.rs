//! Configuration for the ledger engine and its replay harness
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `LEDGER_*` environment variables. Command-line flags are applied last by
//! the binary.
//!
//! ```toml
//! reference_prefix = "TXN"
//!
//! [logging]
//! level = "info"
//! json = false
//!
//! [replay]
//! batch_size = 1000
//! max_concurrent = 8
//! ```

use crate::core::DEFAULT_REFERENCE_PREFIX;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value '{value}' for {key}")]
    InvalidEnv { key: String, value: String },
}

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Prefix of every issued reference number
    pub reference_prefix: String,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Replay harness configuration
    pub replay: ReplayConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            reference_prefix: DEFAULT_REFERENCE_PREFIX.to_string(),
            logging: LoggingConfig::default(),
            replay: ReplayConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,

    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Replay harness configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Transfers read per batch (async strategy)
    pub batch_size: usize,

    /// Worker threads applying a batch (async strategy)
    pub max_concurrent: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent: num_cpus::get(),
        }
    }
}

impl LedgerConfig {
    /// Load from a TOML file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load defaults overridden by environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Load the file if one is given, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        base.with_env_overrides()
    }

    /// Apply `LEDGER_*` environment variables on top of `self`
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prefix) = lookup("LEDGER_REFERENCE_PREFIX") {
            self.reference_prefix = prefix;
        }

        if let Some(level) = lookup("LEDGER_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(json) = lookup("LEDGER_LOG_JSON") {
            self.logging.json = parse_env("LEDGER_LOG_JSON", &json)?;
        }

        if let Some(size) = lookup("LEDGER_BATCH_SIZE") {
            self.replay.batch_size = parse_env("LEDGER_BATCH_SIZE", &size)?;
        }

        if let Some(count) = lookup("LEDGER_MAX_CONCURRENT") {
            self.replay.max_concurrent = parse_env("LEDGER_MAX_CONCURRENT", &count)?;
        }

        Ok(self)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key: key.to_string(),
        value: value.to_string(),
    })
}
