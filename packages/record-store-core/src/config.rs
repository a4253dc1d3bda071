//! Record store configuration.
//!
//! Supports TOML config files, environment variable overrides, and defaults.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::SnapshotCodec;
use crate::error::StoreError;
use crate::logging::LogLevel;

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "RECORD_STORE_";

/// Reads the `RECORD_STORE_`-prefixed environment variable for `name`.
pub fn env_var(name: &str) -> Option<String> {
    env::var(format!("{}{}", ENV_PREFIX, name)).ok()
}

/// Record store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Verbosity of the store's log output (default: silent)
    pub log_level: LogLevel,
    /// Snapshot representation in the backend (default: base64-wrapped JSON)
    pub codec: SnapshotCodec,
    /// Directory used by the file backend (default: "./data")
    pub data_dir: PathBuf,
    /// Maximum retry attempts for transient I/O errors
    pub io_max_retries: u32,
    /// Delay between retry attempts in milliseconds
    pub io_retry_delay_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Silent,
            codec: SnapshotCodec::Base64Json,
            data_dir: PathBuf::from("./data"),
            io_max_retries: 3,
            io_retry_delay_ms: 100,
        }
    }
}

impl StoreConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    pub fn with_codec(mut self, codec: SnapshotCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| StoreError::ConfigError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string. Missing keys keep defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, StoreError> {
        toml::from_str(toml_str).map_err(|e| StoreError::ConfigError(format!("Invalid TOML: {}", e)))
    }

    /// Applies `RECORD_STORE_*` environment overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), StoreError> {
        self.apply_overrides(env_var)
    }

    /// Applies overrides from an arbitrary lookup, keyed without the prefix.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), StoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("LOG_LEVEL") {
            self.log_level = val.parse()?;
        }
        if let Some(val) = lookup("CODEC") {
            self.codec = val.parse()?;
        }
        if let Some(val) = lookup("DATA_DIR") {
            self.data_dir = PathBuf::from(val);
        }
        if let Some(val) = lookup("IO_MAX_RETRIES") {
            self.io_max_retries = val
                .parse()
                .map_err(|_| StoreError::ConfigError(format!("Invalid io_max_retries: {}", val)))?;
        }
        if let Some(val) = lookup("IO_RETRY_DELAY_MS") {
            self.io_retry_delay_ms = val.parse().map_err(|_| {
                StoreError::ConfigError(format!("Invalid io_retry_delay_ms: {}", val))
            })?;
        }
        Ok(())
    }
}
