//! Verbosity-gated logging collaborator.
//!
//! The store never writes to a console directly. It hands `(severity, message)`
//! pairs to a [`LogSink`]; [`StoreLogger`] drops the ones the configured
//! [`LogLevel`] does not allow.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Tracing target used for every event the store emits.
pub const LOG_TARGET: &str = "record_store";

/// Store verbosity. Deserializes from `0`/`1`/`2` or the lowercase names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "RawLogLevel")]
pub enum LogLevel {
    /// Nothing is logged (0)
    #[default]
    Silent,
    /// Errors only (1)
    Errors,
    /// Errors and informational traces (2)
    Verbose,
}

impl LogLevel {
    /// Numeric verbosity: 0, 1 or 2.
    pub fn as_u8(self) -> u8 {
        match self {
            LogLevel::Silent => 0,
            LogLevel::Errors => 1,
            LogLevel::Verbose => 2,
        }
    }

    /// Whether a message of the given severity passes this level.
    pub fn allows(self, severity: Severity) -> bool {
        match severity {
            Severity::Error => self >= LogLevel::Errors,
            Severity::Info => self >= LogLevel::Verbose,
        }
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = StoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LogLevel::Silent),
            1 => Ok(LogLevel::Errors),
            2 => Ok(LogLevel::Verbose),
            other => Err(StoreError::ConfigError(format!(
                "log level must be 0, 1 or 2, got {}",
                other
            ))),
        }
    }
}

impl FromStr for LogLevel {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "silent" => Ok(LogLevel::Silent),
            "1" | "errors" | "error" => Ok(LogLevel::Errors),
            "2" | "verbose" => Ok(LogLevel::Verbose),
            other => Err(StoreError::ConfigError(format!(
                "unsupported log level '{}'; expected 0|1|2 or silent|errors|verbose",
                other
            ))),
        }
    }
}

/// Log level as written in a config file.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLogLevel {
    Number(u8),
    Text(String),
}

impl TryFrom<RawLogLevel> for LogLevel {
    type Error = StoreError;

    fn try_from(raw: RawLogLevel) -> Result<Self, Self::Error> {
        match raw {
            RawLogLevel::Number(level) => LogLevel::try_from(level),
            RawLogLevel::Text(text) => text.parse(),
        }
    }
}

/// Message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Destination for store log messages.
pub trait LogSink: Send + Sync {
    fn log(&self, severity: Severity, message: &str);
}

/// Forwards messages to `tracing` under [`LOG_TARGET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => tracing::info!(target: LOG_TARGET, "{}", message),
            Severity::Error => tracing::error!(target: LOG_TARGET, "{}", message),
        }
    }
}

/// Keeps every message in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<(Severity, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded messages in emission order.
    pub fn entries(&self) -> Vec<(Severity, String)> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of recorded messages with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.entries()
            .iter()
            .filter(|(s, _)| *s == severity)
            .count()
    }
}

impl LogSink for MemorySink {
    fn log(&self, severity: Severity, message: &str) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.push((severity, message.to_string()));
    }
}

/// Level-gated front for a [`LogSink`].
#[derive(Clone)]
pub struct StoreLogger {
    level: LogLevel,
    sink: Arc<dyn LogSink>,
}

impl StoreLogger {
    pub fn new(level: LogLevel, sink: Arc<dyn LogSink>) -> Self {
        Self { level, sink }
    }

    /// Logger backed by [`TracingSink`].
    pub fn tracing(level: LogLevel) -> Self {
        Self::new(level, Arc::new(TracingSink))
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.emit(Severity::Info, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.emit(Severity::Error, message.as_ref());
    }

    fn emit(&self, severity: Severity, message: &str) {
        if self.level.allows(severity) {
            self.sink.log(severity, message);
        }
    }
}

impl fmt::Debug for StoreLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreLogger")
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}
