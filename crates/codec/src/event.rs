use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LogError;

/// Severity of an event.
///
/// `All` is a query wildcard and is never assigned to a stored event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    #[serde(rename = "ERROR")]
    Error,
    #[serde(rename = "WARN")]
    Warning,
    #[serde(rename = "INFO")]
    Information,
    #[serde(rename = "ALL")]
    All,
}

impl LogLevel {
    /// Levels that may be attached to an event, in severity order.
    pub const EVENT_LEVELS: [LogLevel; 3] = [Self::Error, Self::Warning, Self::Information];

    /// The name written into storage keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARN",
            Self::Information => "INFO",
            Self::All => "ALL",
        }
    }

    /// Whether this level is only meaningful as a query filter.
    pub fn is_filter_only(self) -> bool {
        self == Self::All
    }

    /// Whether an entry stored under `level` passes this filter.
    pub fn matches(self, level: &str) -> bool {
        self == Self::All || self.as_str() == level
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warning),
            "info" | "information" => Ok(Self::Information),
            "all" => Ok(Self::All),
            _ => Err(LogError::InvalidLevel(s.to_owned())),
        }
    }
}

/// Where an `append` call routes its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Transient console output only.
    Console,
    /// Persisted into the key-value store only.
    LocalStorage,
    /// Console output and persistence.
    Both,
}

impl Destination {
    pub fn code(self) -> u8 {
        match self {
            Self::Console => 0,
            Self::LocalStorage => 1,
            Self::Both => 2,
        }
    }

    pub fn writes_console(self) -> bool {
        matches!(self, Self::Console | Self::Both)
    }

    pub fn persists(self) -> bool {
        matches!(self, Self::LocalStorage | Self::Both)
    }
}

impl TryFrom<u8> for Destination {
    type Error = LogError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Console),
            1 => Ok(Self::LocalStorage),
            2 => Ok(Self::Both),
            other => Err(LogError::UnsupportedDestination(other)),
        }
    }
}

/// A single leveled, timestamped log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    timestamp: i64,
    level: LogLevel,
    message: String,
}

impl LogEvent {
    /// Creates an event. Fails for the `All` wildcard.
    pub fn new(timestamp: i64, level: LogLevel, message: impl Into<String>) -> Result<Self, LogError> {
        if level.is_filter_only() {
            return Err(LogError::InvalidLevel(level.as_str().to_owned()));
        }
        Ok(Self {
            timestamp,
            level,
            message: message.into(),
        })
    }

    /// Epoch milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
