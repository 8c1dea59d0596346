//! Storage key encoding.
//!
//! A persisted event is keyed by `"<timestampMillis>_<level>"`. The key is
//! split at the first `_`; the timestamp part is numeric and therefore never
//! contains the separator, while the level part is taken verbatim.

use std::fmt;

use crate::error::LogError;
use crate::event::LogEvent;

/// Separator between the timestamp and level parts of a key.
pub const SEPARATOR: char = '_';

/// Encoded `(timestamp, level)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Key under which `event` is persisted.
    pub fn for_event(event: &LogEvent) -> Self {
        encode_key(event.timestamp(), event.level().as_str())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Timestamp and level recovered from a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedKey<'a> {
    pub timestamp: i64,
    pub level: &'a str,
}

/// Encodes a key. The level is not validated.
pub fn encode_key(timestamp_ms: i64, level: &str) -> StorageKey {
    StorageKey(format!("{timestamp_ms}{SEPARATOR}{level}"))
}

/// Parses the epoch-millisecond prefix of a key.
///
/// A fractional value is truncated toward zero.
pub fn decode_timestamp(key: &str) -> Result<i64, LogError> {
    let (prefix, _) = split(key)?;
    if let Ok(ms) = prefix.parse::<i64>() {
        return Ok(ms);
    }
    match prefix.parse::<f64>() {
        Ok(ms) if ms.is_finite() && ms.abs() < i64::MAX as f64 => Ok(ms.trunc() as i64),
        _ => Err(LogError::malformed(key, "timestamp is not numeric")),
    }
}

/// Returns everything after the first separator.
pub fn decode_level(key: &str) -> Result<&str, LogError> {
    split(key).map(|(_, level)| level)
}

pub fn decode_key(key: &str) -> Result<DecodedKey<'_>, LogError> {
    Ok(DecodedKey {
        timestamp: decode_timestamp(key)?,
        level: decode_level(key)?,
    })
}

fn split(key: &str) -> Result<(&str, &str), LogError> {
    key.split_once(SEPARATOR)
        .ok_or_else(|| LogError::malformed(key, "missing separator"))
}
