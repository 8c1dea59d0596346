//! Event record model for eventlog.
//!
//! Defines the log levels, destinations and the on-disk representation of an
//! event: a `"<timestampMillis>_<level>"` storage key paired with the raw
//! message text as value. All key parsing lives in [`key`].

pub mod error;
pub mod event;
pub mod key;
pub mod render;

pub use error::{ErrorKind, LogError};
pub use event::{Destination, LogEvent, LogLevel};
pub use key::{DecodedKey, StorageKey, decode_key, decode_level, decode_timestamp, encode_key};
pub use render::{TimeFormat, export_filename, format_line, format_prefix, format_timestamp};
