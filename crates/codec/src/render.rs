//! Human-readable rendering of events.
//!
//! Report lines look like `[1970-01-01T00:00:01.000Z] [INFO]> boot`. Dates are
//! ISO-8601 with millisecond precision, in UTC by default or in the local
//! offset when [`TimeFormat::Local`] is configured.

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Rendered in place of a timestamp outside chrono's range.
const INVALID_DATE: &str = "Invalid Date";

/// Timezone convention used when rendering timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFormat {
    #[default]
    Utc,
    Local,
}

fn to_datetime(timestamp_ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(timestamp_ms)
}

/// Renders an epoch-millisecond timestamp.
pub fn format_timestamp(timestamp_ms: i64, format: TimeFormat) -> String {
    let Some(dt) = to_datetime(timestamp_ms) else {
        return INVALID_DATE.to_owned();
    };
    match format {
        TimeFormat::Utc => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        TimeFormat::Local => dt
            .with_timezone(&Local)
            .to_rfc3339_opts(SecondsFormat::Millis, false),
    }
}

/// Console prefix: `[<date>] [<level>]>`.
pub fn format_prefix(timestamp_ms: i64, level: &str, format: TimeFormat) -> String {
    format!("[{}] [{level}]>", format_timestamp(timestamp_ms, format))
}

/// Report line including the trailing newline.
pub fn format_line(timestamp_ms: i64, level: &str, message: &str, format: TimeFormat) -> String {
    format!("{} {message}\n", format_prefix(timestamp_ms, level, format))
}

/// Export file name derived from the export time: `<date> <time>.log`.
///
/// Uses `-` instead of `/` and `:` so the name is valid on every filesystem.
pub fn export_filename(timestamp_ms: i64, format: TimeFormat) -> String {
    const PATTERN: &str = "%Y-%m-%d %H-%M-%S.log";
    let Some(dt) = to_datetime(timestamp_ms) else {
        return format!("{timestamp_ms}.log");
    };
    match format {
        TimeFormat::Utc => dt.format(PATTERN).to_string(),
        TimeFormat::Local => dt.with_timezone(&Local).format(PATTERN).to_string(),
    }
}
