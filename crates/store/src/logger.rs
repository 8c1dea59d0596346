//! Event appends, level queries, deletion and export.

use std::sync::{Arc, Mutex};

use eventlog_codec::{
    Destination, LogError, LogEvent, LogLevel, StorageKey, TimeFormat, decode_key, encode_key,
    export_filename, format_line, format_prefix,
};

use crate::clock::{Clock, SystemClock};
use crate::console::ConsoleSink;
use crate::export::FileSaver;
use crate::kv::{KeyValueStore, StoreError};

/// Console message for a destination code outside `0..=2`.
pub const UNSUPPORTED_DESTINATION: &str = "Can't write to the specified location.";

/// Logger shared between callers and the error tap.
pub type SharedLogger = Arc<Mutex<EventLogger>>;

/// Result of an append.
#[derive(Debug)]
pub enum AppendOutcome {
    /// Written to the console only.
    ConsoleOnly,
    /// Persisted under the given key (and echoed to the console for `Both`).
    Persisted(StorageKey),
    /// Persistence failed; the event went to the console instead.
    Degraded(LogError),
    /// Nothing was recorded.
    Rejected(LogError),
}

impl AppendOutcome {
    pub fn key(&self) -> Option<&StorageKey> {
        match self {
            Self::Persisted(key) => Some(key),
            _ => None,
        }
    }
}

/// Appends, queries and exports events held in a [`KeyValueStore`].
pub struct EventLogger {
    store: Box<dyn KeyValueStore>,
    console: Box<dyn ConsoleSink>,
    saver: Box<dyn FileSaver>,
    clock: Box<dyn Clock>,
    time_format: TimeFormat,
    avoid_collisions: bool,
}

impl EventLogger {
    /// Creates a logger using the system clock and UTC rendering.
    pub fn new(
        store: impl KeyValueStore + 'static,
        console: impl ConsoleSink + 'static,
        saver: impl FileSaver + 'static,
    ) -> Self {
        Self {
            store: Box::new(store),
            console: Box::new(console),
            saver: Box::new(saver),
            clock: Box::new(SystemClock),
            time_format: TimeFormat::Utc,
            avoid_collisions: false,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_time_format(mut self, time_format: TimeFormat) -> Self {
        self.time_format = time_format;
        self
    }

    /// When enabled, an append whose key is already taken moves forward one
    /// millisecond at a time until a free key is found. Otherwise the newer
    /// event replaces the older one.
    pub fn with_avoid_collisions(mut self, avoid: bool) -> Self {
        self.avoid_collisions = avoid;
        self
    }

    /// Wraps the logger for sharing with an error tap.
    pub fn into_shared(self) -> SharedLogger {
        Arc::new(Mutex::new(self))
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn time_format(&self) -> TimeFormat {
        self.time_format
    }

    // -----------------------------------------------------------------------
    // Append
    // -----------------------------------------------------------------------

    /// Records `message` at `level` to `destination`.
    ///
    /// Never fails outright: a store error degrades the append to console
    /// output, and the `All` wildcard is rejected with a console diagnostic.
    pub fn append(&mut self, level: LogLevel, message: &str, destination: Destination) -> AppendOutcome {
        if level.is_filter_only() {
            let err = LogError::InvalidLevel(level.as_str().to_owned());
            self.console.write("", &err.to_string());
            return AppendOutcome::Rejected(err);
        }

        let now = self.clock.now_millis();
        let prefix = format_prefix(now, level.as_str(), self.time_format);

        if destination.writes_console() {
            self.console.write(&prefix, message);
        }
        if !destination.persists() {
            return AppendOutcome::ConsoleOnly;
        }

        match self.persist(now, level, message) {
            Ok(key) => AppendOutcome::Persisted(key),
            Err(err) => {
                tracing::warn!(
                    level = %level,
                    error = %err,
                    "event store unavailable, logging to console only"
                );
                if !destination.writes_console() {
                    self.console.write(&prefix, message);
                }
                AppendOutcome::Degraded(err.into())
            }
        }
    }

    /// Like [`append`](Self::append) with a raw destination code.
    ///
    /// Unknown codes are reported to the console and nothing is persisted.
    pub fn append_to_code(&mut self, level: LogLevel, message: &str, code: u8) -> AppendOutcome {
        match Destination::try_from(code) {
            Ok(destination) => self.append(level, message, destination),
            Err(err) => {
                self.console.write("", UNSUPPORTED_DESTINATION);
                AppendOutcome::Rejected(err)
            }
        }
    }

    pub fn error(&mut self, message: &str, destination: Destination) -> AppendOutcome {
        self.append(LogLevel::Error, message, destination)
    }

    pub fn warn(&mut self, message: &str, destination: Destination) -> AppendOutcome {
        self.append(LogLevel::Warning, message, destination)
    }

    pub fn info(&mut self, message: &str, destination: Destination) -> AppendOutcome {
        self.append(LogLevel::Information, message, destination)
    }

    fn persist(&mut self, now: i64, level: LogLevel, message: &str) -> Result<StorageKey, StoreError> {
        let mut key = encode_key(now, level.as_str());
        if self.avoid_collisions {
            let mut ts = now;
            while self.store.get(key.as_str())?.is_some() {
                ts += 1;
                key = encode_key(ts, level.as_str());
            }
        }
        self.store.set(key.as_str(), message)?;
        Ok(key)
    }

    // -----------------------------------------------------------------------
    // Query
    // -----------------------------------------------------------------------

    /// Visits every stored entry passing `requested`, in store order.
    ///
    /// Keys that do not decode are skipped with a warning.
    fn scan(
        &self,
        requested: LogLevel,
        mut visit: impl FnMut(&str, i64, &str, String),
    ) -> Result<(), LogError> {
        let len = self.store.len()?;
        for index in 0..len {
            let Some(key) = self.store.key_at(index)? else {
                continue;
            };
            let decoded = match decode_key(&key) {
                Ok(decoded) => decoded,
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "skipping malformed record");
                    continue;
                }
            };
            if !requested.matches(decoded.level) {
                continue;
            }
            if let Some(value) = self.store.get(&key)? {
                visit(&key, decoded.timestamp, decoded.level, value);
            }
        }
        Ok(())
    }

    /// Report of all events matching `requested`, one line per entry.
    pub fn query(&self, requested: LogLevel) -> Result<String, LogError> {
        let mut report = String::new();
        let format = self.time_format;
        self.scan(requested, |_, ts, level, message| {
            report.push_str(&format_line(ts, level, &message, format));
        })?;
        Ok(report)
    }

    /// Typed events matching `requested`.
    ///
    /// Entries whose level is not one of the event levels are left out.
    pub fn query_events(&self, requested: LogLevel) -> Result<Vec<LogEvent>, LogError> {
        let mut events = Vec::new();
        self.scan(requested, |key, ts, level, message| {
            let parsed = level
                .parse::<LogLevel>()
                .and_then(|level| LogEvent::new(ts, level, message));
            match parsed {
                Ok(event) => events.push(event),
                Err(err) => tracing::debug!(key, error = %err, "entry has no event level"),
            }
        })?;
        Ok(events)
    }

    // -----------------------------------------------------------------------
    // Delete / clear
    // -----------------------------------------------------------------------

    /// Removes the entry named `key`, matching ASCII case-insensitively.
    ///
    /// Returns how many entries were removed; an absent key removes none.
    pub fn delete(&mut self, key: &str) -> Result<usize, LogError> {
        let matching = self.keys_where(|stored| stored.eq_ignore_ascii_case(key))?;
        for stored in &matching {
            self.store.remove(stored)?;
        }
        if !matching.is_empty() {
            tracing::debug!(key, removed = matching.len(), "deleted event");
        }
        Ok(matching.len())
    }

    /// Removes every entry whose key decodes as an event key.
    pub fn clear(&mut self) -> Result<usize, LogError> {
        let matching = self.keys_where(|stored| decode_key(stored).is_ok())?;
        for stored in &matching {
            self.store.remove(stored)?;
        }
        tracing::info!(removed = matching.len(), "cleared event log");
        Ok(matching.len())
    }

    fn keys_where(&self, mut pred: impl FnMut(&str) -> bool) -> Result<Vec<String>, LogError> {
        let len = self.store.len()?;
        let mut keys = Vec::new();
        for index in 0..len {
            if let Some(stored) = self.store.key_at(index)? {
                if pred(&stored) {
                    keys.push(stored);
                }
            }
        }
        Ok(keys)
    }

    // -----------------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------------

    /// Hands the full report to the file saver under a time-derived name.
    pub fn export_all(&mut self) -> Result<(), LogError> {
        let content = self.query(LogLevel::All)?;
        let filename = export_filename(self.clock.now_millis(), self.time_format);
        self.saver.save(&content, &filename)
    }
}

impl std::fmt::Debug for EventLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLogger")
            .field("time_format", &self.time_format)
            .field("avoid_collisions", &self.avoid_collisions)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::console::MemoryConsole;
    use crate::export::MemorySaver;
    use crate::kv::MemoryStore;

    struct Harness {
        logger: EventLogger,
        console: MemoryConsole,
        saver: MemorySaver,
        clock: ManualClock,
    }

    fn harness_with(store: MemoryStore) -> Harness {
        let console = MemoryConsole::new();
        let saver = MemorySaver::new();
        let clock = ManualClock::new(1000);
        let logger = EventLogger::new(store, console.clone(), saver.clone()).with_clock(clock.clone());
        Harness {
            logger,
            console,
            saver,
            clock,
        }
    }

    fn harness() -> Harness {
        harness_with(MemoryStore::new())
    }

    #[test]
    fn boot_scenario() {
        let mut h = harness();
        let outcome = h.logger.info("boot", Destination::LocalStorage);

        assert_eq!(outcome.key().map(StorageKey::as_str), Some("1000_INFO"));
        assert_eq!(h.logger.store().len().unwrap(), 1);
        assert_eq!(
            h.logger.store().get("1000_INFO").unwrap().as_deref(),
            Some("boot")
        );
        assert_eq!(
            h.logger.query(LogLevel::Information).unwrap(),
            "[1970-01-01T00:00:01.000Z] [INFO]> boot\n"
        );
    }

    #[test]
    fn query_lists_each_entry_once() {
        let mut h = harness();
        h.logger.error("a", Destination::LocalStorage);
        h.clock.advance(1);
        h.logger.warn("b", Destination::LocalStorage);
        h.clock.advance(1);
        h.logger.info("c", Destination::LocalStorage);

        let all = h.logger.query(LogLevel::All).unwrap();
        let lines: Vec<&str> = all.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("[ERROR]> a"));
        assert!(lines[1].ends_with("[WARN]> b"));
        assert!(lines[2].ends_with("[INFO]> c"));

        let errors = h.logger.query(LogLevel::Error).unwrap();
        assert_eq!(errors.lines().count(), 1);
        assert_eq!(errors, "[1970-01-01T00:00:01.000Z] [ERROR]> a\n");
    }

    #[test]
    fn query_without_matches_is_empty() {
        let mut h = harness();
        h.logger.info("only info", Destination::LocalStorage);
        assert_eq!(h.logger.query(LogLevel::Warning).unwrap(), "");
    }

    #[test]
    fn console_destination_does_not_persist() {
        let mut h = harness();
        let outcome = h.logger.warn("transient", Destination::Console);

        assert!(matches!(outcome, AppendOutcome::ConsoleOnly));
        assert_eq!(h.logger.store().len().unwrap(), 0);
        let lines = h.console.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].prefix, "[1970-01-01T00:00:01.000Z] [WARN]>");
        assert_eq!(lines[0].message, "transient");
    }

    #[test]
    fn local_storage_destination_is_silent() {
        let mut h = harness();
        h.logger.error("quiet", Destination::LocalStorage);
        assert!(h.console.is_empty());
        assert_eq!(h.logger.store().len().unwrap(), 1);
    }

    #[test]
    fn both_destination_writes_both() {
        let mut h = harness();
        h.logger.info("twice", Destination::Both);
        assert_eq!(h.console.len(), 1);
        assert_eq!(h.logger.store().len().unwrap(), 1);
    }

    #[test]
    fn unknown_destination_code_reports_and_skips() {
        let mut h = harness();
        let outcome = h.logger.append_to_code(LogLevel::Error, "lost", 9);

        assert!(matches!(
            outcome,
            AppendOutcome::Rejected(LogError::UnsupportedDestination(9))
        ));
        assert_eq!(h.logger.store().len().unwrap(), 0);
        assert_eq!(h.console.lines()[0].text(), UNSUPPORTED_DESTINATION);
    }

    #[test]
    fn known_destination_code_appends() {
        let mut h = harness();
        let outcome = h.logger.append_to_code(LogLevel::Warning, "coded", 1);
        assert_eq!(outcome.key().map(StorageKey::as_str), Some("1000_WARN"));
    }

    #[test]
    fn wildcard_level_is_rejected() {
        let mut h = harness();
        let outcome = h.logger.append(LogLevel::All, "nope", Destination::Both);

        assert!(matches!(outcome, AppendOutcome::Rejected(LogError::InvalidLevel(_))));
        assert_eq!(h.logger.store().len().unwrap(), 0);
        assert_eq!(h.console.len(), 1);
    }

    #[test]
    fn store_failure_degrades_to_console() {
        let mut h = harness_with(MemoryStore::with_quota(4));
        let outcome = h.logger.error("too big for the store", Destination::LocalStorage);

        match outcome {
            AppendOutcome::Degraded(err) => {
                assert_eq!(err.kind(), eventlog_codec::ErrorKind::StorageUnavailable);
            }
            other => panic!("expected degraded append, got {other:?}"),
        }
        assert_eq!(h.logger.store().len().unwrap(), 0);
        assert_eq!(h.console.lines()[0].message, "too big for the store");
    }

    #[test]
    fn degraded_both_does_not_echo_twice() {
        let mut h = harness_with(MemoryStore::with_quota(4));
        h.logger.error("too big for the store", Destination::Both);
        assert_eq!(h.console.len(), 1);
    }

    #[test]
    fn same_millisecond_same_level_overwrites() {
        let mut h = harness();
        h.logger.error("first", Destination::LocalStorage);
        h.logger.error("second", Destination::LocalStorage);

        assert_eq!(h.logger.store().len().unwrap(), 1);
        assert_eq!(
            h.logger.store().get("1000_ERROR").unwrap().as_deref(),
            Some("second")
        );
    }

    #[test]
    fn avoid_collisions_shifts_timestamp() {
        let mut h = harness();
        h.logger = h.logger.with_avoid_collisions(true);
        h.logger.error("first", Destination::LocalStorage);
        let second = h.logger.error("second", Destination::LocalStorage);
        let third = h.logger.error("third", Destination::LocalStorage);

        assert_eq!(second.key().map(StorageKey::as_str), Some("1001_ERROR"));
        assert_eq!(third.key().map(StorageKey::as_str), Some("1002_ERROR"));
        assert_eq!(h.logger.store().len().unwrap(), 3);
    }

    #[test]
    fn same_millisecond_different_level_coexist() {
        let mut h = harness();
        h.logger.error("e", Destination::LocalStorage);
        h.logger.info("i", Destination::LocalStorage);
        assert_eq!(h.logger.store().len().unwrap(), 2);
    }

    #[test]
    fn malformed_keys_are_skipped() {
        let mut store = MemoryStore::new();
        store.set("theme", "dark").unwrap();
        store.set("abc_INFO", "garbled").unwrap();
        store.set("1000_INFO", "ok").unwrap();
        let h = harness_with(store);

        assert_eq!(
            h.logger.query(LogLevel::All).unwrap(),
            "[1970-01-01T00:00:01.000Z] [INFO]> ok\n"
        );
    }

    #[test]
    fn unknown_levels_only_match_all() {
        let mut store = MemoryStore::new();
        store.set("1000_TRACE", "custom").unwrap();
        let h = harness_with(store);

        assert_eq!(h.logger.query(LogLevel::Information).unwrap(), "");
        assert_eq!(
            h.logger.query(LogLevel::All).unwrap(),
            "[1970-01-01T00:00:01.000Z] [TRACE]> custom\n"
        );
        assert!(h.logger.query_events(LogLevel::All).unwrap().is_empty());
    }

    #[test]
    fn query_events_returns_typed_events() {
        let mut h = harness();
        h.logger.warn("w", Destination::LocalStorage);
        h.clock.advance(10);
        h.logger.error("e", Destination::LocalStorage);

        let events = h.logger.query_events(LogLevel::All).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].level(), LogLevel::Warning);
        assert_eq!(events[1].timestamp(), 1010);
        assert_eq!(events[1].message(), "e");
    }

    #[test]
    fn delete_is_case_insensitive() {
        let mut h = harness();
        h.logger.info("boot", Destination::LocalStorage);

        assert_eq!(h.logger.delete("1000_info").unwrap(), 1);
        assert_eq!(h.logger.store().len().unwrap(), 0);
    }

    #[test]
    fn delete_absent_is_noop() {
        let mut h = harness();
        h.logger.info("boot", Destination::LocalStorage);

        assert_eq!(h.logger.delete("nonexistent_key").unwrap(), 0);
        assert_eq!(h.logger.store().len().unwrap(), 1);
    }

    #[test]
    fn clear_keeps_foreign_keys() {
        let mut store = MemoryStore::new();
        store.set("theme", "dark").unwrap();
        let mut h = harness_with(store);
        h.logger.info("a", Destination::LocalStorage);
        h.logger.error("b", Destination::LocalStorage);

        assert_eq!(h.logger.clear().unwrap(), 2);
        assert_eq!(h.logger.store().len().unwrap(), 1);
        assert_eq!(h.logger.store().key_at(0).unwrap().as_deref(), Some("theme"));
    }

    #[test]
    fn export_matches_query_all() {
        let mut h = harness();
        h.logger.error("a", Destination::LocalStorage);
        h.clock.advance(5);
        h.logger.info("b", Destination::Both);

        let expected = h.logger.query(LogLevel::All).unwrap();
        h.clock.set(1_700_000_000_123);
        h.logger.export_all().unwrap();

        let saved = h.saver.last().unwrap();
        assert_eq!(saved.content, expected);
        assert_eq!(saved.filename, "2023-11-14 22-13-20.log");
    }

    #[test]
    fn export_of_empty_store_is_empty() {
        let mut h = harness();
        h.logger.export_all().unwrap();
        assert_eq!(h.saver.last().unwrap().content, "");
    }

    struct FullDisk;

    impl FileSaver for FullDisk {
        fn save(&mut self, _content: &str, filename: &str) -> Result<(), LogError> {
            Err(LogError::Export(format!("no space left for {filename}")))
        }
    }

    #[test]
    fn export_failure_is_reported_and_store_kept() {
        let mut logger = EventLogger::new(MemoryStore::new(), MemoryConsole::new(), FullDisk)
            .with_clock(ManualClock::new(1000));
        logger.warn("disk nearly full", Destination::LocalStorage);

        let err = logger.export_all().unwrap_err();
        assert_eq!(err.kind(), eventlog_codec::ErrorKind::Export);
        assert_eq!(
            logger.store().get("1000_WARN").unwrap().as_deref(),
            Some("disk nearly full")
        );
    }
}
