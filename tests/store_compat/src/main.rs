fn main() {
    println!("Run `cargo test -p store-compat` to execute storage compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use eventlog_codec::{LogLevel, decode_key};
    use eventlog_store::{
        EventLogger, FileStore, KeyValueStore, ManualClock, MemoryConsole, MemorySaver,
        MemoryStore,
    };

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a `[key, value]` pair dump.
    fn load_dump(name: &str) -> Vec<(String, String)> {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    fn load_expected(name: &str) -> String {
        let path = fixtures_dir().join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    fn logger_over(store: impl KeyValueStore + 'static) -> EventLogger {
        EventLogger::new(store, MemoryConsole::new(), MemorySaver::new())
            .with_clock(ManualClock::new(0))
    }

    fn memory_store_from(dump: &[(String, String)]) -> MemoryStore {
        let mut store = MemoryStore::new();
        for (key, value) in dump {
            store.set(key, value).unwrap();
        }
        store
    }

    #[test]
    fn browser_dump_report_matches() {
        let dump = load_dump("browser_dump.json");
        let logger = logger_over(memory_store_from(&dump));

        assert_eq!(
            logger.query(LogLevel::All).unwrap(),
            load_expected("browser_dump.expected.log")
        );
    }

    #[test]
    fn browser_dump_level_filters() {
        let dump = load_dump("browser_dump.json");
        let logger = logger_over(memory_store_from(&dump));

        assert_eq!(logger.query(LogLevel::Error).unwrap().lines().count(), 1);
        assert_eq!(logger.query(LogLevel::Warning).unwrap().lines().count(), 1);
        assert_eq!(logger.query_events(LogLevel::Information).unwrap().len(), 2);
    }

    #[test]
    fn browser_dump_opens_as_file_store() {
        let store = FileStore::open(fixtures_dir().join("browser_dump.json")).unwrap();
        assert_eq!(store.len().unwrap(), 6);

        let logger = logger_over(store);
        assert_eq!(
            logger.query(LogLevel::All).unwrap(),
            load_expected("browser_dump.expected.log")
        );
    }

    #[test]
    fn every_event_key_reencodes_identically() {
        for (key, _) in load_dump("browser_dump.json") {
            let Ok(decoded) = decode_key(&key) else {
                continue;
            };
            let reencoded = eventlog_codec::encode_key(decoded.timestamp, decoded.level);
            assert_eq!(reencoded.as_str(), key);
        }
    }
}
