//! Event store for eventlog.
//!
//! [`EventLogger`] appends encoded events to a [`KeyValueStore`], mirrors them
//! to a [`ConsoleSink`], answers level queries by linearly scanning the store,
//! and hands full reports to a [`FileSaver`] on export. Nothing is cached: every
//! read goes back to the store.

pub mod clock;
pub mod console;
pub mod export;
pub mod file_store;
pub mod kv;
pub mod logger;

pub use clock::{Clock, ManualClock, SystemClock};
pub use console::{ConsoleLine, ConsoleSink, MemoryConsole, StdioConsole};
pub use export::{DirectorySaver, FileSaver, MemorySaver, SavedFile};
pub use file_store::FileStore;
pub use kv::{KeyValueStore, MemoryStore, StoreError, UnavailableStore};
pub use logger::{AppendOutcome, EventLogger, SharedLogger, UNSUPPORTED_DESTINATION};
