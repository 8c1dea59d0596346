//! Console sinks for transient output.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

/// Receives unpersisted output as a formatted prefix plus message.
pub trait ConsoleSink: Send {
    fn write(&mut self, prefix: &str, message: &str);
}

fn join(prefix: &str, message: &str) -> String {
    if prefix.is_empty() {
        message.to_owned()
    } else {
        format!("{prefix} {message}")
    }
}

/// Writes lines to stdout.
///
/// When stdout cannot be written, the line is surfaced on stderr if
/// `alert_fallback` is set and dropped otherwise.
#[derive(Debug, Clone, Copy)]
pub struct StdioConsole {
    alert_fallback: bool,
}

impl StdioConsole {
    pub fn new(alert_fallback: bool) -> Self {
        Self { alert_fallback }
    }
}

impl Default for StdioConsole {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConsoleSink for StdioConsole {
    fn write(&mut self, prefix: &str, message: &str) {
        let line = join(prefix, message);
        if writeln!(std::io::stdout().lock(), "{line}").is_ok() {
            return;
        }
        if self.alert_fallback {
            let _ = writeln!(std::io::stderr().lock(), "{line}");
        }
    }
}

/// A line captured by [`MemoryConsole`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub prefix: String,
    pub message: String,
}

impl ConsoleLine {
    /// The line as a stdio console would print it.
    pub fn text(&self) -> String {
        join(&self.prefix, &self.message)
    }
}

/// Console that records lines in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryConsole {
    lines: Arc<Mutex<Vec<ConsoleLine>>>,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<ConsoleLine> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConsoleSink for MemoryConsole {
    fn write(&mut self, prefix: &str, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ConsoleLine {
                prefix: prefix.to_owned(),
                message: message.to_owned(),
            });
    }
}
