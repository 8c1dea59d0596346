use std::panic::PanicHookInfo;

/// An uncaught error as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub message: String,
    pub source_url: String,
    pub line: u32,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>, source_url: impl Into<String>, line: u32) -> Self {
        Self {
            message: message.into(),
            source_url: source_url.into(),
            line,
        }
    }

    /// Builds a report from a panic, using its location as the source.
    pub fn from_panic(info: &PanicHookInfo<'_>) -> Self {
        let payload = info.payload();
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_owned()
        };
        let (source_url, line) = info
            .location()
            .map(|loc| (loc.file().to_owned(), loc.line()))
            .unwrap_or_default();
        Self {
            message,
            source_url,
            line,
        }
    }

    /// Event text: `<message> at line: <line> in <url>`.
    pub fn describe(&self) -> String {
        format!("{} at line: {} in {}", self.message, self.line, self.source_url)
    }
}
