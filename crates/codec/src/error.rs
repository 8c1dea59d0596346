/// Flat classification of [`LogError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedRecord,
    StorageUnavailable,
    UnsupportedDestination,
    InvalidLevel,
    Export,
}

/// Errors produced by the event pipeline.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("malformed record {key:?}: {reason}")]
    MalformedRecord { key: String, reason: String },

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("unsupported destination: {0}")]
    UnsupportedDestination(u8),

    #[error("invalid level for an event: {0}")]
    InvalidLevel(String),

    #[error("export failed: {0}")]
    Export(String),
}

impl LogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedRecord { .. } => ErrorKind::MalformedRecord,
            Self::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            Self::UnsupportedDestination(_) => ErrorKind::UnsupportedDestination,
            Self::InvalidLevel(_) => ErrorKind::InvalidLevel,
            Self::Export(_) => ErrorKind::Export,
        }
    }

    pub(crate) fn malformed(key: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            key: key.to_owned(),
            reason: reason.into(),
        }
    }
}
