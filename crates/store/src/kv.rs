//! Synchronous string-to-string store abstraction.

use eventlog_codec::LogError;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("quota exceeded: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded { needed: usize, limit: usize },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for LogError {
    fn from(err: StoreError) -> Self {
        LogError::StorageUnavailable(err.to_string())
    }
}

/// A persistent key-value store with indexed key access.
///
/// Iteration via [`key_at`](Self::key_at) follows the store's native order.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Inserts or replaces the value for `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`. Absent keys are not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    fn len(&self) -> Result<usize, StoreError>;

    /// Key at position `index`, or `None` past the end.
    fn key_at(&self, index: usize) -> Result<Option<String>, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// In-memory store preserving insertion order.
///
/// An optional byte quota makes writes fail with
/// [`StoreError::QuotaExceeded`] once keys and values exceed it.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Vec<(String, String)>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes beyond `bytes` of content.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: Vec::new(),
            quota: Some(bytes),
        }
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.position(key).map(|i| self.entries[i].1.clone()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let existing = self.position(key);
        if let Some(limit) = self.quota {
            let replaced = existing.map_or(0, |i| key.len() + self.entries[i].1.len());
            let needed = self.used_bytes() - replaced + key.len() + value.len();
            if needed > limit {
                return Err(StoreError::QuotaExceeded { needed, limit });
            }
        }
        match existing {
            Some(i) => self.entries[i].1 = value.to_owned(),
            None => self.entries.push((key.to_owned(), value.to_owned())),
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.retain(|(k, _)| k != key);
        Ok(())
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.entries.len())
    }

    fn key_at(&self, index: usize) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(index).map(|(k, _)| k.clone()))
    }
}

/// Stand-in for a store that could not be opened. Every call fails with
/// [`StoreError::Unavailable`], so appends degrade to console output.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> StoreError {
        StoreError::Unavailable(self.reason.clone())
    }
}

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(self.error())
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(self.error())
    }

    fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
        Err(self.error())
    }

    fn len(&self) -> Result<usize, StoreError> {
        Err(self.error())
    }

    fn key_at(&self, _index: usize) -> Result<Option<String>, StoreError> {
        Err(self.error())
    }
}
