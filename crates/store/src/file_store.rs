//! JSON-file backed persistent store.
//!
//! Entries are kept as a JSON array of `[key, value]` pairs so insertion order
//! survives restarts. Every mutation rewrites the file through a temporary
//! sibling and a rename; the in-memory copy only changes once the write lands.

use std::path::{Path, PathBuf};

use crate::kv::{KeyValueStore, StoreError};

/// Persistent store backed by a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Vec<(String, String)>,
}

impl FileStore {
    /// Opens the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Vec::new()
        };
        tracing::debug!(path = %path.display(), entries = entries.len(), "opened event store");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn commit(&mut self, entries: Vec<(String, String)>) -> Result<(), StoreError> {
        write_atomic(&self.path, &entries)?;
        self.entries = entries;
        Ok(())
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

fn write_atomic(path: &Path, entries: &[(String, String)]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string(entries)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, json)?;
    if let Err(err) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(err.into());
    }
    Ok(())
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.position(key).map(|i| self.entries[i].1.clone()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.clone();
        match self.position(key) {
            Some(i) => entries[i].1 = value.to_owned(),
            None => entries.push((key.to_owned(), value.to_owned())),
        }
        self.commit(entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.position(key).is_none() {
            return Ok(());
        }
        let entries = self
            .entries
            .iter()
            .filter(|(k, _)| k != key)
            .cloned()
            .collect();
        self.commit(entries)
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.entries.len())
    }

    fn key_at(&self, index: usize) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(index).map(|(k, _)| k.clone()))
    }
}
