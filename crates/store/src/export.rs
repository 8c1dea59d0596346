//! File-save collaborators used by export.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use eventlog_codec::LogError;

/// Delivers exported content under a file name.
pub trait FileSaver: Send {
    fn save(&mut self, content: &str, filename: &str) -> Result<(), LogError>;
}

/// Writes exports into a directory, creating it on demand.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Flattens `filename` into a single path component: `/`, `\` and `:` become
/// `-`, leading dots are dropped, and an empty result becomes `export.log`.
fn sanitize(filename: &str) -> String {
    let name: String = filename
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '-' } else { c })
        .collect();
    let name = name.trim_start_matches('.');
    if name.is_empty() {
        "export.log".to_owned()
    } else {
        name.to_owned()
    }
}

impl FileSaver for DirectorySaver {
    fn save(&mut self, content: &str, filename: &str) -> Result<(), LogError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| LogError::Export(format!("{}: {e}", self.dir.display())))?;
        let path = self.dir.join(sanitize(filename));
        std::fs::write(&path, content)
            .map_err(|e| LogError::Export(format!("{}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), bytes = content.len(), "exported event log");
        Ok(())
    }
}

/// An export captured by [`MemorySaver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub filename: String,
    pub content: String,
}

/// Saver that records exports in memory. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct MemorySaver {
    saved: Arc<Mutex<Vec<SavedFile>>>,
}

impl MemorySaver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec<SavedFile> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<SavedFile> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl FileSaver for MemorySaver {
    fn save(&mut self, content: &str, filename: &str) -> Result<(), LogError> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SavedFile {
                filename: filename.to_owned(),
                content: content.to_owned(),
            });
        Ok(())
    }
}
