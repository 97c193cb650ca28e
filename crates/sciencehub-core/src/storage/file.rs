//! File-backed store: one JSON object file mapping keys to string values.
//!
//! Write-through: every `set`/`remove` rewrites the file. The store is
//! single-writer per client, so no locking is done.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{data_dir, KeyValueStore};
use crate::error::{CoreError, StorageError};

const STORE_FILE: &str = "store.json";

/// JSON-file-backed key-value store.
///
/// An unreadable or corrupt file at open time degrades to an empty store;
/// the bad contents are overwritten on the next write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at the default location, `data_dir()/store.json`.
    pub fn open_default() -> Result<Self, CoreError> {
        Ok(Self::open(data_dir()?.join(STORE_FILE)))
    }

    /// Open a store backed by `path`. The file is created on first write.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self { path, entries }
    }

    fn flush(&self) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            StorageError::SerializeFailed {
                key: STORE_FILE.to_string(),
                source,
            }
        })?;
        std::fs::write(&self.path, content).map_err(|source| StorageError::WriteFailed {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let mut store = FileStore::open(&path);
        store.set("sh_streak", "{\"currentStreak\":3}").unwrap();
        drop(store);

        let reopened = FileStore::open(&path);
        assert_eq!(
            reopened.get("sh_streak").as_deref(),
            Some("{\"currentStreak\":3}")
        );
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json {{{").unwrap();

        let store = FileStore::open(&path);
        assert!(store.keys().is_empty());
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("absent.json"));
        assert!(store.keys().is_empty());
    }

    #[test]
    fn remove_rewrites_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let mut store = FileStore::open(&path);
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.remove("a").unwrap();
        drop(store);

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("a"), None);
        assert_eq!(reopened.get("b").as_deref(), Some("2"));
    }
}
