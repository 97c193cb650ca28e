//! Client-local key-value storage.
//!
//! Gamification records are JSON strings stored under fixed keys, mirroring
//! the browser-local storage of the hub's front end. The [`KeyValueStore`]
//! trait is the seam: trackers take an explicit store so tests can run
//! against [`MemoryStore`] while the desktop build uses [`FileStore`].

mod config;
mod file;
mod memory;

pub use config::{Config, GamificationConfig, NotificationsConfig, UiConfig};
pub use file::FileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::{ConfigError, StorageError};

/// String key-value storage scoped to the local client.
///
/// `get` never fails: a missing or unreadable value reads as absent and the
/// caller falls back to defaults. Writes report failures so callers can
/// propagate them.
pub trait KeyValueStore {
    /// Fetch the raw string value for `key`, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, overwriting any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key` entirely. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// All keys currently present, in unspecified order.
    fn keys(&self) -> Vec<String>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}

/// Returns `~/.config/sciencehub[-dev]/` based on SCIENCEHUB_ENV.
///
/// Set SCIENCEHUB_ENV=dev to use a separate development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("SCIENCEHUB_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("sciencehub-dev")
    } else {
        base_dir.join("sciencehub")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}
