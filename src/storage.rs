//! Durable client-side key-value storage
//!
//! This module provides:
//! - A `KeyValueStore` seam used by the thread identity provider
//! - `FileStore`, one file per key under the platform data directory
//! - `MemoryStore`, for tests and ephemeral sessions

use crate::error::{ChatError, ChatResult};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> ChatResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> ChatResult<()>;
    fn delete(&self, key: &str) -> ChatResult<()>;
}

// ============================================
// File-backed store
// ============================================

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store under the platform's local data dir, or `./cache` when there is none.
    pub fn platform_default() -> Self {
        Self::new(default_storage_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(sanitize_key(key))
    }
}

pub fn default_storage_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("narutoverse").join("storage");
    }

    PathBuf::from("cache").join("storage")
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> ChatResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ChatError::storage(format!("Failed to read {key}: {err}"))),
        }
    }

    fn set(&self, key: &str, value: &str) -> ChatResult<()> {
        fs::create_dir_all(&self.root)
            .map_err(|e| ChatError::storage(format!("Failed to create storage directory: {e}")))?;
        fs::write(self.path_for(key), value)
            .map_err(|e| ChatError::storage(format!("Failed to write {key}: {e}")))
    }

    fn delete(&self, key: &str) -> ChatResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ChatError::storage(format!("Failed to delete {key}: {err}"))),
        }
    }
}

/// Sanitize storage key for filesystem use
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(64)
        .collect()
}

// ============================================
// In-memory store
// ============================================

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> ChatResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| ChatError::storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ChatResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| ChatError::storage(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> ChatResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| ChatError::storage(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}
