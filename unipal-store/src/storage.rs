//! Pluggable key-value storage.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs;

use crate::error::StoreError;

/// Flat string key-value storage backing the cache layer.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Reads a value, `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Writes a value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Deletes a key; deleting an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// One file per key under a base directory. Writes go through a temp file
/// and rename so a crash never leaves a half-written entry behind.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates the storage rooted at `dir`. The directory is created on
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The conventional data directory for the current platform.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("unipal"))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are dot-namespaced identifiers; keep anything path-like out
        // of the filename.
        let safe: String = key
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage for tests.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw entry, bypassing the cache envelope. Lets tests plant
    /// malformed blobs.
    pub fn seed(&self, key: &str, raw: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), raw.to_string());
    }

    /// True when the key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
