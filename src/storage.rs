//! Local key-value blob storage
//!
//! The watchlist persists through the [`Storage`] trait so it can run against
//! the filesystem in the binary and an in-memory map in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;

/// Storage failures (read, write or (de)serialization)
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// String-keyed blob store
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`, `None` if nothing was ever written
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace the value stored under `key`
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;
}

#[async_trait]
impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        (**self).set(key, value).await
    }
}

// =============================================================================
// File Storage
// =============================================================================

/// One file per key under a directory (`<dir>/<key>.json`)
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Replace via rename; readers see either the old or the new blob
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

// =============================================================================
// Memory Storage
// =============================================================================

/// Process-local storage, handy for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing any serialization
    pub async fn insert_raw(&self, key: &str, value: impl Into<Vec<u8>>) {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.into());
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.get("k").await.unwrap().is_none());
        storage.set("k", b"value".to_vec()).await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some(&b"value"[..]));
    }

    #[tokio::test]
    async fn test_file_storage_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));
        assert!(storage.get("user_watchlist").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_storage_creates_dir_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        storage.set("user_watchlist", b"one".to_vec()).await.unwrap();
        storage.set("user_watchlist", b"two".to_vec()).await.unwrap();

        let value = storage.get("user_watchlist").await.unwrap();
        assert_eq!(value.as_deref(), Some(&b"two"[..]));
        assert!(dir.path().join("nested/user_watchlist.json").exists());
        assert!(!dir.path().join("nested/user_watchlist.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_storage_failed_replace_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory at the target path makes the rename fail
        let target = dir.path().join("user_watchlist.json");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("occupied"), b"x").unwrap();

        let storage = FileStorage::new(dir.path());
        assert!(storage.set("user_watchlist", b"value".to_vec()).await.is_err());
        assert!(!dir.path().join("user_watchlist.json.tmp").exists());
        assert!(target.is_dir());
    }

    #[tokio::test]
    async fn test_file_storage_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(matches!(
            storage.get("../escape").await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
