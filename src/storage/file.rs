use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use super::{KeyValueStore, StorageError};

/// Key-value storage as one JSON file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Store rooted at the platform data directory.
    pub fn default_location() -> Result<Self> {
        let data_dir = dirs::data_dir().context("Failed to get data directory")?;
        Ok(Self::new(data_dir.join("marquee")))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        let contents = tokio::task::spawn_blocking(move || -> Result<Option<String>, std::io::Error> {
            match std::fs::read_to_string(&path) {
                Ok(contents) => Ok(Some(contents)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(|e| StorageError::Unavailable(e.to_string()))??;

        Ok(contents)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let dir = self.dir.clone();
        let value = value.to_string();

        tokio::task::spawn_blocking(move || -> Result<(), std::io::Error> {
            std::fs::create_dir_all(&dir)?;
            std::fs::write(&path, value)
        })
        .await
        .map_err(|e| StorageError::Unavailable(e.to_string()))??;

        debug!("Wrote storage key {:?}", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);

        tokio::task::spawn_blocking(move || -> Result<(), std::io::Error> {
            match std::fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(|e| StorageError::Unavailable(e.to_string()))??;

        debug!("Removed storage key {:?}", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn round_trips_a_value() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());

        assert_eq!(store.get("favorites").await.unwrap(), None);

        store.set("favorites", "[1,2,3]").await.unwrap();
        assert_eq!(
            store.get("favorites").await.unwrap().as_deref(),
            Some("[1,2,3]")
        );
    }

    #[tokio::test]
    async fn remove_deletes_the_key_and_tolerates_absence() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());

        store.set("favorites", "[]").await.unwrap();
        store.remove("favorites").await.unwrap();
        assert_eq!(store.get("favorites").await.unwrap(), None);
        assert!(!dir.path().join("favorites.json").exists());

        // Removing again is a no-op, not an error.
        store.remove("favorites").await.unwrap();
    }

    #[tokio::test]
    async fn creates_the_data_directory_on_first_write() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("deeper"));

        store.set("favorites", "[]").await.unwrap();
        assert_eq!(store.get("favorites").await.unwrap().as_deref(), Some("[]"));
    }
}
