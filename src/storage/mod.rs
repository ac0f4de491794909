mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable key-value slot behind the locally persisted state.
///
/// The crate persists exactly one kind of value (the serialized favorites
/// set), but the boundary is a plain string store so tests can substitute an
/// in-memory or failing implementation.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Value for `key`, or `None` when the key has never been written.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key` entirely; removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
