use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("credential storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("credential storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Durable string key/value storage for session material.
///
/// Every call is synchronous: when `set` returns `Ok` the value is on durable
/// storage.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing and expired entries are `None`
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a value. Removing a missing key is not an error
    fn remove(&self, key: &str) -> StorageResult<()>;
}
