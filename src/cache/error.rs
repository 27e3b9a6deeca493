use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read cache file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to write cache file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode cache data from '{0}'")]
    Decode(PathBuf, #[source] serde_json::Error),

    #[error("Failed to encode cache data")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to move cache data into place at '{0}'")]
    Persist(PathBuf, #[source] tempfile::PersistError),

    #[error("Cache store at '{0}' is unavailable")]
    Unavailable(PathBuf),

    #[error("Cache store lock was poisoned")]
    LockPoisoned,

    #[error("Background cache write failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
