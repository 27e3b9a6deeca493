//! Key-value substrates the reading cache persists into.

use crate::cache::error::StorageError;
use log::{info, warn};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tempfile::NamedTempFile;

/// A string-to-string store shared by every concurrent resolution in a run.
///
/// Implementations only need to be safe for concurrent access to distinct keys.
/// Lookups and writes are synchronous and must only touch memory once the
/// store is loaded; slow persistence belongs in [`flush`](KeyValueStore::flush).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Makes previous writes durable. A no-op for stores without backing storage.
    fn flush(&self) -> impl Future<Output = Result<(), StorageError>> + Send {
        async { Ok(()) }
    }
}

/// Process-local store without backing storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: Mutex::new(
                iter.into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::LockPoisoned)?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}

#[derive(Debug)]
struct FileEntries {
    values: BTreeMap<String, String>,
    dirty: bool,
}

/// A JSON object on disk, loaded on first access and rewritten on
/// [`flush`](KeyValueStore::flush).
///
/// A missing file is an empty store. A file that cannot be read or decoded
/// leaves the store unavailable for the lifetime of the process; it is never
/// overwritten.
///
/// The first lookup reads the file on the calling task. It is a single small
/// read per process; every later lookup is served from memory. The rewrite on
/// flush runs on the blocking pool.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: OnceLock<Option<Mutex<FileEntries>>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn entries(&self) -> Result<&Mutex<FileEntries>, StorageError> {
        self.entries
            .get_or_init(|| match Self::load(&self.path) {
                Ok(values) => Some(Mutex::new(FileEntries {
                    values,
                    dirty: false,
                })),
                Err(e) => {
                    warn!(
                        "Reading cache at {} disabled: {:?}",
                        self.path.display(),
                        e
                    );
                    None
                }
            })
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable(self.path.clone()))
    }

    fn load(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StorageError::Read(path.to_path_buf(), e)),
        };
        serde_json::from_slice(&bytes).map_err(|e| StorageError::Decode(path.to_path_buf(), e))
    }

    fn write_atomically(
        path: &Path,
        values: &BTreeMap<String, String>,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(values).map_err(StorageError::Encode)?;
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp_file =
            NamedTempFile::new_in(dir).map_err(|e| StorageError::Write(path.to_path_buf(), e))?;
        temp_file
            .write_all(&json)
            .map_err(|e| StorageError::Write(path.to_path_buf(), e))?;
        temp_file
            .flush()
            .map_err(|e| StorageError::Write(path.to_path_buf(), e))?;
        temp_file
            .persist(path)
            .map_err(|e| StorageError::Persist(path.to_path_buf(), e))?;
        Ok(())
    }

    /// Takes a copy of the entries if anything changed since the last flush,
    /// clearing the dirty flag.
    fn take_dirty(&self) -> Result<Option<BTreeMap<String, String>>, StorageError> {
        let mut entries = self
            .entries()?
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;
        if !entries.dirty {
            return Ok(None);
        }
        entries.dirty = false;
        Ok(Some(entries.values.clone()))
    }

    fn mark_dirty(&self) {
        if let Ok(entries) = self.entries() {
            if let Ok(mut entries) = entries.lock() {
                entries.dirty = true;
            }
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries()?
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(entries.values.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut entries = self
            .entries()?
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;
        if entries.values.get(key) != Some(&value) {
            entries.values.insert(key.to_string(), value);
            entries.dirty = true;
        }
        Ok(())
    }

    async fn flush(&self) -> Result<(), StorageError> {
        let Some(values) = self.take_dirty()? else {
            return Ok(());
        };
        let count = values.len();
        let path = self.path.clone();
        let written =
            tokio::task::spawn_blocking(move || Self::write_atomically(&path, &values)).await;
        if let Err(e) = written.map_err(StorageError::from).and_then(|result| result) {
            // Keep the entries pending so a later flush retries the write
            self.mark_dirty();
            return Err(e);
        }
        info!(
            "Persisted {} cached readings to {}",
            count,
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() -> Result<(), StorageError> {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("2024-05-01")?, None);
        assert!(!store.contains("2024-05-01")?);
        store.set("2024-05-01", "12".to_string())?;
        assert_eq!(store.get("2024-05-01")?, Some("12".to_string()));
        assert!(store.contains("2024-05-01")?);
        store.set("2024-05-01", "13".to_string())?;
        assert_eq!(store.get("2024-05-01")?, Some("13".to_string()));
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[test]
    fn test_memory_store_from_iter() -> Result<(), StorageError> {
        let store: MemoryStore = [("2024-05-01", "12"), ("2024-05-02", "-3.5")]
            .into_iter()
            .collect();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("2024-05-02")?, Some("-3.5".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let store = JsonFileStore::new(dir.path().join("readings.json"));
        assert_eq!(store.get("2024-05-01")?, None);
        // Nothing written, nothing to flush
        store.flush().await?;
        assert!(!store.path().exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_round_trips_through_disk() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let path = dir.path().join("readings.json");

        let store = JsonFileStore::new(&path);
        store.set("2024-05-02", "14.5".to_string())?;
        store.set("2024-05-01", "12".to_string())?;
        assert!(!path.exists(), "writes are buffered until flush");
        store.flush().await?;

        let on_disk: BTreeMap<String, String> = serde_json::from_slice(&std::fs::read(&path)?)?;
        assert_eq!(on_disk.get("2024-05-02").map(String::as_str), Some("14.5"));

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("2024-05-01")?, Some("12".to_string()));
        assert_eq!(reopened.get("2024-05-02")?, Some("14.5".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_is_kept() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let path = dir.path().join("readings.json");
        std::fs::write(&path, "not json")?;

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.get("2024-05-01"),
            Err(StorageError::Unavailable(_))
        ));
        assert!(matches!(
            store.set("2024-05-01", "1".to_string()),
            Err(StorageError::Unavailable(_))
        ));
        assert!(store.flush().await.is_err());
        assert_eq!(std::fs::read_to_string(&path)?, "not json");
        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_missing_directory_fails_on_flush(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let folder = dir.path().join("gone");
        let store = JsonFileStore::new(folder.join("readings.json"));
        store.set("2024-05-01", "1".to_string())?;
        assert!(matches!(store.flush().await, Err(StorageError::Write(..))));

        // The entries stay pending and land once the folder exists
        std::fs::create_dir(&folder)?;
        store.flush().await?;
        let reopened = JsonFileStore::new(folder.join("readings.json"));
        assert_eq!(reopened.get("2024-05-01")?, Some("1".to_string()));
        Ok(())
    }
}
