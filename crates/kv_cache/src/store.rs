//! Key-value store implementations.
//!
//! `JsonFileStore` persists the whole map as one JSON file, re-written on
//! every mutation — entry counts here are small (one per distinct ingredient
//! or term) and whole-file writes keep the on-disk format trivially
//! inspectable. `MemoryStore` backs tests and `--no-cache-persist` runs.

use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use common::{Error, KeyValueStore, Result};
use tokio::sync::Mutex;
use tracing::{debug, warn};

const STORE_FILE: &str = "kv-store.json";

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn all_keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.lock().await.keys().cloned().collect())
    }
}

/// JSON-file-backed store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open (or create) the store file under `dir`.
    ///
    /// A corrupted store file is discarded and replaced — the cache layer is
    /// rebuildable from the external services, so starting empty beats
    /// refusing to start.
    pub fn open(dir: &Path) -> Result<Self> {
        create_dir_all(dir)?;
        let path = dir.join(STORE_FILE);

        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Discarding corrupted store file {}: {}", path.display(), e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        debug!(
            "Opened store {} with {} entries",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        let raw = serde_json::to_string_pretty(entries)?;
        let mut file = File::create(&self.path)
            .map_err(|e| Error::Store(format!("create {}: {}", self.path.display(), e)))?;
        file.write_all(raw.as_bytes())
            .map_err(|e| Error::Store(format!("write {}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        self.persist(&entries)
    }

    async fn all_keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.lock().await.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("kv-store-test-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get_item("a").await.unwrap(), None);

        store.set_item("a", "1").await.unwrap();
        assert_eq!(store.get_item("a").await.unwrap(), Some("1".into()));

        store.set_item("a", "2").await.unwrap();
        assert_eq!(store.get_item("a").await.unwrap(), Some("2".into()));

        store.remove_item("a").await.unwrap();
        assert_eq!(store.get_item("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_persists_across_reopen() {
        let dir = temp_dir();

        {
            let store = JsonFileStore::open(&dir).unwrap();
            store.set_item("normalization:garlic", "garlic").await.unwrap();
            store.set_item("image:garlic", "http://x/garlic.png").await.unwrap();
        }

        let reopened = JsonFileStore::open(&dir).unwrap();
        assert_eq!(
            reopened.get_item("normalization:garlic").await.unwrap(),
            Some("garlic".into())
        );
        let mut keys = reopened.all_keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["image:garlic", "normalization:garlic"]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_file_store_discards_corrupted_file() {
        let dir = temp_dir();
        create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(STORE_FILE), "{not json").unwrap();

        let store = JsonFileStore::open(&dir).unwrap();
        assert!(store.all_keys().await.unwrap().is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }
}
