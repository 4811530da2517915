//! Durable key-value storage for the match history
//!
//! The ranking core only needs to read and write one serialized record under a
//! well-known key. This module defines that interface with an in-memory and a
//! file-backed implementation.

use crate::error::{RankingError, Result};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use tracing::debug;

/// Trait for history storage operations
#[cfg_attr(test, mockall::automock)]
pub trait HistoryStore: Send + Sync {
    /// Read the record stored under `key`, if any
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Replace the record stored under `key`
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory history storage implementation
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    records: RwLock<HashMap<String, String>>,
    saves: AtomicUsize,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds one record
    pub fn with_record(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::default();
        if let Ok(mut records) = store.records.write() {
            records.insert(key.into(), value.into());
        }
        store
    }

    /// Number of successful `save` calls
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Current record under `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.records
            .read()
            .ok()
            .and_then(|records| records.get(key).cloned())
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let records = self
            .records
            .read()
            .map_err(|_| RankingError::StorageError {
                message: "Failed to acquire history read lock".to_string(),
            })?;

        Ok(records.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RankingError::StorageError {
                message: "Failed to acquire history write lock".to_string(),
            })?;

        records.insert(key.to_string(), value.to_string());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// File-backed history storage, one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    dir: PathBuf,
}

impl FileHistoryStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| RankingError::StorageError {
            message: format!("Failed to create {}: {}", dir.display(), e),
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                debug!("Loaded {} bytes from {}", contents.len(), path.display());
                Ok(Some(contents))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RankingError::StorageError {
                message: format!("Failed to read {}: {}", path.display(), e),
            }
            .into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, value).map_err(|e| RankingError::StorageError {
            message: format!("Failed to write {}: {}", tmp.display(), e),
        })?;
        fs::rename(&tmp, &path).map_err(|e| RankingError::StorageError {
            message: format!("Failed to replace {}: {}", path.display(), e),
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "tracklist-ranker-store-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_in_memory_store_round_trip() {
        let store = InMemoryHistoryStore::new();
        assert!(store.load("matchUps").unwrap().is_none());

        store.save("matchUps", "[]").unwrap();
        assert_eq!(store.load("matchUps").unwrap().as_deref(), Some("[]"));
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_in_memory_store_with_record() {
        let store = InMemoryHistoryStore::with_record("matchUps", "[1]");
        assert_eq!(store.get("matchUps").as_deref(), Some("[1]"));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_file_store_missing_key_is_none() {
        let dir = scratch_dir("missing");
        let store = FileHistoryStore::new(&dir).unwrap();
        assert!(store.load("matchUps").unwrap().is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_file_store_overwrites_record() {
        let dir = scratch_dir("overwrite");
        let store = FileHistoryStore::new(&dir).unwrap();

        store.save("matchUps", "[]").unwrap();
        store.save("matchUps", r#"[{"players":["A","B"],"winner":"A"}]"#).unwrap();

        let loaded = store.load("matchUps").unwrap().unwrap();
        assert!(loaded.contains("\"winner\":\"A\""));
        assert!(store.path_for("matchUps").exists());
        assert!(!store.path_for("matchUps").with_extension("json.tmp").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_file_store_sanitizes_key() {
        let store = FileHistoryStore {
            dir: PathBuf::from("/data"),
        };
        assert_eq!(
            store.path_for("../user/1"),
            PathBuf::from("/data/___user_1.json")
        );
    }
}
