//! JSON-file backed key-value store.
//!
//! All entries live in one JSON object on disk. The file is read on first
//! access and rewritten on every mutation via a temp file + rename, so a crash
//! mid-write leaves the previous contents intact.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::{KeyValueStore, StoreError};

type Entries = BTreeMap<String, String>;

/// A [`KeyValueStore`] persisted to a single JSON file.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<Option<Entries>>,
}

impl FileStore {
    /// Create a store backed by `path`. The file is not touched until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(None),
        }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Entries>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Backend("file store lock poisoned".into()))
    }

    fn load(&self) -> Result<Entries, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(Entries::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                StoreError::Serialization(format!("{}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn flush(&self, entries: &Entries) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::trace!(path = %self.path.display(), entries = entries.len(), "store flushed");
        Ok(())
    }

    /// Entries behind the guard, loading them from disk on first use.
    fn loaded<'a>(
        &self,
        guard: &'a mut MutexGuard<'_, Option<Entries>>,
    ) -> Result<&'a mut Entries, StoreError> {
        if guard.is_none() {
            **guard = Some(self.load()?);
        }
        Ok(guard.get_or_insert_with(Entries::new))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut guard = self.lock()?;
        let entries = self.loaded(&mut guard)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let entries = self.loaded(&mut guard)?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let entries = self.loaded(&mut guard)?;
        if entries.remove(key).is_some() {
            self.flush(entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("wallet.json"));
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");

        let store = FileStore::new(&path);
        store.set("last_backend", "walletconnect").unwrap();
        drop(store);

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get("last_backend").unwrap().as_deref(),
            Some("walletconnect")
        );
    }

    #[test]
    fn remove_deletes_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        let store = FileStore::new(&path);
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(!store.contains("k").unwrap());

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("k").unwrap(), None);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("wallet.json");
        let store = FileStore::new(&path);
        store.set("k", "v").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileStore::new(&path);
        assert!(matches!(
            store.get("k"),
            Err(StoreError::Serialization(_))
        ));
    }
}
