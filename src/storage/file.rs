//! File-backed key/value store.
//!
//! All items live in one JSON object file, `<frontstore_home>/local-storage.json`
//! by default. Atomic writes are achieved via temp file + rename pattern.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::local_storage_path;
use crate::error::{Result, StoreError};
use crate::storage::KeyValueStore;

/// File-backed key/value store.
///
/// Every operation reads the file fresh so changes made by another process
/// are picked up. Mutations are serialized within the process by a lock and
/// land on disk atomically.
#[derive(Debug)]
pub struct FileKeyValueStore {
    /// The JSON file holding the items.
    path: PathBuf,
    /// Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Create a store at the default location.
    ///
    /// Uses `~/.frontstore/local-storage.json` or
    /// `$FRONTSTORE_HOME/local-storage.json`.
    pub fn new() -> Result<Self> {
        let path = local_storage_path().ok_or_else(|| {
            StoreError::config("Could not determine local storage path (no home directory)")
        })?;
        Self::with_path(path)
    }

    /// Create a store backed by a specific file.
    ///
    /// The parent directory is created if missing. The file itself is only
    /// written on the first mutation.
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| StoreError::storage(parent, e))?;
            }
        }

        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the path for a temp file used during atomic writes.
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "local-storage.json".to_string());
        self.path.with_file_name(format!(".{}.tmp", name))
    }

    /// Load all items. A missing file is an empty store.
    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| StoreError::storage(&self.path, e))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    /// Write all items atomically using temp file + rename.
    fn atomic_write(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let temp_path = self.temp_path();
        let json = serde_json::to_string_pretty(items)?;

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| StoreError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| StoreError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| StoreError::storage(&temp_path, e))?;
        }

        fs::rename(&temp_path, &self.path).map_err(|e| StoreError::storage(&self.path, e))?;

        Ok(())
    }

    /// Apply a mutation under the lock and persist the result.
    fn update<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StoreError::host("file store lock poisoned"))?;
        let mut items = self.load()?;
        if mutate(&mut items) {
            self.atomic_write(&items)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.update(|items| {
            items.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.update(|items| items.remove(key).is_some())
    }

    fn clear(&self) -> Result<()> {
        self.update(|items| {
            let changed = !items.is_empty();
            items.clear();
            changed
        })
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.load()?.into_keys().collect())
    }
}
