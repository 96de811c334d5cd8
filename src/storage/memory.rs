//! In-memory key/value store.
//!
//! Backs the session store (contents vanish with the process) and stands in
//! for any host store in tests.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::Result;
use crate::storage::KeyValueStore;

/// In-memory key/value store.
///
/// Thread-safe implementation using `RwLock<HashMap>`.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }

    /// Get the number of keys in the store.
    pub fn len(&self) -> usize {
        self.items.read().unwrap().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().unwrap().is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.read().unwrap();
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.write().unwrap();
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.write().unwrap();
        items.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.items.write().unwrap().clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let items = self.items.read().unwrap();
        Ok(items.keys().cloned().collect())
    }
}
