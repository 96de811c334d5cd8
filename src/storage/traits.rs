//! Host key/value store contract.
//!
//! This module defines the `KeyValueStore` trait that the expiring adapter
//! wraps. It mirrors the Web Storage surface: string keys, string values.

use std::sync::Arc;

use crate::error::Result;

/// Trait for host key/value stores.
///
/// Implementations hold raw strings only. Envelopes and expiry are the
/// adapter's business, never the store's.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw string stored at `key`.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` at `key`, replacing whatever was there.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`.
    ///
    /// Returns `Ok(())` even if the key doesn't exist.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Delete every key in the store.
    fn clear(&self) -> Result<()>;

    /// List every key currently in the store.
    fn keys(&self) -> Result<Vec<String>>;

    /// Check if a key exists.
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get_item(key)?.is_some())
    }
}

/// Blanket implementation of KeyValueStore for Arc-wrapped stores.
///
/// Lets a test keep a handle on the host store it hands to an adapter.
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}
