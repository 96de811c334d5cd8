//! Expiring store adapter.
//!
//! Wraps one host [`KeyValueStore`] and stores every value inside an
//! [`Envelope`] carrying its expiry. Expired entries are evicted lazily, on
//! the read that notices them, or in bulk with [`ExpiringStore::purge_expired`].
//!
//! Strings written by anything other than this adapter (no `__expire__`
//! marker) are returned verbatim as [`StoredValue::Text`].

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::envelope::{Envelope, Expiry, StoredValue};
use crate::error::{FailOpen, Result};
use crate::storage::KeyValueStore;

/// Which host store an adapter is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// Persists across sessions.
    Local,
    /// Cleared when the session ends.
    Session,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Session => "session",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A host store with TTL envelopes around its values.
#[derive(Debug)]
pub struct ExpiringStore<S> {
    kind: StoreKind,
    store: S,
}

impl<S: KeyValueStore> ExpiringStore<S> {
    pub fn new(kind: StoreKind, store: S) -> Self {
        Self { kind, store }
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    /// The wrapped host store.
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Read the value at `key`, evicting it if it has expired.
    pub fn get_item(&self, key: &str) -> Result<Option<StoredValue>> {
        self.get_item_at(key, Utc::now())
    }

    /// Read the value at `key` as of `now`.
    ///
    /// An empty raw string reads as absent. A string carrying the expiry
    /// marker that fails to decode also reads as absent and is left in place.
    pub fn get_item_at(&self, key: &str, now: DateTime<Utc>) -> Result<Option<StoredValue>> {
        let raw = match self.store.get_item(key)? {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(None),
        };

        if !Envelope::is_envelope(&raw) {
            return Ok(Some(StoredValue::Text(raw)));
        }

        let context = format!("decoding {} storage entry '{}'", self.kind, key);
        let Some(envelope) = Envelope::decode(&raw).map(Some).fail_open_default(&context) else {
            return Ok(None);
        };

        if envelope.expire.is_elapsed_at(now) {
            tracing::debug!(store = %self.kind, key, "evicting expired entry");
            self.store.remove_item(key)?;
            return Ok(None);
        }

        Ok(Some(envelope.value))
    }

    /// Store `value` at `key`, expiring `ttl` from now, or never.
    pub fn set_item(
        &self,
        key: &str,
        value: impl Into<StoredValue>,
        ttl: Option<Duration>,
    ) -> Result<()> {
        self.set_item_at(key, value, ttl, Utc::now())
    }

    /// Store `value` at `key` with the ttl measured from `now`.
    pub fn set_item_at(
        &self,
        key: &str,
        value: impl Into<StoredValue>,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.write(key, Envelope::new(value.into(), Expiry::from_ttl(ttl, now)))
    }

    /// Store `value` at `key` until an absolute deadline.
    pub fn set_item_until(
        &self,
        key: &str,
        value: impl Into<StoredValue>,
        deadline: DateTime<Utc>,
    ) -> Result<()> {
        self.write(
            key,
            Envelope::new(value.into(), Expiry::At(deadline.timestamp_millis())),
        )
    }

    fn write(&self, key: &str, envelope: Envelope) -> Result<()> {
        let encoded = envelope.encode()?;
        tracing::debug!(store = %self.kind, key, expire = ?envelope.expire, "writing entry");
        self.store.set_item(key, &encoded)
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        self.store.remove_item(key)
    }

    /// Remove every key in the host store, including ones this adapter never wrote.
    pub fn clear(&self) -> Result<()> {
        tracing::debug!(store = %self.kind, "clearing store");
        self.store.clear()
    }

    /// Remove every entry whose envelope has expired as of `now`.
    ///
    /// Plain strings and undecodable envelopes are kept. Returns the number
    /// of entries removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut removed = 0;

        for key in self.store.keys()? {
            let Some(raw) = self.store.get_item(&key)? else {
                continue;
            };
            if !Envelope::is_envelope(&raw) {
                continue;
            }
            let Ok(envelope) = Envelope::decode(&raw) else {
                continue;
            };
            if envelope.expire.is_elapsed_at(now) {
                self.store.remove_item(&key)?;
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::debug!(store = %self.kind, removed, "purged expired entries");
        }

        Ok(removed)
    }
}
