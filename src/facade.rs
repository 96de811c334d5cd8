//! The three stores under one roof.

use crate::config::Config;
use crate::cookies::{CookieJar, Cookies, MemoryCookieJar};
use crate::error::{Result, StoreError};
use crate::expiring::{ExpiringStore, StoreKind};
use crate::storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};

/// Local storage, session storage and cookies as named members.
#[derive(Debug)]
pub struct FrontendStore<L, S, J> {
    pub local_storage: ExpiringStore<L>,
    pub session_storage: ExpiringStore<S>,
    pub cookies: Cookies<J>,
}

impl<L: KeyValueStore, S: KeyValueStore, J: CookieJar> FrontendStore<L, S, J> {
    /// Wire the adapters to caller-supplied hosts.
    pub fn new(local: L, session: S, jar: J) -> Self {
        Self::from_parts(
            ExpiringStore::new(StoreKind::Local, local),
            ExpiringStore::new(StoreKind::Session, session),
            Cookies::new(jar),
        )
    }

    pub fn from_parts(
        local_storage: ExpiringStore<L>,
        session_storage: ExpiringStore<S>,
        cookies: Cookies<J>,
    ) -> Self {
        Self {
            local_storage,
            session_storage,
            cookies,
        }
    }
}

/// Facade over the stock hosts.
pub type DefaultFrontendStore =
    FrontendStore<FileKeyValueStore, MemoryKeyValueStore, MemoryCookieJar>;

impl FrontendStore<FileKeyValueStore, MemoryKeyValueStore, MemoryCookieJar> {
    /// Build the stock hosts from configuration.
    ///
    /// Local storage is a file that outlives the process; session storage
    /// and cookies live in memory for the life of this value.
    pub fn open(config: &Config) -> Result<Self> {
        let path = config.local_storage_path().ok_or_else(|| {
            StoreError::config("Could not determine local storage path (no home directory)")
        })?;
        tracing::debug!("opening local storage at {}", path.display());

        Ok(Self::from_parts(
            ExpiringStore::new(StoreKind::Local, FileKeyValueStore::with_path(path)?),
            ExpiringStore::new(StoreKind::Session, MemoryKeyValueStore::new()),
            Cookies::with_defaults(MemoryCookieJar::new(), config.cookie_defaults()),
        ))
    }
}

impl FrontendStore<MemoryKeyValueStore, MemoryKeyValueStore, MemoryCookieJar> {
    /// All three hosts in memory.
    pub fn in_memory() -> Self {
        Self::new(
            MemoryKeyValueStore::new(),
            MemoryKeyValueStore::new(),
            MemoryCookieJar::new(),
        )
    }
}
