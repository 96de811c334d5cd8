//! frontstore - local, session and cookie storage behind one interface
//!
//! Two key/value stores gain optional time-to-live through a JSON envelope,
//! and a cookie adapter reads and writes a single cookie string. Host stores
//! are traits, so the same adapters run over files, memory or a browser.

pub mod config;
pub mod cookies;
pub mod envelope;
pub mod error;
pub mod expiring;
pub mod facade;
pub mod storage;

pub use config::Config;
pub use cookies::{
    CookieDefaults, CookieExpiry, CookieJar, CookieOptions, Cookies, MemoryCookieJar,
};
pub use envelope::{Envelope, Expiry, StoredValue};
pub use error::{FailOpen, Result, StoreError};
pub use expiring::{ExpiringStore, StoreKind};
pub use facade::{DefaultFrontendStore, FrontendStore};
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
