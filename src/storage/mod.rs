//! Host key/value stores for frontstore.
//!
//! This module provides the store contract the expiring adapter wraps,
//! with file-based and in-memory implementations.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
pub use traits::KeyValueStore;
