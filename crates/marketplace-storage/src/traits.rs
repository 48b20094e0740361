//! # Storage Traits
//!
//! The storage abstraction the cart store persists through, so the same
//! store runs against SQLite on the device and against memory in tests.

use async_trait::async_trait;

use crate::error::StorageResult;

/// Async string key-value storage.
///
/// Semantics follow the device storage API the storefront has always used:
/// a missing key reads as `None`, `set_item` replaces the whole value, and
/// removing a missing key is not an error.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Reads the value stored under `key`.
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Deletes `key`.
    async fn remove_item(&self, key: &str) -> StorageResult<()>;
}
