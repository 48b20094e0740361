//! # marketplace-storage: Device Storage for GoMarketplace
//!
//! A small async key-value API over local device storage. The cart store
//! writes its whole collection as one string value under one key; this
//! crate does not know anything about carts.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     GoMarketplace Data Flow                             │
//! │                                                                         │
//! │  CartStore persistence worker                                          │
//! │       │  set_item("@GoMarketplace:products", "[...]")                  │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                marketplace-storage (THIS CRATE)                 │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────────────┐  ┌───────────────┐  ┌────────────────┐  │   │
//! │  │   │ KeyValueStorage │  │ SqliteStorage │  │ MemoryStorage  │  │   │
//! │  │   │   (traits.rs)   │◄─│   (pool.rs)   │  │  (memory.rs)   │  │   │
//! │  │   │                 │◄─┼───────────────┼──│                │  │   │
//! │  │   └─────────────────┘  └───────┬───────┘  └────────────────┘  │   │
//! │  └────────────────────────────────┼────────────────────────────────┘   │
//! │                                   ▼                                     │
//! │                    key_value_store table (SQLite)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`traits`] - The `KeyValueStorage` trait
//! - [`pool`] - SQLite-backed storage and its configuration
//! - [`memory`] - In-memory storage
//! - [`migrations`] - Embedded schema migrations
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use marketplace_storage::{KeyValueStorage, SqliteStorage, StorageConfig};
//!
//! let storage = SqliteStorage::new(StorageConfig::new("./storage.db")).await?;
//! storage.set_item("greeting", "olá").await?;
//! assert_eq!(storage.get_item("greeting").await?.as_deref(), Some("olá"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod traits;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStorage;
pub use pool::{SqliteStorage, StorageConfig};
pub use traits::KeyValueStorage;
