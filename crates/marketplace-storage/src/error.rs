//! # Storage Error Types
//!
//! Error types for device storage operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StorageError (this module) ← Adds context and categorization          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (marketplace-cart) ← Logged by the persistence worker      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Device storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Opening the storage file failed.
    ///
    /// ## When This Occurs
    /// - Storage file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Reading or writing a key failed.
    #[error("Query failed for key '{key}': {message}")]
    QueryFailed { key: String, message: String },

    /// All connections are busy; the acquire timeout elapsed.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Storage has been closed.
    #[error("Storage is closed")]
    Closed,

    /// Internal storage error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Creates a QueryFailed error for a given key.
    pub fn query_failed(key: impl Into<String>, message: impl Into<String>) -> Self {
        StorageError::QueryFailed {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Attaches the key being accessed to a sqlx error.
    pub(crate) fn for_key(key: &str, err: sqlx::Error) -> Self {
        match StorageError::from(err) {
            StorageError::Internal(message) => StorageError::query_failed(key, message),
            other => other,
        }
    }
}

/// Convert sqlx errors to StorageError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::PoolTimedOut   → StorageError::PoolExhausted
/// sqlx::Error::PoolClosed     → StorageError::Closed
/// sqlx::Error::Database       → StorageError::Internal (message kept)
/// Other                       → StorageError::Internal
/// ```
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => StorageError::PoolExhausted,
            sqlx::Error::PoolClosed => StorageError::Closed,
            sqlx::Error::Database(db_err) => StorageError::Internal(db_err.message().to_string()),
            _ => StorageError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StorageError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StorageError::MigrationFailed(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
