//! # SQLite Storage
//!
//! `KeyValueStorage` on top of a SQLite connection pool.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SQLite Key-Value Storage                           │
//! │                                                                         │
//! │  App Startup                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StorageConfig::new(path) ← Configure pool settings                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteStorage::new(config).await ← Create pool + run migrations       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────────┐                  │
//! │  │  key_value_store                                  │                  │
//! │  │  key (PK) │ value (JSON text) │ updated_at        │                  │
//! │  │  ─────────┼───────────────────┼─────────────      │                  │
//! │  │  @GoMarketplace:products │ [{"id":"1",...}] │ …   │                  │
//! │  └──────────────────────────────────────────────────┘                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! File-backed storage runs in WAL mode so a UI read never waits behind the
//! persistence worker's write.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::migrations;
use crate::traits::KeyValueStorage;

// =============================================================================
// Configuration
// =============================================================================

/// Storage configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = StorageConfig::new("/path/to/storage.db")
///     .max_connections(2)
///     .connect_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Path to the SQLite file. `None` keeps everything in memory.
    pub database_path: Option<PathBuf>,

    /// Maximum number of connections in the pool.
    /// Default: 2 (one UI reader, one persistence writer)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long to wait for a free connection.
    /// Default: 10 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl StorageConfig {
    /// Creates a file-backed configuration. The file is created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StorageConfig {
            database_path: Some(path.into()),
            max_connections: 2,
            min_connections: 1,
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Creates an in-memory configuration (for testing).
    ///
    /// An in-memory SQLite database lives only as long as its connection,
    /// so the pool is pinned to exactly one connection that never idles out.
    pub fn in_memory() -> Self {
        StorageConfig {
            database_path: None,
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::MAX,
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection acquire timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Returns true if this configuration has no backing file.
    pub fn is_in_memory(&self) -> bool {
        self.database_path.is_none()
    }
}

// =============================================================================
// SqliteStorage
// =============================================================================

/// SQLite-backed key-value storage.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Opens the storage, creating the file and schema if needed.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite: WAL journal, NORMAL synchronous
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        let connect_options = match &config.database_path {
            Some(path) => {
                info!(path = %path.display(), "Opening storage file");
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    // Readers don't block the persistence writer
                    .journal_mode(SqliteJournalMode::Wal)
                    // Safe from corruption, may lose the last write on power loss
                    .synchronous(SqliteSynchronous::Normal)
            }
            None => {
                info!("Opening in-memory storage");
                SqliteConnectOptions::from_str("sqlite::memory:")
                    .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?
            }
        };

        debug!("Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout);

        pool_options = if config.is_in_memory() {
            pool_options.idle_timeout(None).max_lifetime(None)
        } else {
            pool_options.idle_timeout(Some(config.idle_timeout))
        };

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Storage pool created"
        );

        let storage = SqliteStorage { pool };

        if config.run_migrations {
            storage.run_migrations().await?;
        }

        Ok(storage)
    }

    /// Runs pending schema migrations. Idempotent.
    pub async fn run_migrations(&self) -> StorageResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the pool. Later operations fail with [`StorageError::Closed`].
    pub async fn close(&self) {
        info!("Closing storage pool");
        self.pool.close().await;
    }

    /// Checks if the storage can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[async_trait]
impl KeyValueStorage for SqliteStorage {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM key_value_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StorageError::for_key(key, e))?;

        debug!(key = %key, found = value.is_some(), "Read storage item");
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO key_value_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::for_key(key, e))?;

        debug!(key = %key, bytes = value.len(), "Wrote storage item");
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        sqlx::query("DELETE FROM key_value_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::for_key(key, e))?;

        debug!(key = %key, "Removed storage item");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
