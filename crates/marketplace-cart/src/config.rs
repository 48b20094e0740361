//! # Cart Configuration
//!
//! Configuration for the cart store and the storage it persists to.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GOMARKETPLACE_STORAGE_PATH=/data/storage.db                        │
//! │     GOMARKETPLACE_STORAGE_KEY=@GoMarketplace:products                  │
//! │     GOMARKETPLACE_PERSIST_UNCHANGED=true                               │
//! │     GOMARKETPLACE_IN_MEMORY=true                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/gomarketplace/cart.toml (Linux)                          │
//! │     ~/Library/Application Support/dev.gomarketplace.storefront/…      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! [storage]
//! path = "/data/storage.db"   # omit for the platform data directory
//! in_memory = false
//! max_connections = 2
//! connect_timeout_secs = 10
//!
//! [cart]
//! storage_key = "@GoMarketplace:products"
//! persist_unchanged = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use marketplace_core::PRODUCTS_STORAGE_KEY;
use marketplace_storage::StorageConfig;

use crate::error::{StoreError, StoreResult};

/// File name of the SQLite storage inside the platform data directory.
const STORAGE_FILE_NAME: &str = "storage.db";

// =============================================================================
// Storage Settings
// =============================================================================

/// Where and how the cart is stored on the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file path. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Keep the storage in memory (nothing survives a restart).
    #[serde(default)]
    pub in_memory: bool,

    /// Maximum pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            path: None,
            in_memory: false,
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

// =============================================================================
// Cart Settings
// =============================================================================

/// Cart store behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSettings {
    /// Storage key holding the whole cart.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Also save when an operation left the cart unchanged
    /// (increment/decrement of an absent id, clearing an empty cart).
    #[serde(default)]
    pub persist_unchanged: bool,
}

fn default_storage_key() -> String {
    PRODUCTS_STORAGE_KEY.to_string()
}

impl Default for CartSettings {
    fn default() -> Self {
        CartSettings {
            storage_key: default_storage_key(),
            persist_unchanged: false,
        }
    }
}

// =============================================================================
// Main Cart Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartConfig {
    /// Storage settings.
    #[serde(default)]
    pub storage: StorageSettings,

    /// Cart behavior settings.
    #[serde(default)]
    pub cart: CartSettings,
}

impl CartConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config that keeps the storage in memory.
    pub fn in_memory() -> Self {
        let mut config = Self::default();
        config.storage.in_memory = true;
        config
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> StoreResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StoreError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| StoreError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StoreResult<()> {
        if self.cart.storage_key.trim().is_empty() {
            return Err(StoreError::InvalidConfig(
                "storage_key must not be empty".into(),
            ));
        }

        if self.storage.max_connections == 0 {
            return Err(StoreError::InvalidConfig(
                "max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("GOMARKETPLACE_STORAGE_PATH") {
            debug!(path = %path, "Overriding storage path from environment");
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Ok(key) = std::env::var("GOMARKETPLACE_STORAGE_KEY") {
            debug!(key = %key, "Overriding storage key from environment");
            self.cart.storage_key = key;
        }

        if let Ok(value) = std::env::var("GOMARKETPLACE_PERSIST_UNCHANGED") {
            match parse_bool(&value) {
                Some(flag) => self.cart.persist_unchanged = flag,
                None => warn!(value = %value, "Unrecognized GOMARKETPLACE_PERSIST_UNCHANGED"),
            }
        }

        if let Ok(value) = std::env::var("GOMARKETPLACE_IN_MEMORY") {
            match parse_bool(&value) {
                Some(flag) => self.storage.in_memory = flag,
                None => warn!(value = %value, "Unrecognized GOMARKETPLACE_IN_MEMORY"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "gomarketplace", "storefront")
            .map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    /// Returns the default storage file path.
    fn default_storage_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "gomarketplace", "storefront")
            .map(|dirs| dirs.data_dir().join(STORAGE_FILE_NAME))
    }

    /// Builds the storage configuration these settings describe.
    ///
    /// Creates the parent directory of a file-backed storage if needed.
    pub fn storage_config(&self) -> StoreResult<StorageConfig> {
        let base = if self.storage.in_memory {
            StorageConfig::in_memory()
        } else {
            let path = self
                .storage
                .path
                .clone()
                .or_else(Self::default_storage_path)
                .ok_or_else(|| {
                    StoreError::InvalidConfig("No storage path available".into())
                })?;

            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| StoreError::InvalidConfig(e.to_string()))?;
                }
            }

            StorageConfig::new(path).max_connections(self.storage.max_connections)
        };

        Ok(base.connect_timeout(Duration::from_secs(self.storage.connect_timeout_secs)))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the storage key.
    pub fn storage_key(&self) -> &str {
        &self.cart.storage_key
    }

    /// Returns true if unchanged operations are saved too.
    pub fn persist_unchanged(&self) -> bool {
        self.cart.persist_unchanged
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
