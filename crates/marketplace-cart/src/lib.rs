//! # marketplace-cart: The Storefront Cart Store
//!
//! The long-lived cart every screen of the storefront shares: it loads the
//! saved cart on startup, applies add/increment/decrement, tells
//! subscribers, and saves each change in the background.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     GoMarketplace Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Storefront UI (mobile app)                     │   │
//! │  │        StorefrontContext ──► cart() ──► CartStore handle        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ marketplace-cart (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌─────────────┐  ┌──────────┐  ┌──────────┐   │   │
//! │  │   │  store   │  │ persistence │  │  config  │  │ context  │   │   │
//! │  │   │CartStore │─►│PersistWorker│  │CartConfig│  │Storefront│   │   │
//! │  │   └──────────┘  └──────┬──────┘  └──────────┘  └──────────┘   │   │
//! │  └────────────────────────┼────────────────────────────────────────┘   │
//! │                           ▼                                             │
//! │  ┌─────────────────────────────────┐  ┌─────────────────────────────┐  │
//! │  │ marketplace-storage (SQLite)    │  │ marketplace-core (rules)    │  │
//! │  └─────────────────────────────────┘  └─────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use marketplace_cart::{format_value, CartConfig, CartStore, NewCartItem, StorefrontContext};
//!
//! let store = CartStore::open_with_config(CartConfig::load_or_default(None)).await?;
//! let context = StorefrontContext::new().with_cart(store);
//!
//! let cart = context.cart()?;
//! cart.add_to_cart(NewCartItem::new("1", "Caneca Preta", "https://img/1.png", 24.9));
//! println!("{}", format_value(cart.totals().subtotal.to_decimal()));
//!
//! cart.shutdown().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod context;
pub mod error;
pub mod persistence;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{CartConfig, CartSettings, StorageSettings};
pub use context::StorefrontContext;
pub use error::{StoreError, StoreResult};
pub use persistence::{PersistHandle, PersistWorker};
pub use store::CartStore;

pub use marketplace_core::{
    format_value, Cart, CartChange, CartItem, CartTotals, Money, NewCartItem,
    PRODUCTS_STORAGE_KEY,
};
