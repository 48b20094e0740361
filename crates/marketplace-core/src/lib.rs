//! # marketplace-core: Pure Cart Logic for GoMarketplace
//!
//! This crate holds the rules of the storefront cart as pure functions with
//! zero I/O dependencies. Storage lives in `marketplace-storage`, the
//! long-lived store with observers and persistence lives in `marketplace-cart`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     GoMarketplace Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Storefront UI (mobile app)                     │   │
//! │  │    Dashboard ──► Add to cart ──► Cart screen ──► Totals         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartStore handle                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 marketplace-cart (CartStore)                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ marketplace-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   cart    │  │   money   │  │ currency  │  │   │
//! │  │   │ CartItem  │  │   Cart    │  │   Money   │  │ format_   │  │   │
//! │  │   │NewCartItem│  │CartChange │  │  (cents)  │  │  value    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO TASKS • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Cart line items (`CartItem`, `NewCartItem`, `CartTotals`)
//! - [`cart`] - The cart collection and its add/increment/decrement rules
//! - [`money`] - Money type with integer arithmetic
//! - [`currency`] - Localized currency formatting (`format_value`)
//!
//! ## Example Usage
//!
//! ```rust
//! use marketplace_core::{format_value, Cart, NewCartItem};
//!
//! let mut cart = Cart::new();
//! let item = NewCartItem::new("1", "Camiseta", "https://img/1.png", 19.9);
//!
//! cart.add(item.clone());
//! cart.add(item);
//!
//! assert_eq!(cart.get("1").map(|i| i.quantity), Some(2));
//! assert_eq!(format_value(cart.totals().subtotal.to_decimal()), "R$\u{a0}39,80");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod currency;
pub mod money;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartChange};
pub use currency::{format_value, CurrencyFormat};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key under which the whole cart collection is persisted.
///
/// Kept identical to the key the storefront app has always written, so a
/// cart saved by an older build is picked up after an upgrade.
pub const PRODUCTS_STORAGE_KEY: &str = "@GoMarketplace:products";
