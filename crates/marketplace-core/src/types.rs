//! # Domain Types
//!
//! Line items of the storefront cart.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   add_to_cart   ┌─────────────────┐               │
//! │  │  NewCartItem    │ ──────────────► │    CartItem     │               │
//! │  │  ─────────────  │  quantity = 1   │  ─────────────  │               │
//! │  │  id             │                 │  id             │               │
//! │  │  title          │                 │  title          │               │
//! │  │  image_url      │                 │  image_url      │               │
//! │  │  price          │                 │  price          │               │
//! │  └─────────────────┘                 │  quantity (≥1)  │               │
//! │                                      └────────┬────────┘               │
//! │                                               │ sum                     │
//! │                                      ┌────────▼────────┐               │
//! │                                      │   CartTotals    │               │
//! │                                      └─────────────────┘               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Shape
//! Field names are serialized exactly as written (`image_url` stays snake
//! case) because the persisted blob is shared with carts saved by earlier
//! builds of the storefront.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// New Cart Item
// =============================================================================

/// A product as offered to `add_to_cart`: everything except the quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCartItem {
    /// Product ID, assigned by the catalog.
    pub id: String,

    /// Display title.
    pub title: String,

    /// Product image shown in the cart list.
    pub image_url: String,

    /// Unit price in major currency units (e.g. 19.9 = R$ 19,90).
    pub price: f64,
}

impl NewCartItem {
    /// Creates a new cart item input.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        NewCartItem {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    /// Turns the input into a line item with the given quantity.
    pub fn with_quantity(self, quantity: u32) -> CartItem {
        CartItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity,
        }
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// One product and its quantity in the user's cart.
///
/// ## Invariants (maintained by [`crate::Cart`])
/// - At most one `CartItem` per `id`
/// - `quantity >= 1`; an item that would reach 0 is removed instead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: f64,
    pub quantity: u32,
}

impl CartItem {
    /// Unit price rounded to cents.
    pub fn unit_price(&self) -> Money {
        Money::from_decimal(self.price)
    }

    /// Line total (unit price × quantity), in cents.
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(i64::from(self.quantity))
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Summary of the cart for the floating cart badge and checkout screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    /// Number of distinct products.
    pub item_count: usize,

    /// Sum of all quantities.
    pub total_quantity: u64,

    /// Sum of all line totals.
    pub subtotal: Money,
}
