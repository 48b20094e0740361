//! # Cart Collection
//!
//! The rules for mutating the list of cart line items.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Operations                                    │
//! │                                                                         │
//! │  Operation        Item present?      Result                             │
//! │  ─────────        ─────────────      ──────                             │
//! │  add(item)        no                 push { ..item, quantity: 1 }       │
//! │                   yes                increment(item.id)                 │
//! │                                                                         │
//! │  increment(id)    no                 Unchanged                          │
//! │                   yes                quantity += 1                      │
//! │                                                                         │
//! │  decrement(id)    no                 Unchanged                          │
//! │                   yes, qty <= 1      item removed                       │
//! │                   yes, qty > 1       quantity -= 1                      │
//! │                                                                         │
//! │  clear()          -                  all items removed                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation reports a [`CartChange`] so the caller can decide whether
//! observers and storage need to hear about it.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{CartItem, CartTotals, NewCartItem};

/// What a cart operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new line item was appended with quantity 1.
    Added,

    /// An existing line item's quantity went up.
    Incremented { quantity: u32 },

    /// An existing line item's quantity went down.
    Decremented { quantity: u32 },

    /// A line item was removed (decremented from 1).
    Removed,

    /// All line items were removed.
    Cleared,

    /// The id was not in the cart (or the cart was already empty).
    Unchanged,
}

impl CartChange {
    /// Returns true if the collection differs from before the operation.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, CartChange::Unchanged)
    }
}

/// The shopping cart: an ordered list of line items.
///
/// Serializes as a bare JSON array, which is the persisted blob format.
/// Items keep insertion order; a re-added item goes to the end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from previously persisted items, as-is.
    pub fn from_items(items: Vec<CartItem>) -> Self {
        Cart { items }
    }

    /// Adds a product, or bumps its quantity if the id is already present.
    pub fn add(&mut self, item: NewCartItem) -> CartChange {
        if self.position(&item.id).is_some() {
            return self.increment(&item.id);
        }

        self.items.push(item.with_quantity(1));
        CartChange::Added
    }

    /// Increases the quantity of `id` by one.
    pub fn increment(&mut self, id: &str) -> CartChange {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                CartChange::Incremented {
                    quantity: item.quantity,
                }
            }
            None => CartChange::Unchanged,
        }
    }

    /// Decreases the quantity of `id` by one, removing it at zero.
    pub fn decrement(&mut self, id: &str) -> CartChange {
        let Some(index) = self.position(id) else {
            return CartChange::Unchanged;
        };

        if self.items[index].quantity <= 1 {
            self.items.remove(index);
            return CartChange::Removed;
        }

        let item = &mut self.items[index];
        item.quantity -= 1;
        CartChange::Decremented {
            quantity: item.quantity,
        }
    }

    /// Removes every item.
    pub fn clear(&mut self) -> CartChange {
        if self.items.is_empty() {
            return CartChange::Unchanged;
        }
        self.items.clear();
        CartChange::Cleared
    }

    /// Returns the line item for `id`, if present.
    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Returns all line items in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Consumes the cart, returning its items.
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of all line totals.
    pub fn subtotal(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(), |acc, item| acc + item.line_total())
    }

    /// Summary for display.
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            item_count: self.len(),
            total_quantity: self.total_quantity(),
            subtotal: self.subtotal(),
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
