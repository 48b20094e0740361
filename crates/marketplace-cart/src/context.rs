//! # Storefront Context
//!
//! Where screens get the cart from.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Storefront Context                                   │
//! │                                                                         │
//! │  App startup                                                           │
//! │    let store = CartStore::open_with_config(config).await?;             │
//! │    let context = StorefrontContext::new().with_cart(store);            │
//! │                              │                                          │
//! │          ┌──────────────────┼──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │   Dashboard screen     Cart screen       Floating cart                 │
//! │   context.cart()?      context.cart()?   context.cart()?               │
//! │                                                                         │
//! │  A context with no cart provided answers cart() with                   │
//! │  StoreError::NotProvisioned instead of a default store.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{StoreError, StoreResult};
use crate::store::CartStore;

/// Components shared with every screen of the storefront.
#[derive(Debug, Clone, Default)]
pub struct StorefrontContext {
    cart: Option<CartStore>,
}

impl StorefrontContext {
    /// Creates a context that provides nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provides `store` to everything that receives this context.
    pub fn with_cart(mut self, store: CartStore) -> Self {
        self.cart = Some(store);
        self
    }

    /// Provides `store`, replacing any previously provided one.
    pub fn provide_cart(&mut self, store: CartStore) {
        self.cart = Some(store);
    }

    /// The provided cart store.
    pub fn cart(&self) -> StoreResult<&CartStore> {
        self.cart.as_ref().ok_or(StoreError::NotProvisioned {
            component: "CartStore",
        })
    }

    /// Returns true if a cart store has been provided.
    pub fn has_cart(&self) -> bool {
        self.cart.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CartSettings;
    use marketplace_core::NewCartItem;
    use marketplace_storage::MemoryStorage;
    use std::sync::Arc;

    #[test]
    fn test_cart_outside_provider_fails() {
        let context = StorefrontContext::new();

        let err = context.cart().unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotProvisioned {
                component: "CartStore"
            }
        ));
        assert!(!context.has_cart());
    }

    #[tokio::test]
    async fn test_provided_cart_is_shared() {
        let store = CartStore::open(Arc::new(MemoryStorage::new()), CartSettings::default()).await;
        let context = StorefrontContext::new().with_cart(store.clone());
        let screen = context.clone();

        screen
            .cart()
            .unwrap()
            .add_to_cart(NewCartItem::new("1", "Caneca", "https://cdn/1.png", 24.9));

        assert_eq!(store.products().len(), 1);
        assert_eq!(context.cart().unwrap().totals().total_quantity, 1);
    }
}
