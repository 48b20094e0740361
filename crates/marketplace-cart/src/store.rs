//! # Cart Store
//!
//! The storefront's single source of truth for the shopping cart.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CartStore Lifecycle                              │
//! │                                                                         │
//! │  open(storage, settings)                                               │
//! │       │                                                                 │
//! │       ├── get_item(key) ──► JSON array ──► Cart                        │
//! │       │       missing / corrupt / failed read ──► empty Cart (logged)  │
//! │       │                                                                 │
//! │       └── spawn PersistWorker                                          │
//! │                                                                         │
//! │  add_to_cart / increment / decrement / clear                           │
//! │       │                                                                 │
//! │       ├── mutate Cart under lock                                       │
//! │       ├── publish snapshot ──► watch subscribers                       │
//! │       └── enqueue snapshot ──► PersistWorker ──► set_item(key, blob)   │
//! │                                                                         │
//! │  flush()     wait for queued writes, report failures                   │
//! │  shutdown()  flush and stop the worker                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutations are synchronous and never fail: the in-memory cart is updated
//! and observers see it before the method returns. Saving happens in the
//! background, and snapshots are enqueued while the lock is held so the
//! stored blob follows the same order as the mutations.
//!
//! Operations that leave the cart unchanged (an unknown id, clearing an
//! empty cart) notify nobody and save nothing unless
//! `CartSettings::persist_unchanged` is set.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use marketplace_core::{Cart, CartChange, CartItem, CartTotals, NewCartItem};
use marketplace_storage::{KeyValueStorage, SqliteStorage};

use crate::config::{CartConfig, CartSettings};
use crate::error::StoreResult;
use crate::persistence::{PersistHandle, PersistWorker};

/// Shared, cloneable handle to the cart.
///
/// Every clone sees the same cart, subscribers, and persistence worker.
#[derive(Debug, Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    /// Current cart.
    cart: Mutex<Cart>,

    /// Latest published snapshot.
    observers: watch::Sender<Arc<Cart>>,

    /// Background writer.
    persist: PersistHandle,

    /// Store behavior.
    settings: CartSettings,
}

impl CartStore {
    /// Opens the store, loading whatever cart was saved under the
    /// configured key.
    ///
    /// Never fails: a missing, unreadable, or corrupt blob starts an empty
    /// cart. Must be called inside a tokio runtime.
    pub async fn open(storage: Arc<dyn KeyValueStorage>, settings: CartSettings) -> Self {
        let cart = load_cart(storage.as_ref(), &settings.storage_key).await;
        let persist = PersistWorker::spawn(storage, settings.storage_key.clone());
        let (observers, _) = watch::channel(Arc::new(cart.clone()));

        CartStore {
            inner: Arc::new(Inner {
                cart: Mutex::new(cart),
                observers,
                persist,
                settings,
            }),
        }
    }

    /// Opens SQLite storage as described by `config` and the store on it.
    pub async fn open_with_config(config: CartConfig) -> StoreResult<Self> {
        config.validate()?;

        let storage = SqliteStorage::new(config.storage_config()?).await?;
        Ok(Self::open(Arc::new(storage), config.cart).await)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a product with quantity 1, or increments it if already present.
    pub fn add_to_cart(&self, item: NewCartItem) -> CartChange {
        let id = item.id.clone();
        self.apply("add_to_cart", &id, |cart| cart.add(item))
    }

    /// Increases the quantity of `id` by one. Unknown ids are ignored.
    pub fn increment(&self, id: &str) -> CartChange {
        self.apply("increment", id, |cart| cart.increment(id))
    }

    /// Decreases the quantity of `id` by one, removing the item when it
    /// would drop to zero. Unknown ids are ignored.
    pub fn decrement(&self, id: &str) -> CartChange {
        self.apply("decrement", id, |cart| cart.decrement(id))
    }

    /// Empties the cart.
    pub fn clear(&self) -> CartChange {
        self.apply("clear", "", Cart::clear)
    }

    fn apply<F>(&self, operation: &'static str, id: &str, mutate: F) -> CartChange
    where
        F: FnOnce(&mut Cart) -> CartChange,
    {
        let mut cart = self.lock();
        let change = mutate(&mut cart);

        if change.is_mutation() {
            let snapshot = Arc::new(cart.clone());
            self.inner.observers.send_replace(Arc::clone(&snapshot));
            self.inner.persist.save(snapshot);
            debug!(operation, id, ?change, items = cart.len(), "Cart updated");
        } else {
            if self.inner.settings.persist_unchanged {
                self.inner.persist.save(Arc::new(cart.clone()));
            }
            debug!(operation, id, "Cart unchanged");
        }

        change
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current line items in insertion order.
    pub fn products(&self) -> Vec<CartItem> {
        self.lock().items().to_vec()
    }

    /// Current cart as an immutable snapshot.
    pub fn snapshot(&self) -> Arc<Cart> {
        Arc::clone(&self.inner.observers.borrow())
    }

    /// Item count, total quantity, and subtotal.
    pub fn totals(&self) -> CartTotals {
        self.lock().totals()
    }

    /// Subscribes to cart changes. The receiver starts at the current cart.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Cart>> {
        self.inner.observers.subscribe()
    }

    /// Storage key this store persists under.
    pub fn storage_key(&self) -> &str {
        &self.inner.settings.storage_key
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Waits until every change made so far has been written.
    ///
    /// Returns the first write failure since the previous flush.
    pub async fn flush(&self) -> StoreResult<()> {
        self.inner.persist.flush().await
    }

    /// Writes pending changes and stops the persistence worker.
    ///
    /// The in-memory cart keeps working afterwards; changes are no longer
    /// saved.
    pub async fn shutdown(&self) -> StoreResult<()> {
        info!(key = %self.storage_key(), "Shutting down cart store");
        self.inner.persist.shutdown().await
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.inner
            .cart
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reads and decodes the saved cart, falling back to an empty one.
async fn load_cart(storage: &dyn KeyValueStorage, key: &str) -> Cart {
    match storage.get_item(key).await {
        Ok(Some(blob)) => match serde_json::from_str::<Cart>(&blob) {
            Ok(cart) => {
                info!(key, items = cart.len(), "Loaded saved cart");
                cart
            }
            Err(e) => {
                warn!(key, error = %e, "Saved cart is corrupt, starting empty");
                Cart::new()
            }
        },
        Ok(None) => {
            debug!(key, "No saved cart, starting empty");
            Cart::new()
        }
        Err(e) => {
            error!(key, error = %e, "Failed to read saved cart, starting empty");
            Cart::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use async_trait::async_trait;
    use marketplace_core::PRODUCTS_STORAGE_KEY;
    use marketplace_storage::{MemoryStorage, StorageError, StorageResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Memory storage that counts writes and can be told to fail them.
    #[derive(Default)]
    struct TestStorage {
        inner: MemoryStorage,
        writes: AtomicUsize,
        fail_writes: bool,
        fail_reads: bool,
    }

    impl TestStorage {
        fn failing_writes() -> Self {
            TestStorage {
                fail_writes: true,
                ..Default::default()
            }
        }

        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        async fn saved(&self) -> Option<Cart> {
            self.inner
                .get_item(PRODUCTS_STORAGE_KEY)
                .await
                .unwrap()
                .map(|blob| serde_json::from_str(&blob).unwrap())
        }
    }

    #[async_trait]
    impl KeyValueStorage for TestStorage {
        async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
            if self.fail_reads {
                return Err(StorageError::query_failed(key, "disk unavailable"));
            }
            self.inner.get_item(key).await
        }

        async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes {
                return Err(StorageError::Closed);
            }
            self.inner.set_item(key, value).await
        }

        async fn remove_item(&self, key: &str) -> StorageResult<()> {
            self.inner.remove_item(key).await
        }
    }

    fn product(id: &str, price: f64) -> NewCartItem {
        NewCartItem::new(id, format!("Product {}", id), format!("https://cdn/{}.png", id), price)
    }

    async fn open(storage: &Arc<TestStorage>) -> CartStore {
        CartStore::open(storage.clone(), CartSettings::default()).await
    }

    #[tokio::test]
    async fn test_starts_empty_without_saved_cart() {
        let storage = Arc::new(TestStorage::default());
        let store = open(&storage).await;

        assert!(store.products().is_empty());
        assert_eq!(store.totals(), CartTotals::default());
    }

    #[tokio::test]
    async fn test_add_twice_increments() {
        let storage = Arc::new(TestStorage::default());
        let store = open(&storage).await;

        assert_eq!(store.add_to_cart(product("1", 10.0)), CartChange::Added);
        assert_eq!(
            store.add_to_cart(product("1", 10.0)),
            CartChange::Incremented { quantity: 2 }
        );
        store.flush().await.unwrap();

        let products = store.products();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].quantity, 2);

        let saved = storage.saved().await.unwrap();
        assert_eq!(saved.get("1").unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_decrement_at_one_removes_item() {
        let storage = Arc::new(TestStorage::default());
        let store = open(&storage).await;

        store.add_to_cart(product("1", 10.0));
        store.add_to_cart(product("2", 5.0));
        assert_eq!(store.decrement("1"), CartChange::Removed);
        store.flush().await.unwrap();

        let ids: Vec<_> = store.products().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["2".to_string()]);
        assert!(storage.saved().await.unwrap().get("1").is_none());
    }

    #[tokio::test]
    async fn test_readd_after_removal_starts_at_one() {
        let storage = Arc::new(TestStorage::default());
        let store = open(&storage).await;

        store.add_to_cart(product("1", 10.0));
        store.add_to_cart(product("2", 5.0));
        store.decrement("1");
        store.add_to_cart(product("1", 10.0));

        let products = store.products();
        assert_eq!(products[1].id, "1");
        assert_eq!(products[1].quantity, 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_saved() {
        let storage = Arc::new(TestStorage::default());
        let store = open(&storage).await;

        assert_eq!(store.increment("missing"), CartChange::Unchanged);
        assert_eq!(store.decrement("missing"), CartChange::Unchanged);
        assert_eq!(store.clear(), CartChange::Unchanged);
        store.flush().await.unwrap();

        assert_eq!(storage.writes(), 0);
        assert!(storage.saved().await.is_none());
    }

    #[tokio::test]
    async fn test_persist_unchanged_saves_noops() {
        let storage = Arc::new(TestStorage::default());
        let settings = CartSettings {
            persist_unchanged: true,
            ..Default::default()
        };
        let store = CartStore::open(storage.clone(), settings).await;

        store.increment("missing");
        store.flush().await.unwrap();

        assert_eq!(storage.writes(), 1);
        assert_eq!(storage.saved().await.unwrap(), Cart::new());
    }

    #[tokio::test]
    async fn test_cart_survives_restart() {
        let storage = Arc::new(TestStorage::default());

        let store = open(&storage).await;
        store.add_to_cart(product("1", 19.9));
        store.add_to_cart(product("2", 5.0));
        store.increment("2");
        store.shutdown().await.unwrap();
        let before = store.products();

        let reopened = open(&storage).await;
        assert_eq!(reopened.products(), before);
        assert_eq!(reopened.totals().total_quantity, 3);
    }

    #[tokio::test]
    async fn test_saved_blob_is_json_array() {
        let storage = Arc::new(TestStorage::default());
        let store = open(&storage).await;

        store.add_to_cart(product("1", 19.9));
        store.flush().await.unwrap();

        let blob = storage
            .inner
            .get_item(PRODUCTS_STORAGE_KEY)
            .await
            .unwrap()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], "1");
        assert_eq!(items[0]["quantity"], 1);
        assert_eq!(items[0]["price"], 19.9);
    }

    #[tokio::test]
    async fn test_rapid_changes_converge() {
        let storage = Arc::new(TestStorage::default());
        let store = open(&storage).await;

        for _ in 0..5 {
            store.add_to_cart(product("1", 1.0));
        }
        store.decrement("1");
        store.flush().await.unwrap();

        assert_eq!(storage.saved().await.unwrap().get("1").unwrap().quantity, 4);
        assert!(storage.writes() <= 6);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let storage = Arc::new(TestStorage::default());
        let store = open(&storage).await;
        let mut rx = store.subscribe();

        assert!(rx.borrow_and_update().is_empty());

        store.add_to_cart(product("1", 10.0));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().total_quantity(), 1);

        store.increment("missing");
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let storage = Arc::new(TestStorage::default());
        let store = open(&storage).await;
        let other = store.clone();

        other.add_to_cart(product("1", 10.0));
        assert_eq!(store.products().len(), 1);
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory_state() {
        let storage = Arc::new(TestStorage::failing_writes());
        let store = open(&storage).await;

        store.add_to_cart(product("1", 10.0));
        store.add_to_cart(product("1", 10.0));

        assert_eq!(store.products()[0].quantity, 2);
        assert!(matches!(
            store.flush().await,
            Err(StoreError::Storage(StorageError::Closed))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_blob_starts_empty() {
        let storage = Arc::new(TestStorage {
            inner: MemoryStorage::with_entries([(PRODUCTS_STORAGE_KEY, "{not json")]),
            ..Default::default()
        });
        let store = open(&storage).await;

        assert!(store.products().is_empty());

        store.add_to_cart(product("1", 10.0));
        store.flush().await.unwrap();
        assert_eq!(storage.saved().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_read_starts_empty() {
        let storage = Arc::new(TestStorage {
            fail_reads: true,
            ..Default::default()
        });
        let store = open(&storage).await;

        assert!(store.products().is_empty());
    }

    #[tokio::test]
    async fn test_totals() {
        let storage = Arc::new(TestStorage::default());
        let store = open(&storage).await;

        store.add_to_cart(product("1", 19.9));
        store.add_to_cart(product("1", 19.9));
        store.add_to_cart(product("2", 0.1));

        let totals = store.totals();
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.total_quantity, 3);
        assert_eq!(totals.subtotal.cents(), 3990);
    }

    #[tokio::test]
    async fn test_open_with_in_memory_config() {
        let store = CartStore::open_with_config(CartConfig::in_memory())
            .await
            .unwrap();

        store.add_to_cart(product("1", 10.0));
        store.flush().await.unwrap();
        assert_eq!(store.storage_key(), PRODUCTS_STORAGE_KEY);
    }

    #[tokio::test]
    async fn test_file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CartConfig::default();
        config.storage.path = Some(dir.path().join("storage.db"));

        let store = CartStore::open_with_config(config.clone()).await.unwrap();
        store.add_to_cart(product("1", 10.0));
        store.shutdown().await.unwrap();

        let reopened = CartStore::open_with_config(config).await.unwrap();
        assert_eq!(reopened.products().len(), 1);
    }
}
