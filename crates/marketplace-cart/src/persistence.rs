//! # Persistence Worker
//!
//! Writes cart snapshots to storage in the background, one at a time.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Persistence Worker                                 │
//! │                                                                         │
//! │  CartStore ──Save(snapshot)──►┌──────────────┐                          │
//! │  CartStore ──Flush(ack)──────►│ mpsc queue   │                          │
//! │  CartStore ──Shutdown(ack)───►└──────┬───────┘                          │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │ PersistWorker (single task)                                     │   │
//! │  │                                                                 │   │
//! │  │ 1. Save: drain queued Saves, keep only the newest snapshot      │   │
//! │  │ 2. Encode as a JSON array                                       │   │
//! │  │ 3. storage.set_item(key, blob)   ← at most one write in flight  │   │
//! │  │ 4. Flush: reply with the first failure since the last Flush     │   │
//! │  │ 5. Shutdown: reply, then stop                                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands are handled in the order they were sent, so the stored blob
//! always converges to the last snapshot enqueued before a Flush.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use marketplace_core::Cart;
use marketplace_storage::KeyValueStorage;

use crate::error::{StoreError, StoreResult};

/// A request to the persistence worker.
#[derive(Debug)]
enum PersistCommand {
    /// Store this snapshot.
    Save(Arc<Cart>),

    /// Reply once every earlier Save has been written.
    Flush(oneshot::Sender<StoreResult<()>>),

    /// Reply once every earlier Save has been written, then stop.
    Shutdown(oneshot::Sender<()>),
}

// =============================================================================
// Handle
// =============================================================================

/// Sending side of the persistence worker.
#[derive(Debug, Clone)]
pub struct PersistHandle {
    tx: mpsc::UnboundedSender<PersistCommand>,
}

impl PersistHandle {
    /// Enqueues a snapshot. Never blocks.
    pub fn save(&self, cart: Arc<Cart>) {
        if self.tx.send(PersistCommand::Save(cart)).is_err() {
            warn!("Persistence worker stopped; cart change not saved");
        }
    }

    /// Waits for all enqueued snapshots to be written.
    ///
    /// Returns the first write failure since the previous flush.
    pub async fn flush(&self) -> StoreResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(PersistCommand::Flush(ack_tx))
            .map_err(|_| StoreError::WorkerStopped)?;

        ack_rx.await.map_err(|_| StoreError::WorkerStopped)?
    }

    /// Writes what is queued and stops the worker.
    pub async fn shutdown(&self) -> StoreResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(PersistCommand::Shutdown(ack_tx))
            .map_err(|_| StoreError::WorkerStopped)?;

        ack_rx.await.map_err(|_| StoreError::WorkerStopped)
    }

    /// Returns true while the worker accepts commands.
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }
}

// =============================================================================
// Worker
// =============================================================================

/// Background writer for cart snapshots.
pub struct PersistWorker {
    /// Device storage.
    storage: Arc<dyn KeyValueStorage>,

    /// Key the cart blob lives under.
    key: String,

    /// Incoming commands.
    rx: mpsc::UnboundedReceiver<PersistCommand>,

    /// First write failure not yet reported by a Flush.
    pending_error: Option<StoreError>,
}

impl PersistWorker {
    /// Spawns the worker on the current runtime and returns its handle.
    pub fn spawn(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> PersistHandle {
        let (tx, rx) = mpsc::unbounded_channel();

        let worker = PersistWorker {
            storage,
            key: key.into(),
            rx,
            pending_error: None,
        };
        tokio::spawn(worker.run());

        PersistHandle { tx }
    }

    async fn run(mut self) {
        debug!(key = %self.key, "Persistence worker started");

        while let Some(command) = self.rx.recv().await {
            let (latest, deferred) = match command {
                PersistCommand::Save(cart) => self.coalesce(cart),
                other => (None, Some(other)),
            };

            if let Some(cart) = latest {
                self.write(&cart).await;
            }

            if let Some(control) = deferred {
                if self.handle_control(control) {
                    break;
                }
            }
        }

        info!(key = %self.key, "Persistence worker stopped");
    }

    /// Drains queued Saves, keeping the newest. Stops at the first
    /// non-Save command and hands it back so it runs after the write.
    fn coalesce(&mut self, first: Arc<Cart>) -> (Option<Arc<Cart>>, Option<PersistCommand>) {
        let mut latest = first;
        let mut skipped = 0usize;

        while let Ok(next) = self.rx.try_recv() {
            match next {
                PersistCommand::Save(cart) => {
                    latest = cart;
                    skipped += 1;
                }
                other => return (Some(latest), Some(other)),
            }
        }

        if skipped > 0 {
            debug!(skipped, "Coalesced queued cart snapshots");
        }
        (Some(latest), None)
    }

    async fn write(&mut self, cart: &Cart) {
        if let Err(e) = self.try_write(cart).await {
            error!(key = %self.key, error = %e, "Failed to persist cart");
            if self.pending_error.is_none() {
                self.pending_error = Some(e);
            }
        }
    }

    async fn try_write(&self, cart: &Cart) -> StoreResult<()> {
        let blob = serde_json::to_string(cart)?;
        self.storage.set_item(&self.key, &blob).await?;

        debug!(key = %self.key, items = cart.len(), "Cart persisted");
        Ok(())
    }

    /// Returns true when the worker should stop.
    fn handle_control(&mut self, command: PersistCommand) -> bool {
        match command {
            PersistCommand::Save(_) => false,
            PersistCommand::Flush(ack) => {
                let result = match self.pending_error.take() {
                    Some(e) => Err(e),
                    None => Ok(()),
                };
                // Caller went away: keep the failure for the next flush
                if let Err(Err(e)) = ack.send(result) {
                    self.pending_error = Some(e);
                }
                false
            }
            PersistCommand::Shutdown(ack) => {
                if let Some(e) = self.pending_error.take() {
                    warn!(error = %e, "Shutting down with an unreported write failure");
                }
                let _ = ack.send(());
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use marketplace_core::NewCartItem;
    use marketplace_storage::{MemoryStorage, StorageError, StorageResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStorage {
        inner: MemoryStorage,
        writes: AtomicUsize,
        fail: bool,
    }

    impl CountingStorage {
        fn new(fail: bool) -> Self {
            CountingStorage {
                inner: MemoryStorage::new(),
                writes: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl KeyValueStorage for CountingStorage {
        async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.get_item(key).await
        }

        async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StorageError::Closed);
            }
            self.inner.set_item(key, value).await
        }

        async fn remove_item(&self, key: &str) -> StorageResult<()> {
            self.inner.remove_item(key).await
        }
    }

    fn cart_with(ids: &[&str]) -> Arc<Cart> {
        let mut cart = Cart::new();
        for id in ids {
            cart.add(NewCartItem::new(*id, "Item", "https://cdn/item.png", 10.0));
        }
        Arc::new(cart)
    }

    #[tokio::test]
    async fn test_queued_saves_coalesce_to_latest() {
        let storage = Arc::new(CountingStorage::new(false));
        let handle = PersistWorker::spawn(storage.clone(), "cart");

        handle.save(cart_with(&["1"]));
        handle.save(cart_with(&["1", "2"]));
        handle.save(cart_with(&["1", "2", "3"]));
        handle.flush().await.unwrap();

        assert_eq!(storage.writes.load(Ordering::SeqCst), 1);
        let blob = storage.inner.get_item("cart").await.unwrap().unwrap();
        let stored: Cart = serde_json::from_str(&blob).unwrap();
        assert_eq!(stored.len(), 3);
    }

    #[tokio::test]
    async fn test_flush_reports_failure_once() {
        let storage = Arc::new(CountingStorage::new(true));
        let handle = PersistWorker::spawn(storage.clone(), "cart");

        handle.save(cart_with(&["1"]));
        let err = handle.flush().await.unwrap_err();
        assert!(matches!(err, StoreError::Storage(StorageError::Closed)));

        // Already reported
        assert!(handle.flush().await.is_ok());
    }

    #[tokio::test]
    async fn test_abandoned_flush_keeps_failure() {
        let storage = Arc::new(CountingStorage::new(true));
        let handle = PersistWorker::spawn(storage.clone(), "cart");

        handle.save(cart_with(&["1"]));
        let (ack_tx, ack_rx) = oneshot::channel();
        drop(ack_rx);
        handle.tx.send(PersistCommand::Flush(ack_tx)).unwrap();

        let err = handle.flush().await.unwrap_err();
        assert!(matches!(err, StoreError::Storage(StorageError::Closed)));
    }

    #[tokio::test]
    async fn test_shutdown_writes_pending_then_stops() {
        let storage = Arc::new(CountingStorage::new(false));
        let handle = PersistWorker::spawn(storage.clone(), "cart");

        handle.save(cart_with(&["1", "2"]));
        handle.shutdown().await.unwrap();

        assert_eq!(storage.writes.load(Ordering::SeqCst), 1);
        assert!(matches!(handle.flush().await, Err(StoreError::WorkerStopped)));
        assert!(!handle.is_running());
    }

    #[tokio::test]
    async fn test_flush_with_nothing_queued() {
        let storage = Arc::new(CountingStorage::new(false));
        let handle = PersistWorker::spawn(storage.clone(), "cart");

        handle.flush().await.unwrap();
        assert_eq!(storage.writes.load(Ordering::SeqCst), 0);
    }
}
