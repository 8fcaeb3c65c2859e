//! In-process change notification for the document stores.
//!
//! Every write publishes the collection name on a broadcast channel. Each
//! ordered subscription runs in its own task: it delivers an initial snapshot,
//! then re-reads the whole collection whenever a notice for it arrives. A
//! failed re-read is handed to the listener and the next notice tries again.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::broadcast;

use nexiler_core::domain::Document;
use nexiler_core::error::StoreError;
use nexiler_core::ports::{SnapshotListener, Subscription};

/// Reads the current ordered snapshot of one collection.
pub type SnapshotLoader =
    Arc<dyn Fn() -> BoxFuture<'static, Result<Vec<Document>, StoreError>> + Send + Sync>;

/// Broadcast hub for collection change notices.
#[derive(Clone)]
pub struct ChangeHub {
    sender: broadcast::Sender<String>,
}

impl ChangeHub {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            sender: broadcast::channel(buffer_size).0,
        }
    }

    /// Announce that `collection` changed.
    pub fn notify(&self, collection: &str) {
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(collection.to_string());
        tracing::debug!(collection = %collection, "Change published");
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Start a snapshot task for `collection`.
    ///
    /// The initial load happens before this returns so that a broken store is
    /// reported to the caller instead of the listener.
    pub async fn watch(
        &self,
        collection: &str,
        load: SnapshotLoader,
        listener: SnapshotListener,
    ) -> Result<Subscription, StoreError> {
        // Subscribe before the first read so no write slips between the two.
        let mut receiver = self.sender.subscribe();
        let initial = load().await?;
        let collection = collection.to_string();

        let task = tokio::spawn(async move {
            tracing::debug!(collection = %collection, "Snapshot subscription started");
            listener(Ok(initial));

            loop {
                match receiver.recv().await {
                    Ok(changed) if changed != collection => continue,
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        tracing::warn!(
                            collection = %collection,
                            lagged = count,
                            "Subscriber lagged behind, reloading"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::debug!(collection = %collection, "Change hub closed");
                        break;
                    }
                }

                let snapshot = load().await;
                if let Err(e) = &snapshot {
                    tracing::error!(collection = %collection, error = %e, "Snapshot reload failed");
                }
                listener(snapshot);
            }
        });

        let abort = task.abort_handle();
        Ok(Subscription::new(move || abort.abort()))
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures::FutureExt;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    use super::*;
    use nexiler_core::ports::Snapshot;

    async fn next(rx: &mut mpsc::UnboundedReceiver<Snapshot>) -> Snapshot {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("snapshot timed out")
            .expect("subscription closed")
    }

    #[tokio::test]
    async fn test_failed_reload_reaches_listener_and_recovers() {
        let hub = ChangeHub::default();
        let loads = Arc::new(AtomicUsize::new(0));

        let counter = loads.clone();
        let load: SnapshotLoader = Arc::new(move || {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                match call {
                    1 => Err(StoreError::Connection("connection reset".to_string())),
                    _ => Ok(vec![Document::new(Uuid::from_u128(call as u128), Default::default())]),
                }
            }
            .boxed()
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = hub
            .watch(
                "blogs",
                load,
                Box::new(move |snapshot| {
                    let _ = tx.send(snapshot);
                }),
            )
            .await
            .unwrap();

        assert_eq!(next(&mut rx).await.unwrap().len(), 1);

        hub.notify("blogs");
        let failed = next(&mut rx).await.unwrap_err();
        assert!(failed.to_string().contains("connection reset"));

        hub.notify("blogs");
        assert_eq!(next(&mut rx).await.unwrap()[0].id, Uuid::from_u128(2));
    }
}
