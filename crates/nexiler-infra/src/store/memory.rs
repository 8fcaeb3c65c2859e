//! In-memory document store - used when no `DATABASE_URL` is configured.
//!
//! Works within a single process only. Data is lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::RwLock;
use uuid::Uuid;

use nexiler_core::domain::{Document, Record};
use nexiler_core::error::StoreError;
use nexiler_core::ports::{ContentStore, OrderBy, SnapshotListener, Subscription};

use super::notify::{ChangeHub, SnapshotLoader};

type Collections = HashMap<String, HashMap<Uuid, Record>>;

/// Document store backed by nested hash maps behind an async RwLock.
pub struct InMemoryContentStore {
    collections: Arc<RwLock<Collections>>,
    hub: ChangeHub,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            hub: ChangeHub::default(),
        }
    }

    /// Live subscriptions still being fed.
    pub fn subscriber_count(&self) -> usize {
        self.hub.subscriber_count()
    }

    fn not_found(collection: &str, id: Uuid) -> StoreError {
        StoreError::NotFound {
            collection: collection.to_string(),
            id,
        }
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn create(&self, collection: &str, record: Record) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id, record);

        tracing::debug!(collection = %collection, id = %id, "Document created");
        self.hub.notify(collection);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(&id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn update(&self, collection: &str, id: Uuid, partial: Record) -> Result<(), StoreError> {
        {
            let mut collections = self.collections.write().await;
            let fields = collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(&id))
                .ok_or_else(|| Self::not_found(collection, id))?;
            fields.extend(partial);
        }

        tracing::debug!(collection = %collection, id = %id, "Document updated");
        self.hub.notify(collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<(), StoreError> {
        let removed = self
            .collections
            .write()
            .await
            .get_mut(collection)
            .and_then(|docs| docs.remove(&id));
        if removed.is_none() {
            return Err(Self::not_found(collection, id));
        }

        tracing::debug!(collection = %collection, id = %id, "Document deleted");
        self.hub.notify(collection);
        Ok(())
    }

    async fn subscribe_ordered(
        &self,
        collection: &str,
        order: OrderBy,
        listener: SnapshotListener,
    ) -> Result<Subscription, StoreError> {
        order.validate()?;

        let collections = self.collections.clone();
        let name = collection.to_string();
        let load: SnapshotLoader = Arc::new(move || {
            let collections = collections.clone();
            let name = name.clone();
            let order = order.clone();
            async move {
                let mut docs: Vec<Document> = collections
                    .read()
                    .await
                    .get(&name)
                    .map(|docs| {
                        docs.iter()
                            .map(|(id, fields)| Document::new(*id, fields.clone()))
                            .collect()
                    })
                    .unwrap_or_default();
                order.arrange(&mut docs);
                Ok(docs)
            }
            .boxed()
        });

        self.hub.watch(collection, load, listener).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use tokio::sync::mpsc;

    use super::*;
    use nexiler_core::ports::Snapshot;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap_or_default()
    }

    async fn next_snapshot(rx: &mut mpsc::UnboundedReceiver<Snapshot>) -> Vec<Document> {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("snapshot timed out")
            .expect("subscription closed")
            .expect("snapshot failed")
    }

    fn titles(docs: &[Document]) -> Vec<&str> {
        docs.iter().filter_map(|d| d.get_str("title")).collect()
    }

    #[tokio::test]
    async fn test_crud() {
        let store = InMemoryContentStore::new();

        let id = store
            .create("blogs", record(json!({ "title": "Hello", "status": "draft" })))
            .await
            .unwrap();

        store
            .update("blogs", id, record(json!({ "status": "published" })))
            .await
            .unwrap();
        let doc = store.get("blogs", id).await.unwrap().unwrap();
        assert_eq!(doc.get_str("title"), Some("Hello"));
        assert_eq!(doc.get_str("status"), Some("published"));

        store.delete("blogs", id).await.unwrap();
        assert!(store.get("blogs", id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = InMemoryContentStore::new();
        let id = Uuid::new_v4();

        let err = store.update("blogs", id, Record::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        let err = store.delete("blogs", id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_subscription_delivers_ordered_snapshots() {
        let store = InMemoryContentStore::new();
        store
            .create("blogs", record(json!({ "title": "Old", "date": "2024-01-01" })))
            .await
            .unwrap();
        store
            .create("blogs", record(json!({ "title": "Undated" })))
            .await
            .unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = store
            .subscribe_ordered(
                "blogs",
                OrderBy::desc("date"),
                Box::new(move |snapshot| {
                    let _ = tx.send(snapshot);
                }),
            )
            .await
            .unwrap();

        let initial = next_snapshot(&mut rx).await;
        assert_eq!(titles(&initial), vec!["Old"]);

        store
            .create("blogs", record(json!({ "title": "New", "date": "2025-01-01" })))
            .await
            .unwrap();
        let next = next_snapshot(&mut rx).await;
        assert_eq!(titles(&next), vec!["New", "Old"]);
    }

    #[tokio::test]
    async fn test_other_collections_do_not_trigger_snapshots() {
        let store = InMemoryContentStore::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = store
            .subscribe_ordered(
                "blogs",
                OrderBy::desc("date"),
                Box::new(move |snapshot| {
                    let _ = tx.send(snapshot);
                }),
            )
            .await
            .unwrap();
        assert!(next_snapshot(&mut rx).await.is_empty());

        store
            .create("pages", record(json!({ "date": "2025-01-01" })))
            .await
            .unwrap();
        store
            .create("blogs", record(json!({ "title": "Post", "date": "2025-01-01" })))
            .await
            .unwrap();

        assert_eq!(titles(&next_snapshot(&mut rx).await), vec!["Post"]);
    }

    #[tokio::test]
    async fn test_dropping_subscription_stops_delivery() {
        let store = InMemoryContentStore::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = store
            .subscribe_ordered(
                "blogs",
                OrderBy::desc("date"),
                Box::new(move |snapshot| {
                    let _ = tx.send(snapshot);
                }),
            )
            .await
            .unwrap();
        next_snapshot(&mut rx).await;

        drop(subscription);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.subscriber_count(), 0);

        store
            .create("blogs", record(json!({ "date": "2025-01-01" })))
            .await
            .unwrap();
        // The listener (and its sender) went away with the task.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_order_field_is_rejected() {
        let store = InMemoryContentStore::new();
        let result = store
            .subscribe_ordered("blogs", OrderBy::desc("date desc"), Box::new(|_| {}))
            .await;
        assert!(matches!(result, Err(StoreError::InvalidField(_))));
    }
}
