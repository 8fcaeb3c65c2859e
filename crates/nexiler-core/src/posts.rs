//! Typed access to the blog collection on top of the generic content store.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{NewPost, Post, PostPatch};
use crate::error::StoreError;
use crate::ports::{ContentStore, OrderBy, Subscription};

/// Collection holding blog posts unless configured otherwise.
pub const DEFAULT_COLLECTION: &str = "blogs";

/// Field the live list is ordered by, newest first.
pub const ORDER_FIELD: &str = "date";

/// Blog posts stored in one collection of a [`ContentStore`].
#[derive(Clone)]
pub struct PostCollection {
    store: Arc<dyn ContentStore>,
    name: String,
}

impl PostCollection {
    pub fn new(store: Arc<dyn ContentStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn create(&self, post: &NewPost) -> Result<Uuid, StoreError> {
        let id = self.store.create(&self.name, post.to_record()?).await?;
        tracing::info!(post_id = %id, status = %post.status, "Post created");
        Ok(id)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        Ok(self
            .store
            .get(&self.name, id)
            .await?
            .map(|doc| Post::from_document(&doc)))
    }

    pub async fn update(&self, id: Uuid, patch: &PostPatch) -> Result<(), StoreError> {
        self.store.update(&self.name, id, patch.to_record()?).await?;
        tracing::info!(post_id = %id, "Post updated");
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.store.delete(&self.name, id).await?;
        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }

    /// Live list ordered by `date` descending, delivered in store order.
    /// A store failure while re-reading arrives as `Err`.
    pub async fn subscribe<F>(&self, listener: F) -> Result<Subscription, StoreError>
    where
        F: Fn(Result<Vec<Post>, StoreError>) + Send + Sync + 'static,
    {
        self.store
            .subscribe_ordered(
                &self.name,
                OrderBy::desc(ORDER_FIELD),
                Box::new(move |snapshot| {
                    listener(snapshot.map(|docs| docs.iter().map(Post::from_document).collect()))
                }),
            )
            .await
    }
}
