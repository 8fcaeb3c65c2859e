//! PostgreSQL document store.
//!
//! Documents live in a single `documents` table as JSONB, keyed by id and
//! scoped by collection. Change notices are published in-process after each
//! local write, so live subscriptions assume a single server process.

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DbConn, DbErr, EntityTrait, QueryFilter};
use serde_json::Value;
use uuid::Uuid;

use nexiler_core::domain::{Document, Record};
use nexiler_core::error::StoreError;
use nexiler_core::ports::{ContentStore, OrderBy, SnapshotListener, Subscription};

use super::entity::document::{self, Entity as DocumentEntity};
use super::notify::{ChangeHub, SnapshotLoader};

fn query_error(e: DbErr) -> StoreError {
    match e {
        DbErr::Conn(e) => StoreError::Connection(e.to_string()),
        other => StoreError::Query(other.to_string()),
    }
}

/// Document store on a SeaORM connection.
pub struct PostgresContentStore {
    db: Arc<DbConn>,
    hub: ChangeHub,
}

impl PostgresContentStore {
    pub fn new(db: DbConn) -> Self {
        Self {
            db: Arc::new(db),
            hub: ChangeHub::default(),
        }
    }

    async fn find(&self, collection: &str, id: Uuid) -> Result<Option<document::Model>, StoreError> {
        DocumentEntity::find_by_id(id)
            .filter(document::Column::Collection.eq(collection))
            .one(&*self.db)
            .await
            .map_err(query_error)
    }

    async fn load(db: &DbConn, collection: &str, order: &OrderBy) -> Result<Vec<Document>, StoreError> {
        let mut docs: Vec<Document> = DocumentEntity::find()
            .filter(document::Column::Collection.eq(collection))
            .all(db)
            .await
            .map_err(query_error)?
            .into_iter()
            .map(Into::into)
            .collect();
        // JSON ordering in SQL differs from the store contract, sort here.
        order.arrange(&mut docs);
        Ok(docs)
    }
}

#[async_trait]
impl ContentStore for PostgresContentStore {
    async fn create(&self, collection: &str, record: Record) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        DocumentEntity::insert(document::new_row(id, collection, record))
            .exec_without_returning(&*self.db)
            .await
            .map_err(query_error)?;

        tracing::debug!(collection = %collection, id = %id, "Document created");
        self.hub.notify(collection);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError> {
        Ok(self.find(collection, id).await?.map(Into::into))
    }

    async fn update(&self, collection: &str, id: Uuid, partial: Record) -> Result<(), StoreError> {
        // Merge in the database so concurrent patches to different fields both land.
        let result = DocumentEntity::update_many()
            .col_expr(
                document::Column::Data,
                Expr::cust_with_values(r#""data" || $1"#, [Value::Object(partial)]),
            )
            .filter(document::Column::Id.eq(id))
            .filter(document::Column::Collection.eq(collection))
            .exec(&*self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id,
            });
        }

        tracing::debug!(collection = %collection, id = %id, "Document updated");
        self.hub.notify(collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<(), StoreError> {
        let result = DocumentEntity::delete_many()
            .filter(document::Column::Id.eq(id))
            .filter(document::Column::Collection.eq(collection))
            .exec(&*self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id,
            });
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

        let db = self.db.clone();
        let name = collection.to_string();
        let load: SnapshotLoader = Arc::new(move || {
            let db = db.clone();
            let name = name.clone();
            let order = order.clone();
            async move { Self::load(&db, &name, &order).await }.boxed()
        });

        self.hub.watch(collection, load, listener).await
    }
}
