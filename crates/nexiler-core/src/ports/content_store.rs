//! Content store port - the hosted document database seen as a black box.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::Subscription;
use crate::domain::{Document, Record};
use crate::error::StoreError;

/// Sort direction for an ordered subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Field ordering for [`ContentStore::subscribe_ordered`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }

    /// Field names are restricted to ASCII letters, digits and `_` so adapters
    /// can embed them in queries.
    pub fn validate(&self) -> Result<(), StoreError> {
        let ok = !self.field.is_empty()
            && self
                .field
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if ok {
            Ok(())
        } else {
            Err(StoreError::InvalidField(self.field.clone()))
        }
    }

    /// Sort documents in place the way every adapter must deliver them.
    ///
    /// Documents lacking the field are dropped; ties fall back to id order.
    pub fn arrange(&self, docs: &mut Vec<Document>) {
        docs.retain(|doc| doc.fields.get(&self.field).is_some_and(|v| !v.is_null()));
        docs.sort_by(|a, b| {
            let ord = compare_values(&a.fields[&self.field], &b.fields[&self.field]);
            let ord = match self.direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            };
            ord.then_with(|| a.id.cmp(&b.id))
        });
    }
}

/// Total order over JSON values: booleans < numbers < strings < anything else.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// One delivery to a subscription: the full ordered set, or the error that
/// prevented re-reading it. A failed delivery does not end the subscription.
pub type Snapshot = Result<Vec<Document>, StoreError>;

/// Listener receiving full ordered snapshots.
pub type SnapshotListener = Box<dyn Fn(Snapshot) + Send + Sync>;

/// Content store trait - generic CRUD plus live ordered subscriptions.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store a new document and return its generated id.
    async fn create(&self, collection: &str, record: Record) -> Result<Uuid, StoreError>;

    /// Fetch a single document.
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError>;

    /// Merge fields into an existing document.
    async fn update(&self, collection: &str, id: Uuid, partial: Record) -> Result<(), StoreError>;

    /// Delete a document.
    async fn delete(&self, collection: &str, id: Uuid) -> Result<(), StoreError>;

    /// Push the full ordered document set now and after every change.
    ///
    /// The first snapshot is delivered shortly after registration. Each
    /// snapshot replaces the previous one; callers never merge deltas. A
    /// re-read that fails is delivered as `Err` and the subscription stays open.
    async fn subscribe_ordered(
        &self,
        collection: &str,
        order: OrderBy,
        listener: SnapshotListener,
    ) -> Result<Subscription, StoreError>;
}
