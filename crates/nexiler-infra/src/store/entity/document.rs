//! Document entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub collection: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub data: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The stored fields; a non-object payload reads as an empty record.
    pub fn fields(&self) -> nexiler_core::domain::Record {
        match &self.data {
            Value::Object(map) => map.clone(),
            _ => Default::default(),
        }
    }
}

/// Conversion from SeaORM Model to domain Document.
impl From<Model> for nexiler_core::domain::Document {
    fn from(model: Model) -> Self {
        let fields = model.fields();
        Self::new(model.id, fields)
    }
}

/// A fresh row for `collection`.
pub fn new_row(id: Uuid, collection: &str, fields: nexiler_core::domain::Record) -> ActiveModel {
    ActiveModel {
        id: Set(id),
        collection: Set(collection.to_string()),
        data: Set(Value::Object(fields)),
        created_at: Set(chrono::Utc::now().into()),
    }
}
