use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Schemaless field set of a stored document.
pub type Record = Map<String, Value>;

/// A document as held by the content store: an id plus its fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: Uuid,
    pub fields: Record,
}

impl Document {
    pub fn new(id: Uuid, fields: Record) -> Self {
        Self { id, fields }
    }

    /// String value of a field, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// Serialize a struct into a [`Record`]. Anything that is not a JSON object
/// is rejected.
pub fn to_record<T: Serialize>(value: &T) -> Result<Record, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!(
            "expected an object, got {other}"
        ))),
    }
}
