//! Raw input and stored field values.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::Record;

/// An untyped, externally supplied record. Iteration follows insertion order.
pub type RawRecord = Map<String, Value>;

/// Field name to the messages a validator produced for it.
///
/// A field with no entry (or an empty list) is valid.
pub type ValidationErrors = IndexMap<String, Vec<String>>;

/// A value held by an entity field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Plain JSON: a scalar, a composite, or null.
    Value(Value),
    /// A nested entity, typically produced by a custom coercer.
    ///
    /// Nested entities are always the stock [`Record`], whatever entity type
    /// the owning endpoint produces. A custom entity type can hold nested
    /// records but cannot itself be nested.
    Entity(Box<Record>),
}

impl FieldValue {
    pub fn null() -> Self {
        FieldValue::Value(Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Value(Value::Null))
    }

    pub fn is_entity(&self) -> bool {
        matches!(self, FieldValue::Entity(_))
    }

    /// Renders the value back to JSON, nested entities included.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Value(value) => value.clone(),
            FieldValue::Entity(record) => record.to_json(),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::null()
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Value(value)
    }
}

impl From<Record> for FieldValue {
    fn from(record: Record) -> Self {
        FieldValue::Entity(Box::new(record))
    }
}
