use std::fmt;

use serde_json::{Number, Value};

use crate::framework::Entity;
use crate::model::{FieldValue, RawRecord};

/// Joins the rendered parts of a composite key.
pub const KEY_DELIMITER: &str = ";";

/// The primary-key values of a record or entity, joined into one token.
///
/// When every part is empty the key is the empty string, which never matches
/// anything: such records are treated as new.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CompositeKey(String);

impl CompositeKey {
    /// Key of a raw record. Missing fields contribute an empty part.
    pub fn for_record(record: &RawRecord, fields: &[String]) -> Self {
        Self::from_parts(
            fields
                .iter()
                .map(|field| record.get(field).map(render_value).unwrap_or_default()),
        )
    }

    /// Key of an entity from its current primary-key values.
    pub fn for_entity<E: Entity + ?Sized>(entity: &E, fields: &[String]) -> Self {
        Self::from_parts(
            fields
                .iter()
                .map(|field| entity.get(field).map(render_field).unwrap_or_default()),
        )
    }

    fn from_parts(parts: impl Iterator<Item = String>) -> Self {
        let parts: Vec<String> = parts.collect();
        if parts.iter().all(String::is_empty) {
            return Self::default();
        }
        Self(parts.join(KEY_DELIMITER))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Number(number) => render_number(number),
        composite => composite.to_string(),
    }
}

/// Integral floats render like integers, so `2.0` and `2` give the same key.
fn render_number(number: &Number) -> String {
    match number.as_f64() {
        Some(float)
            if number.is_f64()
                && float.fract() == 0.0
                && float >= i64::MIN as f64
                && float < i64::MAX as f64 =>
        {
            (float as i64).to_string()
        }
        _ => number.to_string(),
    }
}

fn render_field(value: &FieldValue) -> String {
    match value {
        FieldValue::Value(value) => render_value(value),
        FieldValue::Entity(_) => String::new(),
    }
}
