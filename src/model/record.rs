use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};

use super::{FieldValue, RawRecord, ValidationErrors};
use crate::framework::Entity;

/// The stock [`Entity`]: an ordered bag of field values with dirty tracking.
///
/// A fresh record is new, has no source, and every field is accessible
/// (`"*" => true`). Every [`Entity::set`] marks the field dirty, even when the
/// value did not change; avoiding no-op writes is the merger's job.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: IndexMap<String, FieldValue>,
    dirty: IndexSet<String>,
    accessible: IndexMap<String, bool>,
    invalid: IndexMap<String, Value>,
    errors: ValidationErrors,
    new: bool,
    source: Option<String>,
}

impl Record {
    pub fn new() -> Self {
        let mut accessible = IndexMap::new();
        accessible.insert(ALL_FIELDS.to_string(), true);
        Self {
            values: IndexMap::new(),
            dirty: IndexSet::new(),
            accessible,
            invalid: IndexMap::new(),
            errors: ValidationErrors::new(),
            new: true,
            source: None,
        }
    }

    /// A new record holding `values`, each field marked dirty.
    pub fn with_values(values: RawRecord) -> Self {
        let mut record = Self::new();
        for (field, value) in values {
            record.set(&field, FieldValue::Value(value));
        }
        record
    }

    /// A record as it would come back from storage: not new, nothing dirty.
    pub fn persisted(values: RawRecord) -> Self {
        let mut record = Self::with_values(values);
        record.new = false;
        record.clean();
        record
    }

    pub fn is_dirty(&self, field: &str) -> bool {
        self.dirty.contains(field)
    }

    /// Fields written since the last [`Record::clean`], in write order.
    pub fn dirty_fields(&self) -> Vec<&str> {
        self.dirty.iter().map(String::as_str).collect()
    }

    pub fn clean(&mut self) {
        self.dirty.clear();
        self.invalid.clear();
        self.errors.clear();
    }

    /// Raw values rejected by validation, keyed by field.
    pub fn invalid_fields(&self) -> &IndexMap<String, Value> {
        &self.invalid
    }

    pub fn invalid_field(&self, field: &str) -> Option<&Value> {
        self.invalid.get(field)
    }

    /// Field values as a JSON object, nested entities included.
    pub fn to_json(&self) -> Value {
        let object: Map<String, Value> = self
            .values
            .iter()
            .map(|(field, value)| (field.clone(), value.to_json()))
            .collect();
        Value::Object(object)
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

const ALL_FIELDS: &str = "*";

impl Entity for Record {
    fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    fn set(&mut self, field: &str, value: FieldValue) {
        self.values.insert(field.to_string(), value);
        self.dirty.insert(field.to_string());
    }

    fn is_new(&self) -> bool {
        self.new
    }

    fn set_new(&mut self, new: bool) {
        self.new = new;
    }

    fn set_access(&mut self, field: &str, accessible: bool) {
        // The wildcard resets every explicit flag as well.
        if field == ALL_FIELDS {
            for flag in self.accessible.values_mut() {
                *flag = accessible;
            }
        }
        self.accessible.insert(field.to_string(), accessible);
    }

    fn is_accessible(&self, field: &str) -> bool {
        self.accessible
            .get(field)
            .or_else(|| self.accessible.get(ALL_FIELDS))
            .copied()
            .unwrap_or(false)
    }

    fn set_errors(&mut self, errors: ValidationErrors) {
        self.errors = errors;
    }

    fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    fn set_source(&mut self, source: &str) {
        self.source = Some(source.to_string());
    }

    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn set_invalid_field(&mut self, field: &str, value: Value) {
        self.invalid.insert(field.to_string(), value);
    }
}
