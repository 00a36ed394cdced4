//! # Entity Trait
//!
//! The capability set the marshaller needs from a domain object. Any type that
//! implements [`Entity`] can be produced by an endpoint factory, hydrated with
//! [`Marshaller::one`](crate::marshal::Marshaller::one) and updated with
//! [`Marshaller::merge`](crate::marshal::Marshaller::merge).
//!
//! [`Record`](crate::model::Record) is the stock implementation. Custom
//! entities only need the required methods; the provided ones are built on top
//! of them.
//!
//! # Provided Methods
//! - [`Entity::set_many`] honours field accessibility.
//! - [`Entity::extract`] reads several fields at once, absent ones as null.
//! - [`Entity::set_invalid_field`] does nothing unless the entity tracks
//!   rejected input.

use indexmap::IndexMap;
use serde_json::Value;

use crate::model::{FieldValue, ValidationErrors};

/// A mutable domain object that can be hydrated from raw data.
pub trait Entity {
    /// Current value of `field`, if one was ever set.
    fn get(&self, field: &str) -> Option<&FieldValue>;

    /// Writes a single field, ignoring accessibility.
    fn set(&mut self, field: &str, value: FieldValue);

    fn is_new(&self) -> bool;

    fn set_new(&mut self, new: bool);

    /// Marks `field` as settable (or not) by guarded bulk writes.
    /// The `"*"` field applies to every field without its own flag.
    fn set_access(&mut self, field: &str, accessible: bool);

    fn is_accessible(&self, field: &str) -> bool;

    /// Replaces the entity's validation errors.
    fn set_errors(&mut self, errors: ValidationErrors);

    fn errors(&self) -> &ValidationErrors;

    /// Records which endpoint the entity came from.
    fn set_source(&mut self, source: &str);

    fn source(&self) -> Option<&str>;

    /// Writes every accessible field of `values`; inaccessible ones are skipped.
    fn set_many(&mut self, values: IndexMap<String, FieldValue>) {
        for (field, value) in values {
            if self.is_accessible(&field) {
                self.set(&field, value);
            }
        }
    }

    /// Reads `fields` in order. Fields without a value come back as null.
    fn extract(&self, fields: &[String]) -> IndexMap<String, FieldValue> {
        fields
            .iter()
            .map(|field| {
                let value = self.get(field).cloned().unwrap_or_default();
                (field.clone(), value)
            })
            .collect()
    }

    /// Remembers the raw value a validator rejected for `field`.
    fn set_invalid_field(&mut self, _field: &str, _value: Value) {}
}
