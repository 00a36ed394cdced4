//! # Marshaller
//!
//! Turns raw records into entities of an [`Endpoint`] and reconciles batches
//! of records with existing entities.
//!
//! ## Operations
//!
//! * **one**: hydrates a single record into a brand-new entity.
//! * **many**: hydrates every object in a list, skipping anything else.
//! * **merge**: applies a record onto an existing entity, skipping writes
//!   that would not change anything.
//! * **merge_many**: matches records to entities by composite primary key,
//!   merges the matches and hydrates the rest as new entities.
//!
//! ## Single-record pipeline
//!
//! 1. Prepare: default the validation mode, unwrap a payload nested under the
//!    endpoint alias, run [`HydrationHooks::before_hydrate`].
//! 2. Validate. A misconfigured validator fails here, before the entity is
//!    touched. A field with errors is marked invalid and never written.
//! 3. Apply `accessible_fields` to the entity.
//! 4. Coerce each remaining field through the [`PropertyMap`].
//! 5. Write. Without a field list, staged values go through the guarded
//!    [`Entity::set_many`]. With one, only listed fields are written and
//!    [`HydrationHooks::after_hydrate`] fires.

pub mod key;
pub mod property_map;
pub mod validation;

pub use key::*;
pub use property_map::*;
pub use validation::validate;

use std::sync::Arc;

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use crate::endpoint::Endpoint;
use crate::error::MarshalError;
use crate::framework::{Entity, HydrationHooks, NoHooks};
use crate::model::{FieldValue, Options, RawRecord, Validate, ValidationErrors};

/// Hydrates, merges and reconciles entities of one endpoint.
pub struct Marshaller<E> {
    endpoint: Arc<Endpoint<E>>,
    hooks: Arc<dyn HydrationHooks>,
}

impl<E: Entity> Marshaller<E> {
    pub fn new(endpoint: Arc<Endpoint<E>>) -> Self {
        Self {
            endpoint,
            hooks: Arc::new(NoHooks),
        }
    }

    /// Replaces the hooks fired around each record.
    pub fn with_hooks(mut self, hooks: Arc<dyn HydrationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn endpoint(&self) -> &Endpoint<E> {
        &self.endpoint
    }

    /// Hydrates `data` into a new entity.
    ///
    /// An empty-string primary-key value is never written. Fails only when
    /// the selected validator cannot be resolved.
    pub fn one(&self, data: RawRecord, options: Options) -> Result<E, MarshalError> {
        let (data, options) = self.prepare(data, options);
        let endpoint = self.endpoint.as_ref();
        debug!(endpoint = endpoint.alias(), fields = data.len(), "Hydrate");

        let errors = validate(endpoint, &data, &options, true)?;
        let mut entity = endpoint.new_entity();
        entity.set_source(endpoint.source());
        apply_accessible_fields(&mut entity, &options);

        let property_map = self.property_map(&data);

        let mut staged = IndexMap::new();
        for (field, value) in &data {
            if has_errors(&errors, field) {
                debug!(endpoint = endpoint.alias(), field = %field, "Rejected by validation");
                entity.set_invalid_field(field, value.clone());
                continue;
            }
            if endpoint.is_primary_key(field) && value.as_str() == Some("") {
                continue;
            }
            staged.insert(field.clone(), coerce(&property_map, field, value));
        }

        self.write(&mut entity, staged, errors, &data, &options);
        Ok(entity)
    }

    /// Hydrates every object in `data`; other values are skipped.
    pub fn many<I>(&self, data: I, options: Options) -> Result<Vec<E>, MarshalError>
    where
        I: IntoIterator<Item = Value>,
    {
        data.into_iter()
            .filter_map(|item| self.record_shaped(item))
            .map(|record| self.one(record, options.clone()))
            .collect()
    }

    /// Applies `data` onto `entity` in place.
    ///
    /// Values equal to what the entity already holds are not written, so they
    /// never show up as modified. Nested entities are always written. For a
    /// persisted entity its primary-key values are added to the validated
    /// payload (incoming values win).
    pub fn merge(&self, entity: &mut E, data: RawRecord, options: Options) -> Result<(), MarshalError> {
        let (data, options) = self.prepare(data, options);
        let endpoint = self.endpoint.as_ref();
        let is_new = entity.is_new();
        debug!(endpoint = endpoint.alias(), fields = data.len(), is_new, "Merge");

        let keys = if is_new {
            IndexMap::new()
        } else {
            entity.extract(endpoint.primary_key())
        };
        let mut payload = data.clone();
        for (field, value) in keys {
            payload.entry(field).or_insert_with(|| value.to_json());
        }
        let errors = validate(endpoint, &payload, &options, is_new)?;
        apply_accessible_fields(entity, &options);
        let property_map = self.property_map(&data);

        let mut staged = IndexMap::new();
        for (field, value) in &data {
            if has_errors(&errors, field) {
                debug!(endpoint = endpoint.alias(), field = %field, "Rejected by validation");
                entity.set_invalid_field(field, value.clone());
                continue;
            }
            let candidate = coerce(&property_map, field, value);
            if is_unchanged(entity.get(field), &candidate) {
                continue;
            }
            staged.insert(field.clone(), candidate);
        }

        self.write(entity, staged, errors, &data, &options);
        Ok(())
    }

    /// Reconciles `entities` with a batch of incoming records.
    ///
    /// Records are matched to entities by composite primary key. Within a key
    /// only the first record counts. Entities without a matching record are
    /// dropped from the output. Unmatched keyed records and keyless records
    /// are hydrated as new entities, after the merged ones.
    pub fn merge_many<I, D>(&self, entities: I, data: D, options: Options) -> Result<Vec<E>, MarshalError>
    where
        I: IntoIterator<Item = E>,
        D: IntoIterator<Item = Value>,
    {
        let endpoint = self.endpoint.as_ref();
        let primary_key = endpoint.primary_key();

        let mut keyed: IndexMap<CompositeKey, RawRecord> = IndexMap::new();
        let mut keyless = Vec::new();
        let mut duplicates = 0usize;
        for record in data.into_iter().filter_map(|item| self.record_shaped(item)) {
            let key = CompositeKey::for_record(&record, primary_key);
            if key.is_empty() {
                keyless.push(record);
                continue;
            }
            match keyed.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(slot) => {
                    duplicates += 1;
                    debug!(endpoint = endpoint.alias(), key = %slot.key(), "Duplicate key discarded");
                }
            }
        }

        let mut output = Vec::new();
        let mut dropped = 0usize;
        for mut entity in entities {
            let key = CompositeKey::for_entity(&entity, primary_key);
            let matched = if key.is_empty() {
                None
            } else {
                keyed.shift_remove(&key)
            };
            let Some(record) = matched else {
                dropped += 1;
                continue;
            };
            self.merge(&mut entity, record, options.clone())?;
            output.push(entity);
        }

        let merged = output.len();
        for record in keyed.into_values().chain(keyless) {
            output.push(self.one(record, options.clone())?);
        }

        info!(
            endpoint = endpoint.alias(),
            merged,
            created = output.len() - merged,
            dropped,
            duplicates,
            "Reconciled batch"
        );
        Ok(output)
    }

    fn prepare(&self, data: RawRecord, mut options: Options) -> (RawRecord, Options) {
        if options.validate.is_none() {
            options.validate = Some(Validate::Default);
        }
        let mut data = unwrap_alias(data, self.endpoint.alias());
        self.hooks.before_hydrate(&mut data, &mut options);
        (data, options)
    }

    fn property_map(&self, data: &RawRecord) -> PropertyMap {
        build_property_map(self.endpoint.schema(), self.endpoint.types(), data)
    }

    fn write(
        &self,
        entity: &mut E,
        mut staged: IndexMap<String, FieldValue>,
        errors: ValidationErrors,
        data: &RawRecord,
        options: &Options,
    ) {
        let Some(field_list) = &options.field_list else {
            entity.set_many(staged);
            entity.set_errors(errors);
            return;
        };

        // Listed fields are written one by one, outside the accessibility guard.
        for field in field_list {
            if let Some(value) = staged.shift_remove(field) {
                entity.set(field, value);
            }
        }
        entity.set_errors(errors);
        self.hooks.after_hydrate(entity, data, options);
    }

    fn record_shaped(&self, item: Value) -> Option<RawRecord> {
        match item {
            Value::Object(record) => Some(record),
            other => {
                debug!(endpoint = self.endpoint.alias(), value = %other, "Skipping non-record input");
                None
            }
        }
    }
}

fn unwrap_alias(mut data: RawRecord, alias: &str) -> RawRecord {
    if matches!(data.get(alias), Some(Value::Object(_))) {
        if let Some(Value::Object(nested)) = data.remove(alias) {
            return nested;
        }
    }
    data
}

fn apply_accessible_fields<E: Entity>(entity: &mut E, options: &Options) {
    if let Some(fields) = &options.accessible_fields {
        for (field, accessible) in fields {
            entity.set_access(field, *accessible);
        }
    }
}

fn has_errors(errors: &ValidationErrors, field: &str) -> bool {
    errors.get(field).is_some_and(|messages| !messages.is_empty())
}

fn coerce(property_map: &PropertyMap, field: &str, value: &Value) -> FieldValue {
    match property_map.get(field) {
        Some(coercer) => coercer(value),
        None => FieldValue::Value(value.clone()),
    }
}

/// Whether writing `candidate` over `original` would be a no-op.
fn is_unchanged(original: Option<&FieldValue>, candidate: &FieldValue) -> bool {
    if candidate.is_entity() {
        return false;
    }
    if candidate.is_null() {
        return original.map_or(true, FieldValue::is_null);
    }
    original == Some(candidate)
}
