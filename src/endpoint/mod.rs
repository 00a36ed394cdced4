//! # Endpoints
//!
//! An [`Endpoint`] describes the collection an entity belongs to: its alias,
//! primary key, column types, validators and the factory that allocates new
//! entities. The marshaller only reads from it.
//!
//! ```
//! use entity_marshal::endpoint::{ColumnSchema, Endpoint};
//! use entity_marshal::model::Record;
//!
//! let articles: Endpoint<Record> = Endpoint::builder("articles")
//!     .primary_key(["id"])
//!     .schema(ColumnSchema::new().column("id", "integer"))
//!     .build();
//! assert_eq!(articles.alias(), "articles");
//! assert_eq!(articles.source(), "articles");
//! ```

pub mod schema;
pub mod types;
pub mod validator;

pub use schema::*;
pub use types::*;
pub use validator::*;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::framework::Entity;

/// Allocates a fresh entity of the endpoint's concrete type.
pub type EntityFactory<E> = Arc<dyn Fn() -> E + Send + Sync>;

/// The schema-bearing collection entities are hydrated into.
pub struct Endpoint<E> {
    alias: String,
    source: String,
    primary_key: Vec<String>,
    schema: Arc<dyn Schema>,
    types: Arc<dyn CoercionRegistry>,
    validators: IndexMap<String, Arc<dyn Validator>>,
    factory: EntityFactory<E>,
}

impl<E: Entity + Default + 'static> Endpoint<E> {
    /// Starts an endpoint whose entities come from `E::default()`.
    pub fn builder(alias: impl Into<String>) -> EndpointBuilder<E> {
        EndpointBuilder::with_factory(alias, E::default)
    }
}

impl<E: Entity> Endpoint<E> {
    /// Name of the collection. Payloads nested under it are unwrapped.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Identity stamped on every entity this endpoint creates.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    pub fn schema(&self) -> &dyn Schema {
        self.schema.as_ref()
    }

    pub fn types(&self) -> &dyn CoercionRegistry {
        self.types.as_ref()
    }

    pub fn is_primary_key(&self, field: &str) -> bool {
        self.primary_key.iter().any(|key| key == field)
    }

    pub fn validator(&self, name: &str) -> Option<Arc<dyn Validator>> {
        self.validators.get(name).cloned()
    }

    pub fn new_entity(&self) -> E {
        (self.factory)()
    }
}

impl<E> fmt::Debug for Endpoint<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("alias", &self.alias)
            .field("source", &self.source)
            .field("primary_key", &self.primary_key)
            .field("validators", &self.validators.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Endpoint`].
///
/// Defaults: primary key `id`, source equal to the alias, an empty schema,
/// [`TypeRegistry::with_defaults`], and [`NoRules`] as the `default` validator.
pub struct EndpointBuilder<E> {
    alias: String,
    source: Option<String>,
    primary_key: Vec<String>,
    schema: Arc<dyn Schema>,
    types: Arc<dyn CoercionRegistry>,
    validators: IndexMap<String, Arc<dyn Validator>>,
    factory: EntityFactory<E>,
}

impl<E: Entity> EndpointBuilder<E> {
    /// Starts an endpoint whose entities come from `factory`.
    pub fn with_factory<F>(alias: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> E + Send + Sync + 'static,
    {
        let mut validators: IndexMap<String, Arc<dyn Validator>> = IndexMap::new();
        validators.insert(DEFAULT_VALIDATOR.to_string(), Arc::new(NoRules));
        Self {
            alias: alias.into(),
            source: None,
            primary_key: vec!["id".to_string()],
            schema: Arc::new(ColumnSchema::new()),
            types: Arc::new(TypeRegistry::with_defaults()),
            validators,
            factory: Arc::new(factory),
        }
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn primary_key<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn schema(mut self, schema: impl Schema + 'static) -> Self {
        self.schema = Arc::new(schema);
        self
    }

    pub fn types(mut self, types: impl CoercionRegistry + 'static) -> Self {
        self.types = Arc::new(types);
        self
    }

    /// Registers `validator` under `name`; `"default"` replaces [`NoRules`].
    pub fn validator(mut self, name: impl Into<String>, validator: impl Validator + 'static) -> Self {
        self.validators.insert(name.into(), Arc::new(validator));
        self
    }

    pub fn build(self) -> Endpoint<E> {
        let source = self.source.unwrap_or_else(|| self.alias.clone());
        Endpoint {
            alias: self.alias,
            source,
            primary_key: self.primary_key,
            schema: self.schema,
            types: self.types,
            validators: self.validators,
            factory: self.factory,
        }
    }
}
