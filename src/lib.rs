//! # Entity Marshal
//!
//! > **Hydration, merging and batch reconciliation of schema-described entities.**
//!
//! This crate turns untyped, externally supplied records (JSON objects) into
//! typed entities of an endpoint, applies further records onto existing
//! entities without producing spurious changes, and reconciles whole batches
//! of records with the entities that already exist.
//!
//! ## 🏗️ Design Philosophy
//!
//! The marshaller owns the pipeline, and everything around it is a narrow,
//! replaceable collaborator:
//! - **Schema** says which type a field is declared as.
//! - **Coercion registry** turns a raw value into that type's canonical form.
//! - **Validator** reports per-field errors for a record.
//! - **Hooks** may rewrite a record before it is processed.
//! - **Entity** is any type implementing the [`Entity`](framework::Entity) capability set.
//!
//! Validation failures never stop a record. They end up on the entity, next
//! to the raw values that were rejected. The only hard error is a
//! misconfigured validator, which surfaces before any field is written.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`marshal`])
//! - **Role**: The single-record pipeline and batch reconciliation.
//! - **Key items**: [`Marshaller`](marshal::Marshaller), [`CompositeKey`](marshal::CompositeKey).
//!
//! ### 2. The Collection ([`endpoint`])
//! - **Role**: Alias, primary key, schema, type coercion and validators of an entity collection.
//! - **Key items**: [`Endpoint`](endpoint::Endpoint), [`TypeRegistry`](endpoint::TypeRegistry).
//!
//! ### 3. The Contracts ([`framework`])
//! - **Role**: What the marshaller needs from entities and listeners.
//! - **Key items**: [`Entity`](framework::Entity), [`HydrationHooks`](framework::HydrationHooks).
//!
//! ### 4. The Data ([`model`])
//! - **Role**: Raw records, field values, the stock [`Record`](model::Record) entity and [`Options`](model::Options).
//!
//! ## 🚀 Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use entity_marshal::endpoint::{ColumnSchema, Endpoint};
//! use entity_marshal::framework::Entity;
//! use entity_marshal::marshal::Marshaller;
//! use entity_marshal::model::{Options, Record};
//! use serde_json::json;
//!
//! let articles = Endpoint::builder("articles")
//!     .schema(ColumnSchema::new().column("id", "integer").column("published", "boolean"))
//!     .build();
//! let marshaller: Marshaller<Record> = Marshaller::new(Arc::new(articles));
//!
//! let serde_json::Value::Object(data) = json!({"id": "7", "published": "1"}) else {
//!     unreachable!()
//! };
//! let article = marshaller.one(data, Options::new())?;
//! assert_eq!(article.to_json(), json!({"id": 7, "published": true}));
//! assert_eq!(article.source(), Some("articles"));
//! # Ok::<(), entity_marshal::error::MarshalError>(())
//! ```
//!
//! ### Running the Demo
//!
//! ```bash
//! RUST_LOG=debug cargo run
//! ```

pub mod endpoint;
pub mod error;
pub mod framework;
pub mod marshal;
pub mod model;
pub mod runtime;
