//! # Entity Marshal Demo
//!
//! Reconciles a batch of incoming article records with the articles that
//! already exist:
//! 1.  Builds an `articles` endpoint with a schema and a default validator.
//! 2.  Loads three persisted articles.
//! 3.  Runs `merge_many` with an update, a new keyed article, a duplicate and
//!     a keyless draft, then prints what came out.

use std::sync::Arc;

use entity_marshal::endpoint::{ColumnSchema, Endpoint};
use entity_marshal::framework::Entity;
use entity_marshal::marshal::Marshaller;
use entity_marshal::model::{Options, RawRecord, Record, ValidationErrors};
use entity_marshal::runtime::setup_tracing;
use serde_json::{json, Value};
use tracing::info;

fn require_title(data: &RawRecord, is_new: bool) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    let title = data.get("title").and_then(Value::as_str);
    let missing = match title {
        Some(title) => title.trim().is_empty(),
        None => is_new,
    };
    if missing {
        errors.insert("title".to_string(), vec!["Title is required".to_string()]);
    }
    errors
}

fn persisted(value: Value) -> Record {
    match value {
        Value::Object(values) => Record::persisted(values),
        _ => Record::new(),
    }
}

fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let articles = Endpoint::builder("articles")
        .schema(
            ColumnSchema::new()
                .column("id", "integer")
                .column("title", "string")
                .column("rating", "float")
                .column("published", "boolean"),
        )
        .validator("default", require_title)
        .build();
    let marshaller: Marshaller<Record> = Marshaller::new(Arc::new(articles));

    let existing = vec![
        persisted(json!({"id": 1, "title": "Intro", "rating": 4.0, "published": true})),
        persisted(json!({"id": 2, "title": "Ownership", "rating": 4.5, "published": false})),
        persisted(json!({"id": 3, "title": "Lifetimes", "rating": 3.5, "published": true})),
    ];
    let incoming = vec![
        json!({"id": "2", "title": "Ownership", "rating": "4.5", "published": "1"}),
        json!({"id": "4", "title": "Traits", "rating": "5"}),
        json!({"id": "2", "title": "Ignored duplicate"}),
        json!({"title": "", "rating": "2"}),
    ];

    let span = tracing::info_span!("reconcile");
    let output = span
        .in_scope(|| marshaller.merge_many(existing, incoming, Options::new()))
        .map_err(|e| e.to_string())?;

    for entity in &output {
        let summary = json!({
            "new": entity.is_new(),
            "values": entity.to_json(),
            "dirty": entity.dirty_fields(),
            "errors": entity.errors(),
            "invalid": entity.invalid_fields(),
        });
        info!(entity = %summary, "Reconciled entity");
    }

    info!(count = output.len(), "Demo completed successfully");
    Ok(())
}
