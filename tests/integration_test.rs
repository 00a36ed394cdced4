use std::sync::Arc;

use entity_marshal::endpoint::{ColumnSchema, Endpoint, EndpointBuilder, TypeRegistry};
use entity_marshal::error::MarshalError;
use entity_marshal::framework::mock::{HookEvent, MockValidator, RecordingHooks};
use entity_marshal::framework::Entity;
use entity_marshal::marshal::Marshaller;
use entity_marshal::model::{FieldValue, Options, RawRecord, Record, Validate, ValidationErrors};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn raw(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be an object, got {other}"),
    }
}

fn article_schema() -> ColumnSchema {
    ColumnSchema::new()
        .column("id", "integer")
        .column("title", "string")
        .column("rating", "float")
        .column("published", "boolean")
}

fn articles(validator: &MockValidator) -> Marshaller<Record> {
    let endpoint = Endpoint::builder("articles")
        .schema(article_schema())
        .validator("default", validator.clone())
        .build();
    Marshaller::new(Arc::new(endpoint))
}

fn untyped() -> Marshaller<Record> {
    Marshaller::new(Arc::new(Endpoint::builder("notes").build()))
}

// ── one ──────────────────────────────────────────────────────────

#[test]
fn untyped_record_hydrates_verbatim() {
    let data = raw(json!({"title": "Hello", "tags": ["a", "b"], "meta": {"x": 1}, "n": null}));
    let entity = untyped().one(data.clone(), Options::new()).unwrap();

    assert_eq!(entity.to_json(), Value::Object(data));
    assert!(entity.errors().is_empty());
    assert!(entity.is_new());
    assert_eq!(entity.source(), Some("notes"));
}

#[test]
fn typed_fields_are_coerced() {
    let validator = MockValidator::new();
    validator.expect_validate().return_ok();

    let entity = articles(&validator)
        .one(
            raw(json!({"id": "12", "title": 5, "rating": "4.5", "published": "no", "extra": "raw"})),
            Options::new(),
        )
        .unwrap();

    assert_eq!(
        entity.to_json(),
        json!({"id": 12, "title": "5", "rating": 4.5, "published": false, "extra": "raw"})
    );
    validator.verify();
}

#[test]
fn invalid_field_is_marked_but_never_written() {
    let validator = MockValidator::new();
    validator.expect_validate().return_field_error("title", "Title is required");

    let entity = articles(&validator)
        .one(raw(json!({"title": "", "rating": "3"})), Options::new())
        .unwrap();

    assert_eq!(entity.get("title"), None);
    assert_eq!(entity.invalid_field("title"), Some(&json!("")));
    assert_eq!(entity.get("rating"), Some(&FieldValue::from(json!(3.0))));
    assert_eq!(entity.errors()["title"], vec!["Title is required"]);
    assert!(validator.calls()[0].is_new);
}

#[test]
fn empty_primary_key_is_never_set() {
    let validator = MockValidator::new();
    validator.expect_validate().return_ok();

    let entity = articles(&validator)
        .one(raw(json!({"id": "", "title": "Draft"})), Options::new())
        .unwrap();

    assert_eq!(entity.get("id"), None);
    assert!(!entity.is_dirty("id"));
    assert_eq!(entity.to_json(), json!({"title": "Draft"}));
}

#[test]
fn alias_wrapped_payload_is_unwrapped() {
    let wrapped = untyped()
        .one(raw(json!({"notes": {"title": "Inner"}})), Options::new())
        .unwrap();
    let plain = untyped().one(raw(json!({"title": "Inner"})), Options::new()).unwrap();

    assert_eq!(wrapped.to_json(), plain.to_json());
}

#[test]
fn field_list_restricts_writes() {
    let options = Options::new().with_field_list(["title"]);
    let entity = untyped()
        .one(raw(json!({"title": "Kept", "body": "Dropped"})), options)
        .unwrap();

    assert_eq!(entity.to_json(), json!({"title": "Kept"}));
}

#[test]
fn accessible_fields_guard_bulk_writes() {
    let options = Options::new().with_accessible_fields([("id", false)]);
    let entity = untyped()
        .one(raw(json!({"id": 9, "title": "Open"})), options)
        .unwrap();

    assert_eq!(entity.get("id"), None);
    assert_eq!(entity.to_json(), json!({"title": "Open"}));
}

#[test]
fn field_list_writes_past_the_accessibility_guard() {
    let options = Options::new()
        .with_accessible_fields([("id", false)])
        .with_field_list(["id"]);
    let entity = untyped().one(raw(json!({"id": 9})), options).unwrap();

    assert_eq!(entity.get("id"), Some(&FieldValue::from(json!(9))));
}

#[test]
fn missing_validator_fails_before_anything_is_written() {
    let options = Options::new().with_validate(Validate::Named("strict".into()));
    let err = untyped().one(raw(json!({"title": "x"})), options).unwrap_err();

    match err {
        MarshalError::InvalidValidatorConfiguration { endpoint, validator } => {
            assert_eq!(endpoint, "notes");
            assert_eq!(validator, "strict");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn disabled_validation_never_calls_the_validator() {
    let validator = MockValidator::new();
    let entity = articles(&validator)
        .one(raw(json!({"title": "x"})), Options::new().without_validation())
        .unwrap();

    assert_eq!(entity.to_json(), json!({"title": "x"}));
    assert!(validator.calls().is_empty());
}

// ── hooks ────────────────────────────────────────────────────────

#[test]
fn before_hook_rewrites_are_validated_and_coerced() {
    let validator = MockValidator::new();
    validator.expect_validate().return_ok();
    let hooks = Arc::new(RecordingHooks::rewriting(|data, options| {
        data.insert("rating".into(), json!("2.5"));
        options.field_list = Some(vec!["rating".into()]);
    }));

    let entity = articles(&validator)
        .with_hooks(hooks.clone())
        .one(raw(json!({"title": "Hooked"})), Options::new())
        .unwrap();

    assert_eq!(entity.to_json(), json!({"rating": 2.5}));
    assert_eq!(validator.calls()[0].data, raw(json!({"title": "Hooked", "rating": "2.5"})));
    // The hook turned on a field list, so the after-hook fired too.
    assert_eq!(hooks.after_count(), 1);
}

#[test]
fn after_hook_fires_only_with_a_field_list() {
    let hooks = Arc::new(RecordingHooks::new());
    let marshaller = untyped().with_hooks(hooks.clone());

    marshaller.one(raw(json!({"title": "a"})), Options::new()).unwrap();
    assert_eq!(hooks.after_count(), 0);

    marshaller
        .one(raw(json!({"title": "b"})), Options::new().with_field_list(["title"]))
        .unwrap();
    assert_eq!(hooks.after_count(), 1);

    let events = hooks.events();
    assert_eq!(events.len(), 3);
    assert_eq!(
        events[2],
        HookEvent::AfterHydrate {
            data: raw(json!({"title": "b"})),
            source: Some("notes".into()),
            errors: ValidationErrors::new(),
        }
    );
}

// ── merge ────────────────────────────────────────────────────────

#[test]
fn unchanged_values_are_not_marked_dirty() {
    let validator = MockValidator::new();
    validator.expect_validate().return_ok();
    let mut entity = Record::persisted(raw(
        json!({"id": 1, "title": "Same", "rating": 4.5, "published": true, "note": null}),
    ));

    articles(&validator)
        .merge(
            &mut entity,
            raw(json!({"title": "Same", "rating": "4.5", "published": "1", "note": null, "gone": null})),
            Options::new(),
        )
        .unwrap();

    assert!(entity.dirty_fields().is_empty());
}

#[test]
fn changed_scalar_is_marked_dirty() {
    let validator = MockValidator::new();
    validator.expect_validate().return_ok();
    let mut entity = Record::persisted(raw(json!({"id": 1, "title": "Old", "rating": 4.5})));

    articles(&validator)
        .merge(&mut entity, raw(json!({"title": "New", "rating": "4.5"})), Options::new())
        .unwrap();

    assert_eq!(entity.dirty_fields(), vec!["title"]);
    assert_eq!(entity.get("title"), Some(&FieldValue::from(json!("New"))));
}

#[test]
fn equal_composites_are_suppressed() {
    let mut entity = Record::persisted(raw(json!({"id": 1, "tags": ["a", "b"], "meta": {"k": 1}})));

    untyped()
        .merge(
            &mut entity,
            raw(json!({"tags": ["a", "b"], "meta": {"k": 2}})),
            Options::new(),
        )
        .unwrap();

    assert_eq!(entity.dirty_fields(), vec!["meta"]);
}

#[test]
fn nested_entities_are_always_written() {
    let types = TypeRegistry::with_defaults().with("author", |value: &Value| {
        let mut author = Record::new();
        author.set("name", FieldValue::from(value.clone()));
        FieldValue::from(author)
    });
    let endpoint = Endpoint::builder("posts")
        .schema(ColumnSchema::new().column("author", "author"))
        .types(types)
        .build();
    let marshaller: Marshaller<Record> = Marshaller::new(Arc::new(endpoint));

    let mut entity = marshaller.one(raw(json!({"id": 1, "author": "Ada"})), Options::new()).unwrap();
    entity.set_new(false);
    entity.clean();

    marshaller
        .merge(&mut entity, raw(json!({"author": "Ada"})), Options::new())
        .unwrap();

    assert_eq!(entity.dirty_fields(), vec!["author"]);
    assert_eq!(entity.to_json(), json!({"id": 1, "author": {"name": "Ada"}}));
}

#[test]
fn persisted_keys_are_folded_into_validation() {
    let validator = MockValidator::new();
    validator.expect_validate().return_ok();
    let mut entity = Record::persisted(raw(json!({"id": 8, "title": "Old"})));

    articles(&validator)
        .merge(&mut entity, raw(json!({"title": "New"})), Options::new())
        .unwrap();

    let call = &validator.calls()[0];
    assert!(!call.is_new);
    assert_eq!(call.data, raw(json!({"title": "New", "id": 8})));
}

#[test]
fn incoming_key_wins_over_persisted_key_in_validation() {
    let validator = MockValidator::new();
    validator.expect_validate().return_ok();
    let mut entity = Record::persisted(raw(json!({"id": 8})));

    articles(&validator)
        .merge(&mut entity, raw(json!({"id": "9"})), Options::new())
        .unwrap();

    assert_eq!(validator.calls()[0].data, raw(json!({"id": "9"})));
}

#[test]
fn new_entity_merge_validates_without_keys() {
    let validator = MockValidator::new();
    validator.expect_validate().return_ok();
    let mut entity = Record::new();
    entity.set("id", FieldValue::from(json!(3)));

    articles(&validator)
        .merge(&mut entity, raw(json!({"title": "t"})), Options::new())
        .unwrap();

    let call = &validator.calls()[0];
    assert!(call.is_new);
    assert_eq!(call.data, raw(json!({"title": "t"})));
}

#[test]
fn merge_marks_rejected_fields_and_mirrors_errors() {
    let validator = MockValidator::new();
    let mut errors = ValidationErrors::new();
    errors.insert("title".into(), vec!["too long".into()]);
    validator.expect_validate().return_errors(errors.clone());
    let mut entity = Record::persisted(raw(json!({"id": 1, "title": "Old"})));

    articles(&validator)
        .merge(&mut entity, raw(json!({"title": "x".repeat(300)})), Options::new())
        .unwrap();

    assert_eq!(entity.get("title"), Some(&FieldValue::from(json!("Old"))));
    assert!(entity.invalid_field("title").is_some());
    assert_eq!(entity.errors(), &errors);
}

#[test]
fn merge_failure_leaves_entity_untouched() {
    let mut entity = Record::persisted(raw(json!({"id": 1, "title": "Old"})));
    let before = entity.clone();

    let result = untyped().merge(
        &mut entity,
        raw(json!({"title": "New"})),
        Options::new().with_validate(Validate::Explicit),
    );

    assert!(result.is_err());
    assert_eq!(entity, before);
}

#[test]
fn merge_failure_keeps_accessibility_flags() {
    let mut entity = Record::persisted(raw(json!({"id": 1, "title": "Old"})));
    let before = entity.clone();
    let options = Options::new()
        .with_validate(Validate::Named("missing".into()))
        .with_accessible_fields([("title", false)]);

    let result = untyped().merge(&mut entity, raw(json!({"title": "New"})), options);

    assert!(result.is_err());
    assert!(entity.is_accessible("title"));
    assert_eq!(entity, before);
}

/// `merge` has no empty-key guard, so an empty key `one` skipped is written
/// on the way back.
#[test]
fn merge_writes_empty_primary_key_that_one_skipped() {
    let marshaller = untyped();
    let data = raw(json!({"id": "", "title": "Draft"}));

    let mut entity = marshaller.one(data.clone(), Options::new()).unwrap();
    assert_eq!(entity.get("id"), None);
    entity.clean();

    marshaller.merge(&mut entity, data, Options::new()).unwrap();

    assert_eq!(entity.dirty_fields(), vec!["id"]);
    assert_eq!(entity.get("id"), Some(&FieldValue::from(json!(""))));
}

#[test]
fn hydrate_then_merge_round_trip_changes_nothing() {
    let validator = MockValidator::new();
    validator.expect_validate().return_ok();
    validator.expect_validate().return_ok();
    let marshaller = articles(&validator);
    let data = raw(json!({"id": "5", "title": "Round", "rating": "3.25", "published": "yes", "x": [1]}));

    let mut entity = marshaller.one(data.clone(), Options::new()).unwrap();
    entity.clean();
    marshaller.merge(&mut entity, data, Options::new()).unwrap();

    assert!(entity.dirty_fields().is_empty());
    validator.verify();
}

// ── many ─────────────────────────────────────────────────────────

#[test]
fn many_skips_non_records_and_keeps_order() {
    let entities = untyped()
        .many(
            vec![json!({"n": 1}), json!("nope"), json!(null), json!([1]), json!({"n": 2})],
            Options::new(),
        )
        .unwrap();

    let values: Vec<Value> = entities.iter().map(Record::to_json).collect();
    assert_eq!(values, vec![json!({"n": 1}), json!({"n": 2})]);
}

// ── custom entities ──────────────────────────────────────────────

/// An entity that keeps no invalid-field markers.
#[derive(Debug, Default)]
struct Plain {
    values: IndexMap<String, FieldValue>,
    errors: ValidationErrors,
    source: Option<String>,
    persisted: bool,
}

impl Entity for Plain {
    fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }
    fn set(&mut self, field: &str, value: FieldValue) {
        self.values.insert(field.to_string(), value);
    }
    fn is_new(&self) -> bool {
        !self.persisted
    }
    fn set_new(&mut self, new: bool) {
        self.persisted = !new;
    }
    fn set_access(&mut self, _field: &str, _accessible: bool) {}
    fn is_accessible(&self, _field: &str) -> bool {
        true
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
}

#[test]
fn custom_entities_come_from_the_factory() {
    let endpoint = EndpointBuilder::with_factory("plain", Plain::default)
        .source("registry.plain")
        .validator("default", |data: &RawRecord, _: bool| {
            let mut errors = ValidationErrors::new();
            if data.contains_key("bad") {
                errors.insert("bad".into(), vec!["rejected".into()]);
            }
            errors
        })
        .build();
    let marshaller = Marshaller::new(Arc::new(endpoint));

    let entity = marshaller.one(raw(json!({"ok": 1, "bad": 2})), Options::new()).unwrap();

    assert_eq!(entity.source(), Some("registry.plain"));
    assert_eq!(entity.get("ok"), Some(&FieldValue::from(json!(1))));
    assert_eq!(entity.get("bad"), None);
    assert_eq!(entity.errors()["bad"], vec!["rejected"]);
}

#[test]
fn options_from_json_drive_hydration() {
    let options = Options::from_json(
        r#"{"validate": false, "fieldList": ["title"], "accessibleFields": {"*": false}}"#,
    )
    .unwrap();
    let entity = untyped()
        .one(raw(json!({"title": "Listed", "body": "Not listed"})), options)
        .unwrap();

    assert_eq!(entity.to_json(), json!({"title": "Listed"}));
    assert!(!entity.is_accessible("body"));
}
