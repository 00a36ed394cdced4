//! Type coercion: turning raw values into the canonical form of a column type.
//!
//! [`TypeRegistry::with_defaults`] knows the common column types:
//!
//! | Type names | Coercion |
//! |------------|----------|
//! | `string`, `text`, `char` | scalars become text, composites pass through |
//! | `uuid` | as `string`, and `""` becomes null |
//! | `integer`, `biginteger`, `smallinteger`, `tinyinteger` | numbers and numeric text, truncated; booleans as 1/0 |
//! | `float`, `decimal` | numbers and numeric text as floating point |
//! | `boolean` | booleans, `1/0`, `true/false`, `on/off`, `yes/no`, numbers as `!= 0` |
//! | `json` | unchanged |
//!
//! Numeric and boolean types map null, `""` and anything unparseable to null.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::model::FieldValue;

/// Converts a raw value to a column type's canonical representation.
pub type Coercer = Arc<dyn Fn(&Value) -> FieldValue + Send + Sync>;

/// Looks up the coercer for a declared type name.
pub trait CoercionRegistry: Send + Sync {
    /// `None` for types the registry does not know.
    fn coercer_for(&self, type_name: &str) -> Option<Coercer>;
}

/// A [`CoercionRegistry`] keyed by type name.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    coercers: HashMap<String, Coercer>,
}

impl TypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in column types.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for name in ["string", "text", "char"] {
            registry.register(name, marshal_string);
        }
        registry.register("uuid", marshal_uuid);
        for name in ["integer", "biginteger", "smallinteger", "tinyinteger"] {
            registry.register(name, marshal_integer);
        }
        for name in ["float", "decimal"] {
            registry.register(name, marshal_float);
        }
        registry.register("boolean", marshal_boolean);
        registry.register("json", |value: &Value| FieldValue::Value(value.clone()));
        registry
    }

    /// Adds or replaces the coercer for `type_name`.
    pub fn register<F>(&mut self, type_name: impl Into<String>, coercer: F)
    where
        F: Fn(&Value) -> FieldValue + Send + Sync + 'static,
    {
        self.coercers.insert(type_name.into(), Arc::new(coercer));
    }

    /// Builder form of [`TypeRegistry::register`].
    pub fn with<F>(mut self, type_name: impl Into<String>, coercer: F) -> Self
    where
        F: Fn(&Value) -> FieldValue + Send + Sync + 'static,
    {
        self.register(type_name, coercer);
        self
    }
}

impl CoercionRegistry for TypeRegistry {
    fn coercer_for(&self, type_name: &str) -> Option<Coercer> {
        self.coercers.get(type_name).cloned()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.coercers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TypeRegistry").field("types", &names).finish()
    }
}

fn marshal_string(value: &Value) -> FieldValue {
    let coerced = match value {
        Value::Number(number) => Value::String(number.to_string()),
        Value::Bool(flag) => Value::String(flag.to_string()),
        other => other.clone(),
    };
    FieldValue::Value(coerced)
}

fn marshal_uuid(value: &Value) -> FieldValue {
    match value {
        Value::String(text) if text.is_empty() => FieldValue::null(),
        other => marshal_string(other),
    }
}

fn marshal_integer(value: &Value) -> FieldValue {
    let coerced = match value {
        Value::Number(number) => number
            .as_i64()
            .map(Value::from)
            .or_else(|| number.as_u64().map(Value::from))
            .or_else(|| number.as_f64().map(truncate)),
        Value::String(text) => parse_integer(text.trim()),
        Value::Bool(flag) => Some(Value::from(i64::from(*flag))),
        _ => None,
    };
    FieldValue::Value(coerced.unwrap_or(Value::Null))
}

fn parse_integer(text: &str) -> Option<Value> {
    if let Ok(integer) = text.parse::<i64>() {
        return Some(Value::from(integer));
    }
    parse_finite(text).map(truncate)
}

fn truncate(float: f64) -> Value {
    Value::from(float.trunc() as i64)
}

fn marshal_float(value: &Value) -> FieldValue {
    let coerced = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_finite(text.trim()),
        _ => None,
    };
    FieldValue::Value(coerced.map(Value::from).unwrap_or(Value::Null))
}

fn parse_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|float| float.is_finite())
}

fn marshal_boolean(value: &Value) -> FieldValue {
    let coerced = match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_f64().map(|n| n != 0.0),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Some(true),
            "0" | "false" | "off" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    };
    FieldValue::Value(coerced.map(Value::Bool).unwrap_or(Value::Null))
}
