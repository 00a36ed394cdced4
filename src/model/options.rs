//! Per-call marshalling options.
//!
//! Options can be built in code or read from JSON:
//!
//! ```json
//! { "validate": "update", "fieldList": ["title", "body"], "accessibleFields": {"id": false} }
//! ```
//!
//! `validate` accepts `true` (the endpoint's default validator), `false`
//! (no validation) or a validator name. An explicit validator object can only
//! be supplied in code, see [`Options::with_validator`].

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::endpoint::Validator;
use crate::error::MarshalError;

/// Which validator runs before fields are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validate {
    /// Skip validation entirely.
    Disabled,
    /// The endpoint's `default` validator.
    Default,
    /// A validator registered on the endpoint under this name.
    Named(String),
    /// The validator carried in [`Options::validator`].
    Explicit,
}

impl fmt::Display for Validate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validate::Disabled => write!(f, "disabled"),
            Validate::Default => write!(f, "default"),
            Validate::Named(name) => write!(f, "{name}"),
            Validate::Explicit => write!(f, "explicit"),
        }
    }
}

impl<'de> Deserialize<'de> for Validate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Name(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Flag(true) => Validate::Default,
            Repr::Flag(false) => Validate::Disabled,
            Repr::Name(name) => Validate::Named(name),
        })
    }
}

/// Options for [`Marshaller`](crate::marshal::Marshaller) calls.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Validation mode. Unset means [`Validate::Default`].
    pub validate: Option<Validate>,
    /// When set, only these fields are written to the entity.
    pub field_list: Option<Vec<String>>,
    /// Accessibility flags applied to the entity before any write.
    pub accessible_fields: Option<IndexMap<String, bool>>,
    /// Used when `validate` is [`Validate::Explicit`].
    #[serde(skip)]
    pub validator: Option<Arc<dyn Validator>>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, MarshalError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: Value) -> Result<Self, MarshalError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn with_validate(mut self, validate: Validate) -> Self {
        self.validate = Some(validate);
        self
    }

    pub fn without_validation(self) -> Self {
        self.with_validate(Validate::Disabled)
    }

    pub fn with_field_list<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_list = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_accessible_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        self.accessible_fields = Some(
            fields
                .into_iter()
                .map(|(field, accessible)| (field.into(), accessible))
                .collect(),
        );
        self
    }

    /// Validates with `validator` instead of one registered on the endpoint.
    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validate = Some(Validate::Explicit);
        self.validator = Some(validator);
        self
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("validate", &self.validate)
            .field("field_list", &self.field_list)
            .field("accessible_fields", &self.accessible_fields)
            .field("validator", &self.validator.as_ref().map(|_| "<validator>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn reads_validate_modes_from_json() {
        let on = Options::from_value(json!({"validate": true})).unwrap();
        assert_eq!(on.validate, Some(Validate::Default));

        let off = Options::from_value(json!({"validate": false})).unwrap();
        assert_eq!(off.validate, Some(Validate::Disabled));

        let named = Options::from_value(json!({"validate": "update"})).unwrap();
        assert_eq!(named.validate, Some(Validate::Named("update".into())));

        let unset = Options::from_json("{}").unwrap();
        assert_eq!(unset.validate, None);
    }

    #[test]
    fn reads_field_list_and_accessible_fields() {
        let options = Options::from_json(
            r#"{"fieldList": ["title", "body"], "accessibleFields": {"id": false, "*": true}}"#,
        )
        .unwrap();

        assert_eq!(
            options.field_list,
            Some(vec!["title".to_string(), "body".to_string()])
        );
        let accessible = options.accessible_fields.unwrap();
        assert_eq!(
            accessible.into_iter().collect::<Vec<_>>(),
            vec![("id".to_string(), false), ("*".to_string(), true)]
        );
    }

    #[test]
    fn rejects_malformed_options() {
        let result = Options::from_value(json!({"validate": 3}));
        assert!(matches!(result, Err(MarshalError::InvalidOptions(_))));
    }

    #[test]
    fn with_validator_switches_to_explicit() {
        let validator: Arc<dyn Validator> = Arc::new(crate::endpoint::NoRules);
        let options = Options::new().with_validator(validator);
        assert_eq!(options.validate, Some(Validate::Explicit));
        assert!(options.validator.is_some());
    }
}
