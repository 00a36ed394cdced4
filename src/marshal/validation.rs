use tracing::warn;

use crate::endpoint::{Endpoint, DEFAULT_VALIDATOR};
use crate::error::MarshalError;
use crate::framework::Entity;
use crate::model::{Options, RawRecord, Validate, ValidationErrors};

/// Runs the validator selected by `options` over `data`.
///
/// Fields reported with an empty message list are dropped, so every entry of
/// the result is a real failure. Fails before validating when the selected
/// validator does not exist.
pub fn validate<E: Entity>(
    endpoint: &Endpoint<E>,
    data: &RawRecord,
    options: &Options,
    is_new: bool,
) -> Result<ValidationErrors, MarshalError> {
    let mode = options.validate.clone().unwrap_or(Validate::Default);
    let validator = match &mode {
        Validate::Disabled => return Ok(ValidationErrors::new()),
        Validate::Default => endpoint.validator(DEFAULT_VALIDATOR),
        Validate::Named(name) => endpoint.validator(name),
        Validate::Explicit => options.validator.clone(),
    };

    let Some(validator) = validator else {
        warn!(endpoint = endpoint.alias(), validator = %mode, "Validator not available");
        return Err(MarshalError::InvalidValidatorConfiguration {
            endpoint: endpoint.alias().to_string(),
            validator: mode.to_string(),
        });
    };

    let mut errors = validator.validate(data, is_new);
    errors.retain(|_, messages| !messages.is_empty());
    Ok(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockValidator;
    use crate::model::Record;
    use serde_json::json;
    use std::sync::Arc;

    fn endpoint(mock: &MockValidator) -> Endpoint<Record> {
        Endpoint::builder("articles")
            .validator("default", mock.clone())
            .validator("update", |_: &RawRecord, _: bool| {
                let mut errors = ValidationErrors::new();
                errors.insert("title".into(), vec!["named".into()]);
                errors
            })
            .build()
    }

    #[test]
    fn disabled_skips_the_validator() {
        let mock = MockValidator::new();
        let options = Options::new().without_validation();
        let errors = validate(&endpoint(&mock), &RawRecord::new(), &options, true).unwrap();
        assert!(errors.is_empty());
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn unset_mode_uses_the_default_validator() {
        let mock = MockValidator::new();
        mock.expect_validate().return_field_error("title", "required");

        let errors = validate(&endpoint(&mock), &RawRecord::new(), &Options::new(), false).unwrap();
        assert_eq!(errors["title"], vec!["required"]);
        assert!(!mock.calls()[0].is_new);
        mock.verify();
    }

    #[test]
    fn named_mode_resolves_on_the_endpoint() {
        let mock = MockValidator::new();
        let options = Options::new().with_validate(Validate::Named("update".into()));
        let errors = validate(&endpoint(&mock), &RawRecord::new(), &options, true).unwrap();
        assert_eq!(errors["title"], vec!["named"]);
    }

    #[test]
    fn unknown_name_is_a_configuration_error() {
        let mock = MockValidator::new();
        let options = Options::new().with_validate(Validate::Named("missing".into()));
        let err = validate(&endpoint(&mock), &RawRecord::new(), &options, true).unwrap_err();
        assert!(matches!(
            err,
            MarshalError::InvalidValidatorConfiguration { ref validator, .. } if validator == "missing"
        ));
    }

    #[test]
    fn explicit_mode_requires_a_validator_object() {
        let mock = MockValidator::new();
        let options = Options::new().with_validate(Validate::Explicit);
        let result = validate(&endpoint(&mock), &RawRecord::new(), &options, true);
        assert!(matches!(
            result,
            Err(MarshalError::InvalidValidatorConfiguration { .. })
        ));
    }

    #[test]
    fn explicit_validator_receives_the_data() {
        let explicit = MockValidator::new();
        explicit.expect_validate().return_ok();
        let options = Options::new().with_validator(Arc::new(explicit.clone()));

        let mut data = RawRecord::new();
        data.insert("title".into(), json!("x"));
        validate(&endpoint(&MockValidator::new()), &data, &options, true).unwrap();

        assert_eq!(explicit.calls()[0].data, data);
        explicit.verify();
    }

    #[test]
    fn empty_message_lists_are_not_errors() {
        let options = Options::new().with_validator(Arc::new(|_: &RawRecord, _: bool| {
            let mut errors = ValidationErrors::new();
            errors.insert("title".into(), Vec::new());
            errors.insert("body".into(), vec!["required".into()]);
            errors
        }));
        let errors = validate(&endpoint(&MockValidator::new()), &RawRecord::new(), &options, true).unwrap();
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["body"]);
    }
}
