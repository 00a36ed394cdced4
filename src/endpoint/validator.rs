use crate::model::{RawRecord, ValidationErrors};

/// Name under which an endpoint keeps the validator used by `validate: true`.
pub const DEFAULT_VALIDATOR: &str = "default";

/// Checks raw data before it is written to an entity.
///
/// Any `Fn(&RawRecord, bool) -> ValidationErrors` closure is a validator.
pub trait Validator: Send + Sync {
    /// Returns the failing fields. `is_new` tells creation from update.
    fn validate(&self, data: &RawRecord, is_new: bool) -> ValidationErrors;
}

impl<F> Validator for F
where
    F: Fn(&RawRecord, bool) -> ValidationErrors + Send + Sync,
{
    fn validate(&self, data: &RawRecord, is_new: bool) -> ValidationErrors {
        self(data, is_new)
    }
}

/// A validator without rules. Endpoints start with it as their default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRules;

impl Validator for NoRules {
    fn validate(&self, _data: &RawRecord, _is_new: bool) -> ValidationErrors {
        ValidationErrors::new()
    }
}
