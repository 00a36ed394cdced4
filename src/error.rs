//! Error types for the marshalling core.
//!
//! Only configuration problems are errors. Field-level validation failures are
//! recorded on the entity itself (see [`Entity::set_errors`](crate::framework::Entity::set_errors)),
//! and records that are not objects are skipped.

use thiserror::Error;

/// Errors that stop a hydrate or merge call before any field is written.
#[derive(Debug, Error)]
pub enum MarshalError {
    /// The validation mode points at a validator the endpoint cannot provide.
    #[error("Endpoint `{endpoint}` has no usable validator `{validator}`")]
    InvalidValidatorConfiguration { endpoint: String, validator: String },

    /// Options could not be read from their JSON form.
    #[error("Invalid marshal options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}
