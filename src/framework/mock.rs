//! # Mock Collaborators
//!
//! Utilities for testing marshalling without real validation rules or
//! event listeners.
//!
//! - [`MockValidator`] answers `validate` calls from a queue of scripted
//!   results and records every call it receives.
//! - [`RecordingHooks`] records hook invocations and can rewrite the
//!   before-hook payload.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use entity_marshal::framework::mock::MockValidator;
//! use entity_marshal::endpoint::Validator;
//! use entity_marshal::model::RawRecord;
//!
//! let mock = MockValidator::new();
//! mock.expect_validate().return_field_error("title", "required");
//!
//! let validator: Arc<dyn Validator> = Arc::new(mock.clone());
//! let errors = validator.validate(&RawRecord::new(), true);
//! assert_eq!(errors["title"], vec!["required".to_string()]);
//!
//! mock.verify(); // Ensures all expectations were met
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::endpoint::Validator;
use crate::framework::{Entity, HydrationHooks};
use crate::model::{Options, RawRecord, ValidationErrors};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// SCRIPTED VALIDATOR
// =============================================================================

/// One `validate` call seen by a [`MockValidator`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationCall {
    pub data: RawRecord,
    pub is_new: bool,
}

/// A validator with expectation tracking for fluent testing.
///
/// Each `validate` call consumes the next expectation. A call with no
/// expectation left panics, as does [`MockValidator::verify`] when
/// expectations remain unused. Clones share their queue and call log.
#[derive(Clone, Default)]
pub struct MockValidator {
    expectations: Arc<Mutex<VecDeque<ValidationErrors>>>,
    calls: Arc<Mutex<Vec<ValidationCall>>>,
}

impl MockValidator {
    /// Creates a new mock validator with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects one more `validate` call.
    pub fn expect_validate(&self) -> ValidateExpectationBuilder {
        ValidateExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Calls received so far, oldest first.
    pub fn calls(&self) -> Vec<ValidationCall> {
        lock(&self.calls).clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = lock(&self.expectations).len();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

impl Validator for MockValidator {
    fn validate(&self, data: &RawRecord, is_new: bool) -> ValidationErrors {
        lock(&self.calls).push(ValidationCall {
            data: data.clone(),
            is_new,
        });
        match lock(&self.expectations).pop_front() {
            Some(errors) => errors,
            None => panic!("Unexpected validate call for {:?}", data),
        }
    }
}

/// Builder for `validate` expectations.
pub struct ValidateExpectationBuilder {
    expectations: Arc<Mutex<VecDeque<ValidationErrors>>>,
}

impl ValidateExpectationBuilder {
    /// The call reports no errors.
    pub fn return_ok(self) {
        self.return_errors(ValidationErrors::new());
    }

    /// The call reports `errors`.
    pub fn return_errors(self, errors: ValidationErrors) {
        lock(&self.expectations).push_back(errors);
    }

    /// The call reports a single message for a single field.
    pub fn return_field_error(self, field: &str, message: &str) {
        let mut errors = ValidationErrors::new();
        errors.insert(field.to_string(), vec![message.to_string()]);
        self.return_errors(errors);
    }
}

// =============================================================================
// RECORDING HOOKS
// =============================================================================

/// A hook invocation seen by [`RecordingHooks`].
#[derive(Debug, Clone, PartialEq)]
pub enum HookEvent {
    BeforeHydrate {
        data: RawRecord,
    },
    AfterHydrate {
        data: RawRecord,
        source: Option<String>,
        errors: ValidationErrors,
    },
}

type Rewrite = Box<dyn Fn(&mut RawRecord, &mut Options) + Send + Sync>;

/// Hooks that log every invocation.
///
/// Built with [`RecordingHooks::rewriting`], the before-hook also applies a
/// rewrite to the payload, standing in for a listener that alters input.
#[derive(Default)]
pub struct RecordingHooks {
    events: Mutex<Vec<HookEvent>>,
    rewrite: Option<Rewrite>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rewriting<F>(rewrite: F) -> Self
    where
        F: Fn(&mut RawRecord, &mut Options) + Send + Sync + 'static,
    {
        Self {
            events: Mutex::new(Vec::new()),
            rewrite: Some(Box::new(rewrite)),
        }
    }

    pub fn events(&self) -> Vec<HookEvent> {
        lock(&self.events).clone()
    }

    pub fn after_count(&self) -> usize {
        lock(&self.events)
            .iter()
            .filter(|event| matches!(event, HookEvent::AfterHydrate { .. }))
            .count()
    }
}

impl HydrationHooks for RecordingHooks {
    fn before_hydrate(&self, data: &mut RawRecord, options: &mut Options) {
        // Recorded as received, before any rewrite.
        lock(&self.events).push(HookEvent::BeforeHydrate { data: data.clone() });
        if let Some(rewrite) = &self.rewrite {
            rewrite(data, options);
        }
    }

    fn after_hydrate(&self, entity: &mut dyn Entity, data: &RawRecord, _options: &Options) {
        lock(&self.events).push(HookEvent::AfterHydrate {
            data: data.clone(),
            source: entity.source().map(str::to_string),
            errors: entity.errors().clone(),
        });
    }
}
