//! # Hydration Hooks
//!
//! Lifecycle notifications fired at the single-record boundary.
//!
//! - [`HydrationHooks::before_hydrate`] runs after the payload has been
//!   unwrapped and before validation or coercion. It receives the record and
//!   the options by `&mut`; whatever it leaves behind is what gets processed.
//! - [`HydrationHooks::after_hydrate`] runs once the entity has been written,
//!   but only for calls that carry a field list.
//!
//! Both methods default to doing nothing, so an implementation only overrides
//! what it needs.

use crate::framework::Entity;
use crate::model::{Options, RawRecord};

/// Callbacks injected into a [`Marshaller`](crate::marshal::Marshaller).
pub trait HydrationHooks: Send + Sync {
    /// May rewrite `data` and `options` before they are used.
    fn before_hydrate(&self, _data: &mut RawRecord, _options: &mut Options) {}

    /// Observes (and may adjust) the entity after the field-list write.
    fn after_hydrate(&self, _entity: &mut dyn Entity, _data: &RawRecord, _options: &Options) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl HydrationHooks for NoHooks {}
