//! Collaborator contracts of the marshaller.
//!
//! # Main Components
//!
//! - [`Entity`] - Capability set every hydrated domain object implements
//! - [`HydrationHooks`] - Before/after notifications around a single record
//!
//! # Testing
//!
//! See [`mock`] for a scripted validator and recording hooks.

pub mod entity;
pub mod hooks;
pub mod mock;

pub use entity::Entity;
pub use hooks::{HydrationHooks, NoHooks};
