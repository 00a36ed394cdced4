//! Process-level setup for binaries embedding the marshaller.
//!
//! # Main Components
//!
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod tracing;

pub use self::tracing::setup_tracing;
