//! # Observability & Tracing
//!
//! The marshaller logs through `tracing`. Every event carries the endpoint
//! alias as a structured `endpoint` field:
//!
//! - **debug**: operation entry (`Hydrate`, `Merge`), rejected fields,
//!   discarded duplicate keys and skipped non-record inputs
//! - **info**: one `Reconciled batch` line per `merge_many` with counts
//! - **warn**: a validator that cannot be resolved
//!
//! ## Usage Examples
//!
//! ```bash
//! # Batch summaries only
//! RUST_LOG=info cargo run
//!
//! # Per-record detail
//! RUST_LOG=entity_marshal=debug cargo run
//! ```
//!
//! **With `RUST_LOG=debug`**:
//!
//! ```text
//! DEBUG Merge endpoint="articles" fields=2 is_new=false
//! DEBUG Rejected by validation endpoint="articles" field=title
//! DEBUG Hydrate endpoint="articles" fields=2
//! INFO Reconciled batch endpoint="articles" merged=1 created=2 dropped=2 duplicates=0
//! ```

/// Installs a compact `tracing-subscriber` formatter filtered by `RUST_LOG`.
///
/// Call once, at program start.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // The endpoint field already says where an event came from
        .compact()
        .init();
}
