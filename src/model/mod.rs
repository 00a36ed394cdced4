//! Data structures flowing through the marshaller: raw records, field values,
//! the stock [`Record`] entity and per-call [`Options`].

pub mod options;
pub mod record;
pub mod value;

pub use options::*;
pub use record::*;
pub use value::*;
