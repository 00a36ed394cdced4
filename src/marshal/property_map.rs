use indexmap::IndexMap;

use crate::endpoint::{CoercionRegistry, Coercer, Schema};
use crate::model::RawRecord;

/// Field name to the coercer for its declared type.
pub type PropertyMap = IndexMap<String, Coercer>;

/// Coercers for the fields of `record` that have a known declared type.
///
/// Only fields present in `record` are looked up. Untyped fields, and fields
/// whose type the registry does not know, are left out and pass through raw.
pub fn build_property_map(
    schema: &dyn Schema,
    registry: &dyn CoercionRegistry,
    record: &RawRecord,
) -> PropertyMap {
    record
        .keys()
        .filter_map(|field| {
            let type_name = schema.column_type(field)?;
            let coercer = registry.coercer_for(type_name)?;
            Some((field.clone(), coercer))
        })
        .collect()
}
