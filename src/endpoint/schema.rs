use indexmap::IndexMap;

/// Declared column types of an endpoint.
pub trait Schema: Send + Sync {
    /// The declared type name of `field`, or `None` for untyped passthrough.
    fn column_type(&self, field: &str) -> Option<&str>;
}

/// A [`Schema`] backed by an ordered field to type-name map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSchema {
    columns: IndexMap<String, String>,
}

impl ColumnSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or retypes) a column.
    ///
    /// ```
    /// use entity_marshal::endpoint::{ColumnSchema, Schema};
    ///
    /// let schema = ColumnSchema::new().column("id", "integer").column("title", "string");
    /// assert_eq!(schema.column_type("id"), Some("integer"));
    /// assert_eq!(schema.column_type("body"), None);
    /// ```
    pub fn column(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.columns.insert(name.into(), type_name.into());
        self
    }
}

impl Schema for ColumnSchema {
    fn column_type(&self, field: &str) -> Option<&str> {
        self.columns.get(field).map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for ColumnSchema
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(name, type_name)| (name.into(), type_name.into()))
                .collect(),
        }
    }
}
