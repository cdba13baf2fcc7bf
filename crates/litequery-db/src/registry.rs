//! In-memory registry of defined table schemas.

use std::collections::HashMap;

use crate::schema::TableSchema;

/// Schemas registered through [`Database::define_schema`](crate::Database::define_schema),
/// keyed by table name.
///
/// Registering a name again replaces the previous entry. The registry only
/// mirrors what this handle defined; it does not read back from SQLite.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, TableSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `schema`, returning the one it replaced.
    pub fn insert(&mut self, schema: TableSchema) -> Option<TableSchema> {
        self.schemas.insert(schema.name.clone(), schema)
    }

    pub fn get(&self, name: &str) -> Option<&TableSchema> {
        self.schemas.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<TableSchema> {
        self.schemas.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Registered table names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
