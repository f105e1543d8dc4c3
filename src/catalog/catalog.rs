//! System Catalog for QuillDB
//!
//! This module manages metadata about tables. Tables are addressed by
//! database-qualified name; the catalog hands out shared table
//! definitions and reports duplicates instead of merging them.

use super::schema::Schema;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Table definition - full table metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDef {
    /// Database this table belongs to
    pub database: String,
    /// Table name
    pub name: String,
    /// Table schema
    pub schema: Schema,
    /// Table ID (for internal use)
    pub id: u32,
}

impl TableDef {
    /// Create a new table definition
    pub fn new(
        database: impl Into<String>,
        name: impl Into<String>,
        schema: Schema,
        id: u32,
    ) -> Self {
        Self {
            database: database.into(),
            name: name.into(),
            schema,
            id,
        }
    }

    /// Get the table schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Get the database-qualified name
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.database, self.name)
    }
}

/// System Catalog - manages table metadata
#[derive(Debug)]
pub struct Catalog {
    /// Table definitions by qualified name, in creation order
    tables: RwLock<IndexMap<String, Arc<TableDef>>>,
    /// Next table ID
    next_table_id: RwLock<u32>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(IndexMap::new()),
            next_table_id: RwLock::new(1),
        }
    }

    /// Create a new table. The catalog takes ownership of the schema.
    pub fn create_table(
        &self,
        database: &str,
        name: &str,
        schema: Schema,
    ) -> Result<Arc<TableDef>> {
        let key = qualified(database, name);
        let mut tables = self.tables.write().unwrap();

        if tables.contains_key(&key) {
            return Err(Error::TableAlreadyExists(key));
        }

        let mut next_id = self.next_table_id.write().unwrap();
        let table_def = Arc::new(TableDef::new(database, name, schema, *next_id));
        *next_id += 1;

        tables.insert(key, table_def.clone());
        Ok(table_def)
    }

    /// Get a table by database-qualified name
    pub fn table(&self, database: &str, name: &str) -> Result<Arc<TableDef>> {
        let key = qualified(database, name);
        let tables = self.tables.read().unwrap();
        tables
            .get(&key)
            .cloned()
            .ok_or(Error::TableNotFound(key))
    }

    /// Check if a table exists
    pub fn table_exists(&self, database: &str, name: &str) -> bool {
        let tables = self.tables.read().unwrap();
        tables.contains_key(&qualified(database, name))
    }

    /// Drop a table
    pub fn drop_table(&self, database: &str, name: &str) -> Result<()> {
        let key = qualified(database, name);
        let mut tables = self.tables.write().unwrap();

        if tables.shift_remove(&key).is_none() {
            return Err(Error::TableNotFound(key));
        }
        Ok(())
    }

    /// List all qualified table names in creation order
    pub fn list_tables(&self) -> Vec<String> {
        let tables = self.tables.read().unwrap();
        tables.keys().cloned().collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

fn qualified(database: &str, name: &str) -> String {
    format!("{}.{}", database, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::schema::Column;
    use crate::catalog::types::DataType;

    fn two_column_schema() -> Schema {
        Schema::new(vec![
            Column::new(DataType::Integer, "id", false),
            Column::new(DataType::Varchar(32), "name", true),
        ])
        .unwrap()
    }

    #[test]
    fn test_create_and_get_table() {
        let catalog = Catalog::new();
        let table = catalog
            .create_table("hr", "departments", two_column_schema())
            .unwrap();

        assert_eq!(table.qualified_name(), "hr.departments");
        assert_eq!(table.schema().column_count(), 2);

        let retrieved = catalog.table("hr", "departments").unwrap();
        assert_eq!(retrieved.id, table.id);
    }

    #[test]
    fn test_table_already_exists() {
        let catalog = Catalog::new();
        catalog
            .create_table("hr", "departments", two_column_schema())
            .unwrap();

        let result = catalog.create_table("hr", "departments", two_column_schema());
        assert!(matches!(result, Err(Error::TableAlreadyExists(_))));

        // First registration is untouched.
        assert!(catalog.table_exists("hr", "departments"));
    }

    #[test]
    fn test_same_name_different_database() {
        let catalog = Catalog::new();
        catalog
            .create_table("hr", "departments", two_column_schema())
            .unwrap();
        catalog
            .create_table("sales", "departments", two_column_schema())
            .unwrap();

        assert_eq!(catalog.list_tables().len(), 2);
    }

    #[test]
    fn test_drop_table() {
        let catalog = Catalog::new();
        catalog
            .create_table("hr", "departments", two_column_schema())
            .unwrap();
        catalog.drop_table("hr", "departments").unwrap();

        assert!(!catalog.table_exists("hr", "departments"));
        assert!(matches!(
            catalog.table("hr", "departments"),
            Err(Error::TableNotFound(_))
        ));
    }
}
