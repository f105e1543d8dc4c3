//! In-memory table heap
//!
//! Rows are fully materialized values; tuples built against a caller
//! pool are copied out of it on insert so the heap never depends on a
//! pool's lifetime.

use super::tuple::Value;
use crate::catalog::TableDef;
use crate::error::{Error, Result};
use std::sync::{Arc, RwLock};

/// Heap storage for a single table
#[derive(Debug)]
pub struct Table {
    /// Table metadata
    def: Arc<TableDef>,
    /// Materialized rows in insertion order
    rows: RwLock<Vec<Vec<Value>>>,
}

impl Table {
    /// Create an empty heap for a table definition
    pub fn new(def: Arc<TableDef>) -> Self {
        Self {
            def,
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Table metadata
    pub fn def(&self) -> &Arc<TableDef> {
        &self.def
    }

    /// Insert a materialized row, enforcing primary key uniqueness
    pub fn insert(&self, row: Vec<Value>) -> Result<()> {
        self.insert_batch(std::slice::from_ref(&row)).map(|_| ())
    }

    /// Insert a batch of rows as a unit. The whole batch is validated
    /// against the schema and the primary key (existing rows and the
    /// batch itself) before any row lands, so a failing batch leaves
    /// the heap untouched.
    pub fn insert_batch(&self, batch: &[Vec<Value>]) -> Result<usize> {
        let arity = self.def.schema().column_count();
        for row in batch {
            if row.len() != arity {
                return Err(Error::ArityMismatch {
                    expected: arity,
                    found: row.len(),
                });
            }
        }

        let pk_columns = self.def.schema().primary_key_columns();
        let mut rows = self.rows.write().unwrap();

        if !pk_columns.is_empty() {
            for (position, row) in batch.iter().enumerate() {
                for existing in rows.iter().chain(&batch[..position]) {
                    if pk_columns
                        .iter()
                        .all(|(index, _)| existing[*index] == row[*index])
                    {
                        return Err(Error::PrimaryKeyViolation(self.def.qualified_name()));
                    }
                }
            }
        }

        rows.extend(batch.iter().cloned());
        Ok(batch.len())
    }

    /// Snapshot of all rows
    pub fn scan(&self) -> Vec<Vec<Value>> {
        self.rows.read().unwrap().clone()
    }

    /// Delete rows matching a predicate, returning how many were removed
    pub fn delete_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&[Value]) -> bool,
    {
        let mut rows = self.rows.write().unwrap();
        let before = rows.len();
        rows.retain(|row| !predicate(row));
        before - rows.len()
    }

    /// Update rows matching a predicate, returning how many changed.
    /// Assignments are applied to a copy of the heap first and the
    /// primary key is re-checked over the result, so an update that
    /// would collapse two rows onto one key changes nothing.
    pub fn update_where<F, G>(&self, predicate: F, apply: G) -> Result<usize>
    where
        F: Fn(&[Value]) -> bool,
        G: Fn(&mut Vec<Value>),
    {
        let mut rows = self.rows.write().unwrap();
        let mut next = rows.clone();
        let mut updated = 0;
        for row in next.iter_mut() {
            if predicate(row) {
                apply(row);
                updated += 1;
            }
        }

        let pk_columns = self.def.schema().primary_key_columns();
        if updated > 0 && !pk_columns.is_empty() {
            for (position, row) in next.iter().enumerate() {
                for other in &next[..position] {
                    if pk_columns
                        .iter()
                        .all(|(index, _)| other[*index] == row[*index])
                    {
                        return Err(Error::PrimaryKeyViolation(self.def.qualified_name()));
                    }
                }
            }
        }

        *rows = next;
        Ok(updated)
    }

    /// Number of rows currently stored
    pub fn row_count(&self) -> usize {
        self.rows.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, Constraint, ConstraintKind, DataType, Schema};

    fn department_table() -> Table {
        let mut id = Column::new(DataType::Integer, "dept_id", false);
        id.add_constraint(Constraint::new(ConstraintKind::PrimaryKey, "pk_dept"));
        let schema = Schema::new(vec![
            id,
            Column::new(DataType::Varchar(32), "dept_name", true),
        ])
        .unwrap();
        Table::new(Arc::new(TableDef::new("hr", "departments", schema, 1)))
    }

    #[test]
    fn test_insert_and_scan() {
        let table = department_table();
        table
            .insert(vec![Value::Integer(1), Value::from("engineering")])
            .unwrap();
        table
            .insert(vec![Value::Integer(2), Value::from("sales")])
            .unwrap();

        let rows = table.scan();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], Value::from("engineering"));
    }

    #[test]
    fn test_primary_key_violation() {
        let table = department_table();
        table
            .insert(vec![Value::Integer(1), Value::from("engineering")])
            .unwrap();

        let result = table.insert(vec![Value::Integer(1), Value::from("dup")]);
        assert!(matches!(result, Err(Error::PrimaryKeyViolation(_))));
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_delete_and_update() {
        let table = department_table();
        for i in 1..=3 {
            table
                .insert(vec![Value::Integer(i), Value::Varchar(format!("d{}", i))])
                .unwrap();
        }

        let updated = table
            .update_where(
                |row| row[0] == Value::Integer(1),
                |row| row[1] = Value::from("CS"),
            )
            .unwrap();
        assert_eq!(updated, 1);
        assert_eq!(table.scan()[0][1], Value::from("CS"));

        let deleted = table.delete_where(|_| true);
        assert_eq!(deleted, 3);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_batch_insert_is_atomic() {
        let table = department_table();
        table
            .insert(vec![Value::Integer(1), Value::from("engineering")])
            .unwrap();

        // Second batch row collides with the first heap row; nothing
        // from the batch may land.
        let batch = vec![
            vec![Value::Integer(2), Value::from("sales")],
            vec![Value::Integer(1), Value::from("dup")],
        ];
        let result = table.insert_batch(&batch);
        assert!(matches!(result, Err(Error::PrimaryKeyViolation(_))));
        assert_eq!(table.row_count(), 1);

        // Intra-batch duplicates are caught too.
        let batch = vec![
            vec![Value::Integer(3), Value::from("a")],
            vec![Value::Integer(3), Value::from("b")],
        ];
        let result = table.insert_batch(&batch);
        assert!(matches!(result, Err(Error::PrimaryKeyViolation(_))));
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_update_rejects_pk_collision() {
        let table = department_table();
        for i in 1..=2 {
            table
                .insert(vec![Value::Integer(i), Value::Varchar(format!("d{}", i))])
                .unwrap();
        }

        let result = table.update_where(|_| true, |row| row[0] = Value::Integer(1));
        assert!(matches!(result, Err(Error::PrimaryKeyViolation(_))));

        // The heap is unchanged after the rejected update.
        let rows = table.scan();
        assert_eq!(rows[0][0], Value::Integer(1));
        assert_eq!(rows[1][0], Value::Integer(2));
    }
}
