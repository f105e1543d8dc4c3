//! Plan execution for QuillDB
//!
//! The engine is the single execution entry point: it takes a planned
//! statement's plan tree, bound parameters, and an executor context
//! scoped to one transaction, and returns rows or an affected-row
//! count. Errors from storage (constraint violations included)
//! propagate verbatim.

use super::planner::PlanTree;
use crate::catalog::{Catalog, TableDef};
use crate::error::{Error, Result};
use crate::storage::{Table, Value};
use crate::transaction::Txn;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Query result
#[derive(Debug)]
pub struct QueryResult {
    /// Column names
    pub columns: Vec<String>,
    /// Result rows
    pub rows: Vec<Vec<Value>>,
    /// Number of affected rows (for INSERT/UPDATE/DELETE)
    pub affected_rows: usize,
    /// Wire format code per output column (0 = text)
    pub formats: Vec<u8>,
    /// Message
    pub message: Option<String>,
}

impl QueryResult {
    /// Create a new empty result
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            affected_rows: 0,
            formats: Vec::new(),
            message: None,
        }
    }

    /// Create a result with affected rows count
    pub fn with_affected_rows(count: usize, message: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            affected_rows: count,
            formats: Vec::new(),
            message: Some(message.into()),
        }
    }
}

/// Execution scope for one transaction
#[derive(Debug)]
pub struct ExecutorContext {
    txn: Txn,
}

impl ExecutorContext {
    /// Scope an executor to a transaction
    pub fn new(txn: Txn) -> Self {
        Self { txn }
    }

    /// The transaction this context is bound to
    pub fn txn(&self) -> &Txn {
        &self.txn
    }
}

/// Execution Engine
pub struct ExecutionEngine {
    /// System catalog
    catalog: Arc<Catalog>,
    /// Table heaps by qualified name
    tables: RwLock<HashMap<String, Arc<Table>>>,
}

impl ExecutionEngine {
    /// Create a new execution engine over a catalog
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Execute a plan within an executor context. `params` carries the
    /// statement's bound parameters; plans produced by the plan builder
    /// arrive with literals already resolved, so the list is logged and
    /// passed through for consumers that inspect it.
    pub fn execute_plan(
        &self,
        plan: &PlanTree,
        params: &[Value],
        context: &ExecutorContext,
    ) -> Result<QueryResult> {
        debug!(
            txn = context.txn().id(),
            params = params.len(),
            plan = %plan,
            "executing plan"
        );

        match plan {
            PlanTree::CreateTable {
                database,
                table,
                schema,
            } => {
                let def = self
                    .catalog
                    .create_table(database, table, schema.clone())?;
                let mut tables = self.tables.write().unwrap();
                tables.insert(def.qualified_name(), Arc::new(Table::new(def.clone())));
                Ok(QueryResult::with_affected_rows(
                    0,
                    format!("table {} created", def.qualified_name()),
                ))
            }
            PlanTree::Insert { table, rows } => {
                let heap = self.heap(table)?;
                // All rows land, or none do.
                let inserted = heap.insert_batch(rows)?;
                Ok(QueryResult::with_affected_rows(
                    inserted,
                    format!("{} row(s) inserted", inserted),
                ))
            }
            PlanTree::SeqScan {
                table,
                output,
                predicate,
            } => {
                let heap = self.heap(table)?;
                let mut rows = Vec::new();
                for row in heap.scan() {
                    if let Some(pred) = predicate {
                        if !pred.matches(&row) {
                            continue;
                        }
                    }
                    rows.push(
                        output
                            .iter()
                            .map(|&index| row[index].clone())
                            .collect::<Vec<_>>(),
                    );
                }

                let columns = plan
                    .tuple_descriptor()
                    .into_iter()
                    .map(|info| info.name)
                    .collect();
                let formats = vec![0u8; output.len()];
                Ok(QueryResult {
                    columns,
                    rows,
                    affected_rows: 0,
                    formats,
                    message: None,
                })
            }
            PlanTree::Delete { table, predicate } => {
                let heap = self.heap(table)?;
                let deleted = match predicate {
                    Some(pred) => heap.delete_where(|row| pred.matches(row)),
                    None => heap.delete_where(|_| true),
                };
                Ok(QueryResult::with_affected_rows(
                    deleted,
                    format!("{} row(s) deleted", deleted),
                ))
            }
            PlanTree::Update {
                table,
                assignments,
                predicate,
            } => {
                let heap = self.heap(table)?;
                let apply = |row: &mut Vec<Value>| {
                    for (index, value) in assignments {
                        row[*index] = value.clone();
                    }
                };
                let updated = match predicate {
                    Some(pred) => heap.update_where(|row| pred.matches(row), apply)?,
                    None => heap.update_where(|_| true, apply)?,
                };
                Ok(QueryResult::with_affected_rows(
                    updated,
                    format!("{} row(s) updated", updated),
                ))
            }
        }
    }

    /// Look up (or lazily create) the heap for a table definition
    fn heap(&self, def: &Arc<TableDef>) -> Result<Arc<Table>> {
        // The catalog must still know the table; a dropped table has no heap.
        if !self.catalog.table_exists(&def.database, &def.name) {
            return Err(Error::TableNotFound(def.qualified_name()));
        }
        let mut tables = self.tables.write().unwrap();
        Ok(tables
            .entry(def.qualified_name())
            .or_insert_with(|| Arc::new(Table::new(def.clone())))
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, Constraint, ConstraintKind, DataType, Schema};
    use crate::executor::planner::PlanBuilder;
    use crate::sql::build_parse_tree;
    use crate::transaction::TransactionManager;

    fn setup() -> (Arc<Catalog>, ExecutionEngine, ExecutorContext) {
        let catalog = Arc::new(Catalog::new());
        let engine = ExecutionEngine::new(catalog.clone());
        let txn_manager = TransactionManager::new();
        let context = ExecutorContext::new(txn_manager.begin());
        (catalog, engine, context)
    }

    fn create_departments(engine: &ExecutionEngine, context: &ExecutorContext) {
        let mut id = Column::new(DataType::Integer, "dept_id", false);
        id.add_constraint(Constraint::new(ConstraintKind::PrimaryKey, "pk_dept"));
        let schema = Schema::new(vec![
            id,
            Column::new(DataType::Varchar(32), "dept_name", true),
        ])
        .unwrap();
        let plan = PlanTree::CreateTable {
            database: "hr".to_string(),
            table: "departments".to_string(),
            schema,
        };
        engine.execute_plan(&plan, &[], context).unwrap();
    }

    #[test]
    fn test_create_insert_scan() {
        let (catalog, engine, context) = setup();
        create_departments(&engine, &context);

        let builder = PlanBuilder::new(&catalog, "hr");
        let insert = builder
            .build(
                &build_parse_tree(
                    "INSERT INTO departments(dept_id,dept_name) VALUES (1,'engineering')",
                )
                .unwrap(),
            )
            .unwrap();
        let result = engine.execute_plan(&insert, &[], &context).unwrap();
        assert_eq!(result.affected_rows, 1);

        let scan = builder
            .build(&build_parse_tree("SELECT * FROM hr.departments").unwrap())
            .unwrap();
        let result = engine.execute_plan(&scan, &[], &context).unwrap();
        assert_eq!(result.columns, vec!["dept_id", "dept_name"]);
        assert_eq!(
            result.rows,
            vec![vec![Value::Integer(1), Value::from("engineering")]]
        );
    }

    #[test]
    fn test_duplicate_create_table_fails_cleanly() {
        let (_, engine, context) = setup();
        create_departments(&engine, &context);

        let schema = Schema::new(vec![Column::new(DataType::Integer, "x", false)]).unwrap();
        let plan = PlanTree::CreateTable {
            database: "hr".to_string(),
            table: "departments".to_string(),
            schema,
        };
        let result = engine.execute_plan(&plan, &[], &context);
        assert!(matches!(result, Err(Error::TableAlreadyExists(_))));
    }

    #[test]
    fn test_delete_and_update() {
        let (catalog, engine, context) = setup();
        create_departments(&engine, &context);

        let builder = PlanBuilder::new(&catalog, "hr");
        for sql in [
            "INSERT INTO departments VALUES (1,'engineering')",
            "INSERT INTO departments VALUES (2,'sales')",
        ] {
            let plan = builder.build(&build_parse_tree(sql).unwrap()).unwrap();
            engine.execute_plan(&plan, &[], &context).unwrap();
        }

        let update = builder
            .build(
                &build_parse_tree("UPDATE departments SET dept_name = 'CS' WHERE dept_id = 1")
                    .unwrap(),
            )
            .unwrap();
        let result = engine.execute_plan(&update, &[], &context).unwrap();
        assert_eq!(result.affected_rows, 1);

        let delete = builder
            .build(&build_parse_tree("DELETE FROM departments").unwrap())
            .unwrap();
        let result = engine.execute_plan(&delete, &[], &context).unwrap();
        assert_eq!(result.affected_rows, 2);
    }

    #[test]
    fn test_failed_multi_row_insert_leaves_heap_untouched() {
        let (catalog, engine, context) = setup();
        create_departments(&engine, &context);

        let builder = PlanBuilder::new(&catalog, "hr");
        let insert = builder
            .build(
                &build_parse_tree("INSERT INTO departments VALUES (1,'a'),(1,'b')").unwrap(),
            )
            .unwrap();
        let result = engine.execute_plan(&insert, &[], &context);
        assert!(matches!(result, Err(Error::PrimaryKeyViolation(_))));

        let scan = builder
            .build(&build_parse_tree("SELECT * FROM departments").unwrap())
            .unwrap();
        let result = engine.execute_plan(&scan, &[], &context).unwrap();
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_update_collapsing_primary_keys_fails() {
        let (catalog, engine, context) = setup();
        create_departments(&engine, &context);

        let builder = PlanBuilder::new(&catalog, "hr");
        let insert = builder
            .build(
                &build_parse_tree("INSERT INTO departments VALUES (1,'a'),(2,'b')").unwrap(),
            )
            .unwrap();
        engine.execute_plan(&insert, &[], &context).unwrap();

        let update = builder
            .build(&build_parse_tree("UPDATE departments SET dept_id = 1").unwrap())
            .unwrap();
        let result = engine.execute_plan(&update, &[], &context);
        assert!(matches!(result, Err(Error::PrimaryKeyViolation(_))));

        // Both keys survive unchanged.
        let scan = builder
            .build(&build_parse_tree("SELECT dept_id FROM departments").unwrap())
            .unwrap();
        let result = engine.execute_plan(&scan, &[], &context).unwrap();
        assert_eq!(
            result.rows,
            vec![vec![Value::Integer(1)], vec![Value::Integer(2)]]
        );
    }
}
