//! Statement pipeline driver
//!
//! Orchestrates parse -> plan -> execute for SQL text inside
//! transaction boundaries. The driver is an explicitly constructed
//! context object holding the catalog, the transaction manager, and the
//! execution engine; it is created once and threaded through calls
//! instead of being fetched from globals.
//!
//! Parse and plan failures are terminal for a statement instance - the
//! driver never retries them. Table creation is a distinguished path
//! that builds a CREATE plan directly from a schema, bypassing SQL
//! text, and commits before returning.

use super::statement::{Statement, StatementKind};
use crate::catalog::{Catalog, Schema};
use crate::error::{Error, Result};
use crate::executor::{ExecutionEngine, ExecutorContext, PlanBuilder, PlanTree, QueryResult};
use crate::sql::{ast::ParseTree, build_parse_tree};
use crate::storage::{MemoryPool, Tuple, Value};
use crate::transaction::TransactionManager;
use std::sync::Arc;
use tracing::{debug, info};

/// Driver for the parse -> plan -> execute pipeline
pub struct StatementDriver {
    catalog: Arc<Catalog>,
    txn_manager: Arc<TransactionManager>,
    engine: Arc<ExecutionEngine>,
    default_database: String,
}

impl StatementDriver {
    /// Create a driver over a catalog and transaction manager
    pub fn new(
        catalog: Arc<Catalog>,
        txn_manager: Arc<TransactionManager>,
        default_database: impl Into<String>,
    ) -> Self {
        let engine = Arc::new(ExecutionEngine::new(catalog.clone()));
        Self {
            catalog,
            txn_manager,
            engine,
            default_database: default_database.into(),
        }
    }

    /// The catalog this driver plans against
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// The transaction manager scoping execution
    pub fn txn_manager(&self) -> &Arc<TransactionManager> {
        &self.txn_manager
    }

    /// Parse and plan SQL text, producing a Planned statement.
    /// Malformed SQL and unplannable parse trees are terminal errors;
    /// no partial plan is retained.
    pub fn prepare(&self, kind: StatementKind, sql: &str) -> Result<Statement> {
        let mut statement = Statement::new(kind, sql);

        debug!(%sql, "building parse tree");
        let tree = build_parse_tree(sql)?;
        check_kind(kind, &tree)?;

        let builder = PlanBuilder::new(&self.catalog, &self.default_database);
        let plan = builder.build(&tree)?;
        debug!(plan = %plan, "plan tree built");

        statement.attach_plan(plan)?;
        Ok(statement)
    }

    /// Execute a Planned statement with bound parameters inside its own
    /// transaction, transitioning it to Executed. Result formats are
    /// sized by the statement's tuple descriptor.
    pub fn execute(&self, statement: &mut Statement, params: &[Value]) -> Result<QueryResult> {
        let plan = statement
            .plan()
            .ok_or(Error::StatementNotPlanned)?
            .clone();

        let context = ExecutorContext::new(self.txn_manager.begin());
        match self.engine.execute_plan(&plan, params, &context) {
            Ok(mut result) => {
                self.txn_manager.commit(context.txn())?;
                statement.mark_executed()?;
                result.formats = statement.result_formats();
                Ok(result)
            }
            Err(err) => {
                // A failed statement commits nothing.
                let _ = self.txn_manager.abort(context.txn());
                Err(err)
            }
        }
    }

    /// Create a table directly from a schema, bypassing SQL text. Opens
    /// its own transaction, executes the CREATE plan through an executor
    /// context scoped to it, and commits before returning. A failure
    /// commits nothing.
    pub fn create_table(&self, database: &str, table: &str, schema: Schema) -> Result<()> {
        info!(%database, %table, "creating table");

        let plan = PlanTree::CreateTable {
            database: database.to_string(),
            table: table.to_string(),
            schema,
        };

        let context = ExecutorContext::new(self.txn_manager.begin());
        match self.engine.execute_plan(&plan, &[], &context) {
            Ok(_) => self.txn_manager.commit(context.txn()),
            Err(err) => {
                let _ = self.txn_manager.abort(context.txn());
                Err(err)
            }
        }
    }

    /// Insert a tuple built against a caller pool. The tuple's arity
    /// must match the target table's schema; mismatches fail here,
    /// before anything reaches the executor.
    pub fn insert_tuple(
        &self,
        database: &str,
        table: &str,
        tuple: &Tuple,
        pool: &MemoryPool,
    ) -> Result<QueryResult> {
        let def = self.catalog.table(database, table)?;
        if tuple.arity() != def.schema().column_count() {
            return Err(Error::ArityMismatch {
                expected: def.schema().column_count(),
                found: tuple.arity(),
            });
        }

        let row = tuple.materialize(pool)?;
        let plan = PlanTree::Insert {
            table: def,
            rows: vec![row],
        };

        let context = ExecutorContext::new(self.txn_manager.begin());
        match self.engine.execute_plan(&plan, &[], &context) {
            Ok(result) => {
                self.txn_manager.commit(context.txn())?;
                Ok(result)
            }
            Err(err) => {
                let _ = self.txn_manager.abort(context.txn());
                Err(err)
            }
        }
    }

    /// Look a table up for inspection, then run `SELECT *` over it
    /// through the full pipeline.
    pub fn show_table(&self, database: &str, table: &str) -> Result<QueryResult> {
        self.catalog.table(database, table)?;

        let sql = format!("SELECT * FROM {}.{}", database, table);
        let mut statement = self.prepare(StatementKind::Select, &sql)?;
        self.execute(&mut statement, &[])
    }
}

/// Reject SQL text whose shape contradicts the declared statement kind
fn check_kind(kind: StatementKind, tree: &ParseTree) -> Result<()> {
    let actual = match tree {
        ParseTree::Select(_) => StatementKind::Select,
        ParseTree::Insert(_) => StatementKind::Insert,
        ParseTree::Delete(_) => StatementKind::Delete,
        ParseTree::Update(_) => StatementKind::Update,
    };
    if actual != kind {
        return Err(Error::ParseError(format!(
            "statement tagged {} but SQL text is {}",
            kind, actual
        )));
    }
    Ok(())
}
