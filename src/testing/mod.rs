//! Test-support fixtures
//!
//! Canonical schemas, tuples, parameter sets, and prepared statements
//! used by integration tests and by statistics tests in downstream
//! crates. Everything here goes through the public pipeline; nothing
//! reaches into engine internals.

use crate::catalog::{Column, Constraint, ConstraintKind, DataType, Schema};
use crate::error::Result;
use crate::metrics::{ParamBuf, ParamBufKind, QueryParams};
use crate::pipeline::{Statement, StatementDriver, StatementKind};
use crate::storage::{MemoryPool, Tuple, Value};
use std::sync::Arc;
use tracing::trace;

/// Database used by the canonical fixtures
pub const FIXTURE_DATABASE: &str = "hr";
/// Table used by the canonical fixtures
pub const FIXTURE_TABLE: &str = "departments";

/// The canonical 2-column department schema: integer id (optionally
/// PRIMARY KEY) and varchar(32) name.
pub fn department_schema(with_primary_key: bool) -> Schema {
    let mut id = Column::new(DataType::Integer, "dept_id", false);
    if with_primary_key {
        id.add_constraint(Constraint::new(ConstraintKind::PrimaryKey, "pk_dept_id"));
    }
    let name = Column::new(DataType::Varchar(32), "dept_name", true);

    Schema::new(vec![id, name]).expect("fixture column names are unique")
}

/// Create the canonical department table through the direct CREATE path
pub fn create_department_table(driver: &StatementDriver, with_primary_key: bool) -> Result<()> {
    driver.create_table(
        FIXTURE_DATABASE,
        FIXTURE_TABLE,
        department_schema(with_primary_key),
    )
}

/// A 4-column schema (INTEGER, INTEGER, DECIMAL, VARCHAR) for tuple
/// construction fixtures
pub fn wide_schema() -> Arc<Schema> {
    let columns = vec![
        Column::new(DataType::Integer, "col_a", false),
        Column::new(DataType::Integer, "col_b", false),
        Column::new(DataType::Decimal, "col_c", false),
        Column::new(DataType::Varchar(32), "col_d", false),
    ];
    Arc::new(Schema::new(columns).expect("fixture column names are unique"))
}

/// Populate a tuple against a 4-column (INTEGER, INTEGER, DECIMAL,
/// VARCHAR) schema. The fourth value is the given integer rendered as
/// a string and copied into the pool.
pub fn populate_tuple(
    schema: &Arc<Schema>,
    pool: &mut MemoryPool,
    first: i32,
    second: i32,
    third: i32,
    fourth: i32,
) -> Result<Tuple> {
    let mut tuple = Tuple::new(schema.clone());
    tuple.set_value(0, Value::Integer(first), pool)?;
    tuple.set_value(1, Value::Integer(second), pool)?;
    tuple.set_value(2, Value::Decimal(f64::from(third)), pool)?;
    tuple.set_value(3, Value::Varchar(fourth.to_string()), pool)?;
    Ok(tuple)
}

/// A one-parameter query parameter set with one-byte type, format, and
/// value buffers
pub fn sample_query_params() -> Arc<QueryParams> {
    let type_buf = ParamBuf::new(ParamBufKind::Type, vec![b'x']);
    let format_buf = ParamBuf::new(ParamBufKind::Format, vec![b'y']);
    let value_buf = ParamBuf::new(ParamBufKind::Value, vec![b'z']);
    QueryParams::new(format_buf, type_buf, value_buf, 1)
}

/// A planned INSERT into the canonical department table
pub fn insert_statement(driver: &StatementDriver, id: i32, name: &str) -> Result<Statement> {
    let sql = format!(
        "INSERT INTO {}.{}(dept_id,dept_name) VALUES ({},'{}');",
        FIXTURE_DATABASE, FIXTURE_TABLE, id, name
    );
    trace!(%sql, "preparing insert fixture");
    driver.prepare(StatementKind::Insert, &sql)
}

/// A planned DELETE over the canonical department table
pub fn delete_statement(driver: &StatementDriver) -> Result<Statement> {
    let sql = format!("DELETE FROM {}.{}", FIXTURE_DATABASE, FIXTURE_TABLE);
    trace!(%sql, "preparing delete fixture");
    driver.prepare(StatementKind::Delete, &sql)
}

/// A planned UPDATE renaming department 1
pub fn update_statement(driver: &StatementDriver) -> Result<Statement> {
    let sql = format!(
        "UPDATE {}.{} SET dept_name = 'CS' WHERE dept_id = 1",
        FIXTURE_DATABASE, FIXTURE_TABLE
    );
    trace!(%sql, "preparing update fixture");
    driver.prepare(StatementKind::Update, &sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::transaction::TransactionManager;

    fn driver() -> StatementDriver {
        StatementDriver::new(
            Arc::new(Catalog::new()),
            Arc::new(TransactionManager::new()),
            FIXTURE_DATABASE,
        )
    }

    #[test]
    fn test_populate_tuple() {
        let schema = wide_schema();
        let mut pool = MemoryPool::new();
        let tuple = populate_tuple(&schema, &mut pool, 1, 2, 3, 4).unwrap();

        assert_eq!(tuple.value(0, &pool).unwrap(), Value::Integer(1));
        assert_eq!(tuple.value(2, &pool).unwrap(), Value::Decimal(3.0));
        assert_eq!(tuple.value(3, &pool).unwrap(), Value::from("4"));
    }

    #[test]
    fn test_sample_query_params() {
        let params = sample_query_params();
        assert_eq!(params.param_count(), 1);
        assert_eq!(params.type_buf().as_slice(), b"x");
        assert_eq!(params.format_buf().as_slice(), b"y");
        assert_eq!(params.value_buf().as_slice(), b"z");
    }

    #[test]
    fn test_prepared_fixture_statements() {
        let driver = driver();
        create_department_table(&driver, true).unwrap();

        let insert = insert_statement(&driver, 1, "engineering").unwrap();
        assert_eq!(insert.kind(), StatementKind::Insert);

        let delete = delete_statement(&driver).unwrap();
        assert!(delete.plan().is_some());

        let update = update_statement(&driver).unwrap();
        assert!(update.plan().is_some());
    }
}
