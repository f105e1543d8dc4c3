//! Plan builder for QuillDB
//!
//! Converts a parse tree into an executable plan, resolving tables and
//! columns against the catalog. All name resolution, type coercion, and
//! arity validation happens here, before anything reaches the executor.

use crate::catalog::{Catalog, DataType, Schema, TableDef};
use crate::error::{Error, Result};
use crate::sql::ast::*;
use crate::storage::Value;
use std::fmt;
use std::sync::Arc;

/// One entry of a statement's derived output shape
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    /// Output column name
    pub name: String,
    /// Output column type
    pub data_type: DataType,
}

/// Output shape of a planned statement
pub type TupleDescriptor = Vec<ColumnInfo>;

/// A resolved WHERE predicate: column index, operator, typed literal
#[derive(Debug, Clone)]
pub struct PlannedPredicate {
    pub column_index: usize,
    pub op: CompareOp,
    pub value: Value,
}

impl PlannedPredicate {
    /// Evaluate the predicate against a materialized row
    pub fn matches(&self, row: &[Value]) -> bool {
        let lhs = &row[self.column_index];
        match self.op {
            CompareOp::Eq => lhs == &self.value,
            CompareOp::NotEq => lhs != &self.value,
            CompareOp::Lt => compare_lt(lhs, &self.value),
            CompareOp::LtEq => lhs == &self.value || compare_lt(lhs, &self.value),
            CompareOp::Gt => compare_lt(&self.value, lhs),
            CompareOp::GtEq => lhs == &self.value || compare_lt(&self.value, lhs),
        }
    }
}

fn compare_lt(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x < y,
        (Value::BigInt(x), Value::BigInt(y)) => x < y,
        (Value::Decimal(x), Value::Decimal(y)) => x < y,
        (Value::Varchar(x), Value::Varchar(y)) => x < y,
        (Value::Timestamp(x), Value::Timestamp(y)) => x < y,
        _ => false,
    }
}

/// An executable plan. Opaque to the statement layer; the pipeline only
/// attaches it to a statement and later submits it for execution.
#[derive(Debug, Clone)]
pub enum PlanTree {
    SeqScan {
        table: Arc<TableDef>,
        /// Output column indexes into the table schema
        output: Vec<usize>,
        predicate: Option<PlannedPredicate>,
    },
    Insert {
        table: Arc<TableDef>,
        /// Fully-resolved rows in schema order
        rows: Vec<Vec<Value>>,
    },
    Delete {
        table: Arc<TableDef>,
        predicate: Option<PlannedPredicate>,
    },
    Update {
        table: Arc<TableDef>,
        /// (column index, new value) pairs
        assignments: Vec<(usize, Value)>,
        predicate: Option<PlannedPredicate>,
    },
    CreateTable {
        database: String,
        table: String,
        schema: Schema,
    },
}

impl PlanTree {
    /// Derive the output shape of this plan. Only scans produce rows;
    /// everything else reports an empty descriptor.
    pub fn tuple_descriptor(&self) -> TupleDescriptor {
        match self {
            PlanTree::SeqScan { table, output, .. } => output
                .iter()
                .filter_map(|&index| table.schema().column(index))
                .map(|column| ColumnInfo {
                    name: column.name.clone(),
                    data_type: column.data_type.clone(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for PlanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanTree::SeqScan {
                table,
                output,
                predicate,
            } => {
                write!(
                    f,
                    "SeqScan({}, columns={})",
                    table.qualified_name(),
                    output.len()
                )?;
                if let Some(pred) = predicate {
                    write!(f, " filter=[#{} {} {}]", pred.column_index, pred.op, pred.value)?;
                }
                Ok(())
            }
            PlanTree::Insert { table, rows } => {
                write!(f, "Insert({}, rows={})", table.qualified_name(), rows.len())
            }
            PlanTree::Delete { table, predicate } => {
                write!(f, "Delete({}", table.qualified_name())?;
                if predicate.is_some() {
                    write!(f, ", filtered")?;
                }
                write!(f, ")")
            }
            PlanTree::Update {
                table, assignments, ..
            } => write!(
                f,
                "Update({}, assignments={})",
                table.qualified_name(),
                assignments.len()
            ),
            PlanTree::CreateTable {
                database,
                table,
                schema,
            } => write!(
                f,
                "CreateTable({}.{}, columns={})",
                database,
                table,
                schema.column_count()
            ),
        }
    }
}

/// Plan builder bound to a catalog and a default database
pub struct PlanBuilder<'a> {
    catalog: &'a Catalog,
    default_database: &'a str,
}

impl<'a> PlanBuilder<'a> {
    /// Create a new plan builder
    pub fn new(catalog: &'a Catalog, default_database: &'a str) -> Self {
        Self {
            catalog,
            default_database,
        }
    }

    /// Build a plan from a parse tree
    pub fn build(&self, tree: &ParseTree) -> Result<PlanTree> {
        match tree {
            ParseTree::Select(select) => self.build_select(select),
            ParseTree::Insert(insert) => self.build_insert(insert),
            ParseTree::Delete(delete) => self.build_delete(delete),
            ParseTree::Update(update) => self.build_update(update),
        }
    }

    fn build_select(&self, select: &SelectStatement) -> Result<PlanTree> {
        let table = self.resolve_table(&select.table)?;
        let schema = table.schema();

        let output = match &select.columns {
            None => (0..schema.column_count()).collect(),
            Some(names) => names
                .iter()
                .map(|name| {
                    schema.column_index(name).ok_or_else(|| {
                        Error::ColumnNotFound(name.clone(), table.qualified_name())
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        };

        let predicate = self.resolve_predicate(&table, select.where_clause.as_ref())?;

        Ok(PlanTree::SeqScan {
            table,
            output,
            predicate,
        })
    }

    fn build_insert(&self, insert: &InsertStatement) -> Result<PlanTree> {
        let table = self.resolve_table(&insert.table)?;
        let schema = table.schema();
        let arity = schema.column_count();

        // Map the explicit column list (or schema order) to indexes.
        let target_indexes: Vec<usize> = match &insert.columns {
            None => (0..arity).collect(),
            Some(names) => {
                for (position, name) in names.iter().enumerate() {
                    if names[..position].contains(name) {
                        return Err(Error::DuplicateColumn(name.clone()));
                    }
                }
                names
                    .iter()
                    .map(|name| {
                        schema.column_index(name).ok_or_else(|| {
                            Error::ColumnNotFound(name.clone(), table.qualified_name())
                        })
                    })
                    .collect::<Result<Vec<_>>>()?
            }
        };

        let mut rows = Vec::with_capacity(insert.values.len());
        for literals in &insert.values {
            if literals.len() != target_indexes.len() {
                return Err(Error::ArityMismatch {
                    expected: target_indexes.len(),
                    found: literals.len(),
                });
            }

            let mut row = vec![Value::Null; arity];
            for (literal, &index) in literals.iter().zip(&target_indexes) {
                let column = schema.column(index).ok_or(Error::IndexOutOfRange {
                    index,
                    arity,
                })?;
                row[index] = coerce_literal(literal, column.name.as_str(), &column.data_type)?;
            }

            // Columns left unlisted stay NULL and must allow it.
            for (index, column) in schema.columns().iter().enumerate() {
                if row[index].is_null() && !column.nullable {
                    return Err(Error::NullNotAllowed(column.name.clone()));
                }
            }
            rows.push(row);
        }

        Ok(PlanTree::Insert { table, rows })
    }

    fn build_delete(&self, delete: &DeleteStatement) -> Result<PlanTree> {
        let table = self.resolve_table(&delete.table)?;
        let predicate = self.resolve_predicate(&table, delete.where_clause.as_ref())?;
        Ok(PlanTree::Delete { table, predicate })
    }

    fn build_update(&self, update: &UpdateStatement) -> Result<PlanTree> {
        let table = self.resolve_table(&update.table)?;
        let schema = table.schema();

        let mut assignments = Vec::with_capacity(update.assignments.len());
        for assignment in &update.assignments {
            let index = schema.column_index(&assignment.column).ok_or_else(|| {
                Error::ColumnNotFound(assignment.column.clone(), table.qualified_name())
            })?;
            let column = schema.column(index).ok_or(Error::IndexOutOfRange {
                index,
                arity: schema.column_count(),
            })?;
            let value = coerce_literal(&assignment.value, &column.name, &column.data_type)?;
            if value.is_null() && !column.nullable {
                return Err(Error::NullNotAllowed(column.name.clone()));
            }
            assignments.push((index, value));
        }

        let predicate = self.resolve_predicate(&table, update.where_clause.as_ref())?;

        Ok(PlanTree::Update {
            table,
            assignments,
            predicate,
        })
    }

    fn resolve_table(&self, table_ref: &TableRef) -> Result<Arc<TableDef>> {
        let database = table_ref
            .database
            .as_deref()
            .unwrap_or(self.default_database);
        self.catalog.table(database, &table_ref.table)
    }

    fn resolve_predicate(
        &self,
        table: &TableDef,
        predicate: Option<&Predicate>,
    ) -> Result<Option<PlannedPredicate>> {
        let Some(predicate) = predicate else {
            return Ok(None);
        };
        let schema = table.schema();
        let column = schema.column_by_name(&predicate.column).ok_or_else(|| {
            Error::ColumnNotFound(predicate.column.clone(), table.qualified_name())
        })?;
        let column_index = schema
            .column_index(&predicate.column)
            .ok_or_else(|| Error::ColumnNotFound(predicate.column.clone(), table.qualified_name()))?;
        let value = coerce_literal(&predicate.value, &column.name, &column.data_type)?;

        Ok(Some(PlannedPredicate {
            column_index,
            op: predicate.op,
            value,
        }))
    }
}

/// Coerce a SQL literal to a column's declared type
fn coerce_literal(literal: &Literal, column: &str, data_type: &DataType) -> Result<Value> {
    let mismatch = |found: &str| Error::TypeMismatch {
        column: column.to_string(),
        expected: data_type.to_string(),
        found: found.to_string(),
    };

    match (literal, data_type) {
        (Literal::Null, _) => Ok(Value::Null),
        (Literal::Boolean(b), DataType::Boolean) => Ok(Value::Boolean(*b)),
        (Literal::Integer(i), DataType::Integer) => i32::try_from(*i)
            .map(Value::Integer)
            .map_err(|_| Error::PlanError(format!("integer literal {} out of range", i))),
        (Literal::Integer(i), DataType::BigInt) => Ok(Value::BigInt(*i)),
        (Literal::Integer(i), DataType::Decimal) => Ok(Value::Decimal(*i as f64)),
        (Literal::Integer(i), DataType::Timestamp) => Ok(Value::Timestamp(*i)),
        (Literal::Decimal(d), DataType::Decimal) => Ok(Value::Decimal(*d)),
        (Literal::String(s), DataType::Varchar(_)) => Ok(Value::Varchar(s.clone())),
        (Literal::Boolean(_), _) => Err(mismatch("BOOLEAN")),
        (Literal::Integer(_), _) => Err(mismatch("INTEGER")),
        (Literal::Decimal(_), _) => Err(mismatch("DECIMAL")),
        (Literal::String(_), _) => Err(mismatch("VARCHAR")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Column;
    use crate::sql::build_parse_tree;

    fn catalog_with_departments() -> Catalog {
        let catalog = Catalog::new();
        let schema = Schema::new(vec![
            Column::new(DataType::Integer, "dept_id", false),
            Column::new(DataType::Varchar(32), "dept_name", true),
        ])
        .unwrap();
        catalog.create_table("hr", "departments", schema).unwrap();
        catalog
    }

    #[test]
    fn test_plan_select_star_descriptor() {
        let catalog = catalog_with_departments();
        let builder = PlanBuilder::new(&catalog, "hr");

        let tree = build_parse_tree("SELECT * FROM hr.departments").unwrap();
        let plan = builder.build(&tree).unwrap();

        let descriptor = plan.tuple_descriptor();
        assert_eq!(descriptor.len(), 2);
        assert_eq!(descriptor[0].name, "dept_id");
        assert_eq!(descriptor[1].data_type, DataType::Varchar(32));
    }

    #[test]
    fn test_plan_unknown_table_fails() {
        let catalog = catalog_with_departments();
        let builder = PlanBuilder::new(&catalog, "hr");

        let tree = build_parse_tree("SELECT * FROM hr.missing").unwrap();
        assert!(matches!(
            builder.build(&tree),
            Err(Error::TableNotFound(_))
        ));
    }

    #[test]
    fn test_plan_unknown_column_fails() {
        let catalog = catalog_with_departments();
        let builder = PlanBuilder::new(&catalog, "hr");

        let tree = build_parse_tree("SELECT nope FROM departments").unwrap();
        assert!(matches!(
            builder.build(&tree),
            Err(Error::ColumnNotFound(..))
        ));
    }

    #[test]
    fn test_plan_insert_resolves_rows() {
        let catalog = catalog_with_departments();
        let builder = PlanBuilder::new(&catalog, "hr");

        let tree = build_parse_tree(
            "INSERT INTO departments(dept_id,dept_name) VALUES (1,'engineering')",
        )
        .unwrap();
        let plan = builder.build(&tree).unwrap();

        match plan {
            PlanTree::Insert { rows, .. } => {
                assert_eq!(rows, vec![vec![Value::Integer(1), Value::from("engineering")]]);
            }
            other => panic!("expected Insert, got {}", other),
        }
    }

    #[test]
    fn test_plan_insert_arity_mismatch() {
        let catalog = catalog_with_departments();
        let builder = PlanBuilder::new(&catalog, "hr");

        let tree =
            build_parse_tree("INSERT INTO departments(dept_id,dept_name) VALUES (1,'x',2)")
                .unwrap();
        assert!(matches!(
            builder.build(&tree),
            Err(Error::ArityMismatch {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn test_plan_insert_duplicate_target_column() {
        let catalog = catalog_with_departments();
        let builder = PlanBuilder::new(&catalog, "hr");

        let tree =
            build_parse_tree("INSERT INTO departments(dept_id,dept_id) VALUES (1,2)").unwrap();
        assert!(matches!(
            builder.build(&tree),
            Err(Error::DuplicateColumn(name)) if name == "dept_id"
        ));
    }

    #[test]
    fn test_plan_insert_type_mismatch() {
        let catalog = catalog_with_departments();
        let builder = PlanBuilder::new(&catalog, "hr");

        let tree =
            build_parse_tree("INSERT INTO departments(dept_id,dept_name) VALUES ('x',1)").unwrap();
        assert!(matches!(
            builder.build(&tree),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_predicate_evaluation() {
        let pred = PlannedPredicate {
            column_index: 0,
            op: CompareOp::GtEq,
            value: Value::Integer(2),
        };
        assert!(!pred.matches(&[Value::Integer(1)]));
        assert!(pred.matches(&[Value::Integer(2)]));
        assert!(pred.matches(&[Value::Integer(3)]));
    }
}
