//! System catalog: data types, schemas, and table metadata

mod catalog;
mod schema;
mod types;

pub use catalog::{Catalog, TableDef};
pub use schema::{Column, Constraint, ConstraintKind, Schema};
pub use types::DataType;
