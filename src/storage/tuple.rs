//! Tuple and Value types for QuillDB
//!
//! A tuple is a fixed-arity, schema-bound row of typed values.
//! Fixed-size scalars are stored inline; variable-length values are
//! copied into a caller-supplied [`MemoryPool`] at assignment time and
//! the tuple keeps only handles into it.

use super::pool::{MemoryPool, PoolHandle};
use crate::catalog::{DataType, Schema};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A value in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value (32-bit)
    Integer(i32),
    /// Big integer value (64-bit)
    BigInt(i64),
    /// Decimal value (64-bit float)
    Decimal(f64),
    /// String value
    Varchar(String),
    /// Timestamp value (milliseconds since epoch)
    Timestamp(i64),
}

// Decimal compares bitwise so values stay usable as map keys.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a.to_bits() == b.to_bits(),
            (Value::Varchar(a), Value::Varchar(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(_) => "BOOLEAN",
            Value::Integer(_) => "INTEGER",
            Value::BigInt(_) => "BIGINT",
            Value::Decimal(_) => "DECIMAL",
            Value::Varchar(_) => "VARCHAR",
            Value::Timestamp(_) => "TIMESTAMP",
        }
    }

    /// Check if this value may be assigned to a column of `data_type`.
    /// NULL is handled separately by nullability; integers widen into
    /// BIGINT and DECIMAL columns.
    pub fn is_compatible_with(&self, data_type: &DataType) -> bool {
        match (self, data_type) {
            (Value::Null, _) => true,
            (Value::Boolean(_), DataType::Boolean) => true,
            (Value::Integer(_), DataType::Integer) => true,
            (Value::Integer(_), DataType::BigInt) => true,
            (Value::Integer(_), DataType::Decimal) => true,
            (Value::BigInt(_), DataType::BigInt) => true,
            (Value::Decimal(_), DataType::Decimal) => true,
            (Value::Varchar(_), DataType::Varchar(_)) => true,
            (Value::Timestamp(_), DataType::Timestamp) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Integer(i) => write!(f, "{}", i),
            Value::BigInt(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Varchar(s) => write!(f, "{}", s),
            Value::Timestamp(t) => write!(f, "TIMESTAMP({})", t),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Varchar(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Varchar(v.to_string())
    }
}

/// One tuple slot. Slots start out unset; reads of an unset slot yield
/// the NULL sentinel, never uninitialized memory.
#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Unset,
    Inline(Value),
    Pooled(PoolHandle),
}

/// A schema-bound row of typed values
#[derive(Debug, Clone)]
pub struct Tuple {
    schema: Arc<Schema>,
    slots: Vec<Slot>,
}

impl Tuple {
    /// Create an uninitialized tuple matching the schema's arity
    pub fn new(schema: Arc<Schema>) -> Self {
        let slots = vec![Slot::Unset; schema.column_count()];
        Self { schema, slots }
    }

    /// Build a fully-populated tuple from one value per column.
    /// Fails with an arity mismatch before any slot is assigned.
    pub fn from_values(
        schema: Arc<Schema>,
        values: Vec<Value>,
        pool: &mut MemoryPool,
    ) -> Result<Self> {
        if values.len() != schema.column_count() {
            return Err(Error::ArityMismatch {
                expected: schema.column_count(),
                found: values.len(),
            });
        }
        let mut tuple = Tuple::new(schema);
        for (index, value) in values.into_iter().enumerate() {
            tuple.set_value(index, value, pool)?;
        }
        Ok(tuple)
    }

    /// Assign a value at a column index, validating the index and the
    /// value's runtime type against the column's declared type.
    /// Variable-length values are copied into the pool; the tuple keeps
    /// only the handle.
    pub fn set_value(&mut self, index: usize, value: Value, pool: &mut MemoryPool) -> Result<()> {
        let column = self
            .schema
            .column(index)
            .ok_or(Error::IndexOutOfRange {
                index,
                arity: self.slots.len(),
            })?;

        if value.is_null() {
            if !column.nullable {
                return Err(Error::NullNotAllowed(column.name.clone()));
            }
            self.slots[index] = Slot::Inline(Value::Null);
            return Ok(());
        }

        if !value.is_compatible_with(&column.data_type) {
            return Err(Error::TypeMismatch {
                column: column.name.clone(),
                expected: column.data_type.to_string(),
                found: value.type_name().to_string(),
            });
        }

        self.slots[index] = match value {
            Value::Varchar(s) => Slot::Pooled(pool.allocate(s.as_bytes())),
            other => Slot::Inline(other),
        };
        Ok(())
    }

    /// Read the value at a column index. Unset slots read back as the
    /// NULL sentinel.
    pub fn value(&self, index: usize, pool: &MemoryPool) -> Result<Value> {
        match self.slots.get(index) {
            None => Err(Error::IndexOutOfRange {
                index,
                arity: self.slots.len(),
            }),
            Some(Slot::Unset) => Ok(Value::Null),
            Some(Slot::Inline(value)) => Ok(value.clone()),
            Some(Slot::Pooled(handle)) => {
                let bytes = pool.slice(*handle)?;
                Ok(Value::Varchar(
                    String::from_utf8_lossy(bytes).into_owned(),
                ))
            }
        }
    }

    /// Check whether a slot was ever assigned
    pub fn is_set(&self, index: usize) -> bool {
        !matches!(self.slots.get(index), Some(Slot::Unset) | None)
    }

    /// Number of slots; always equals the schema's column count
    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    /// The schema this tuple conforms to
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Copy every slot out of the pool into an owned row. Used when a
    /// tuple is handed to storage that outlives the pool.
    pub fn materialize(&self, pool: &MemoryPool) -> Result<Vec<Value>> {
        (0..self.slots.len())
            .map(|index| self.value(index, pool))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Column;

    fn four_column_schema() -> Arc<Schema> {
        Arc::new(
            Schema::new(vec![
                Column::new(DataType::Integer, "a", false),
                Column::new(DataType::Integer, "b", false),
                Column::new(DataType::Decimal, "c", false),
                Column::new(DataType::Varchar(32), "d", false),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let schema = four_column_schema();
        let mut pool = MemoryPool::new();
        let mut tuple = Tuple::new(schema);

        tuple.set_value(0, Value::Integer(1), &mut pool).unwrap();
        tuple.set_value(1, Value::Integer(2), &mut pool).unwrap();
        tuple.set_value(2, Value::Decimal(3.5), &mut pool).unwrap();
        tuple
            .set_value(3, Value::from("engineering"), &mut pool)
            .unwrap();

        assert_eq!(tuple.value(0, &pool).unwrap(), Value::Integer(1));
        assert_eq!(tuple.value(2, &pool).unwrap(), Value::Decimal(3.5));
        assert_eq!(
            tuple.value(3, &pool).unwrap(),
            Value::Varchar("engineering".to_string())
        );
    }

    #[test]
    fn test_unset_reads_as_null_sentinel() {
        let schema = four_column_schema();
        let pool = MemoryPool::new();
        let tuple = Tuple::new(schema);

        assert!(!tuple.is_set(0));
        assert_eq!(tuple.value(0, &pool).unwrap(), Value::Null);
    }

    #[test]
    fn test_index_out_of_range() {
        let schema = four_column_schema();
        let mut pool = MemoryPool::new();
        let mut tuple = Tuple::new(schema);

        let result = tuple.set_value(4, Value::Integer(0), &mut pool);
        assert!(matches!(
            result,
            Err(Error::IndexOutOfRange { index: 4, arity: 4 })
        ));
    }

    #[test]
    fn test_type_mismatch() {
        let schema = four_column_schema();
        let mut pool = MemoryPool::new();
        let mut tuple = Tuple::new(schema);

        let result = tuple.set_value(0, Value::from("not an int"), &mut pool);
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_null_rejected_for_non_nullable() {
        let schema = four_column_schema();
        let mut pool = MemoryPool::new();
        let mut tuple = Tuple::new(schema);

        let result = tuple.set_value(0, Value::Null, &mut pool);
        assert!(matches!(result, Err(Error::NullNotAllowed(_))));
    }

    #[test]
    fn test_from_values_arity_mismatch() {
        let schema = Arc::new(
            Schema::new(vec![
                Column::new(DataType::Integer, "id", false),
                Column::new(DataType::Varchar(32), "name", false),
            ])
            .unwrap(),
        );
        let mut pool = MemoryPool::new();

        let ok = Tuple::from_values(
            schema.clone(),
            vec![Value::Integer(1), Value::from("dept")],
            &mut pool,
        );
        assert!(ok.is_ok());

        let too_many = Tuple::from_values(
            schema,
            vec![Value::Integer(1), Value::from("dept"), Value::Integer(9)],
            &mut pool,
        );
        assert!(matches!(
            too_many,
            Err(Error::ArityMismatch {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn test_shared_pool_across_tuples() {
        let schema = four_column_schema();
        let mut pool = MemoryPool::new();

        let mut tuples = Vec::new();
        for i in 0..3 {
            let mut tuple = Tuple::new(schema.clone());
            tuple.set_value(0, Value::Integer(i), &mut pool).unwrap();
            tuple.set_value(1, Value::Integer(i * 2), &mut pool).unwrap();
            tuple
                .set_value(2, Value::Decimal(f64::from(i)), &mut pool)
                .unwrap();
            tuple
                .set_value(3, Value::Varchar(format!("row-{}", i)), &mut pool)
                .unwrap();
            tuples.push(tuple);
        }

        for (i, tuple) in tuples.iter().enumerate() {
            assert_eq!(
                tuple.value(3, &pool).unwrap(),
                Value::Varchar(format!("row-{}", i))
            );
        }
    }
}
