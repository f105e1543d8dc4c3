//! Data types for QuillDB
//!
//! This module defines the SQL data types supported by the tuple layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL Data Types
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Boolean type
    Boolean,
    /// Integer (32-bit)
    Integer,
    /// Big integer (64-bit)
    BigInt,
    /// Double-precision decimal
    Decimal,
    /// Variable-length character string with max length
    Varchar(usize),
    /// Timestamp (milliseconds since epoch)
    Timestamp,
}

impl DataType {
    /// Get the inline size in bytes, 0 for variable-length types
    pub fn fixed_size(&self) -> usize {
        match self {
            DataType::Boolean => 1,
            DataType::Integer => 4,
            DataType::BigInt => 8,
            DataType::Decimal => 8,
            DataType::Timestamp => 8,
            DataType::Varchar(_) => 0,
        }
    }

    /// Check if this type stores its payload out of line
    pub fn is_variable_length(&self) -> bool {
        self.fixed_size() == 0
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::Integer => write!(f, "INTEGER"),
            DataType::BigInt => write!(f, "BIGINT"),
            DataType::Decimal => write!(f, "DECIMAL"),
            DataType::Varchar(n) => write!(f, "VARCHAR({})", n),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
        }
    }
}
