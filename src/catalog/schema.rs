//! Schema definitions for QuillDB
//!
//! This module defines column metadata, column constraints, and the
//! ordered schema that gives a tuple its shape.

use super::types::DataType;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kinds of column constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    NotNull,
}

/// A named constraint attached to a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Constraint kind
    pub kind: ConstraintKind,
    /// Constraint name
    pub name: String,
}

impl Constraint {
    /// Create a new constraint
    pub fn new(kind: ConstraintKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

/// Column definition in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// Is this column nullable?
    pub nullable: bool,
    /// Constraints attached to this column
    constraints: Vec<Constraint>,
}

impl Column {
    /// Create a new column
    pub fn new(data_type: DataType, name: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
            constraints: Vec::new(),
        }
    }

    /// Attach a constraint. Must be the final mutation before the column
    /// is embedded into a Schema; a primary key forces the column to be
    /// non-nullable.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        if constraint.kind == ConstraintKind::PrimaryKey
            || constraint.kind == ConstraintKind::NotNull
        {
            self.nullable = false;
        }
        self.constraints.push(constraint);
    }

    /// Get the constraints on this column
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Inline size in bytes, 0 for variable-length columns
    pub fn fixed_size(&self) -> usize {
        self.data_type.fixed_size()
    }

    /// Check if this column is part of the primary key
    pub fn is_primary_key(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| c.kind == ConstraintKind::PrimaryKey)
    }
}

/// Table schema - an immutable, ordered list of columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Ordered list of columns
    columns: Vec<Column>,
    /// Column name to index mapping
    name_to_index: HashMap<String, usize>,
}

impl Schema {
    /// Create a schema from an ordered list of columns.
    /// Duplicate column names are a caller error and are reported.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut name_to_index = HashMap::with_capacity(columns.len());
        for (index, column) in columns.iter().enumerate() {
            if name_to_index.insert(column.name.clone(), index).is_some() {
                return Err(Error::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self {
            columns,
            name_to_index,
        })
    }

    /// Create a schema with no columns. Legal, but only empty tuples
    /// conform to it.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            name_to_index: HashMap::new(),
        }
    }

    /// Get column by index
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Get column by name
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.name_to_index.get(name).map(|&idx| &self.columns[idx])
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Get all columns in tuple field order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get primary key columns
    pub fn primary_key_columns(&self) -> Vec<(usize, &Column)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_primary_key())
            .collect()
    }
}
