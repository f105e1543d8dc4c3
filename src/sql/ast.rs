//! Parse tree for the statement subset the pipeline drives

use std::fmt;

/// A database-qualified table reference
#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    /// Optional database qualifier
    pub database: Option<String>,
    /// Table name
    pub table: String,
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.database {
            Some(db) => write!(f, "{}.{}", db, self.table),
            None => write!(f, "{}", self.table),
        }
    }
}

/// A literal value in SQL text
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    String(String),
}

/// Comparison operators allowed in WHERE clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "<>",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
        };
        write!(f, "{}", s)
    }
}

/// A single column-op-literal predicate
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub op: CompareOp,
    pub value: Literal,
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub table: TableRef,
    /// Selected column names; `None` means `*`
    pub columns: Option<Vec<String>>,
    pub where_clause: Option<Predicate>,
}

/// INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: TableRef,
    /// Explicit column list; `None` means schema order
    pub columns: Option<Vec<String>>,
    pub values: Vec<Vec<Literal>>,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: TableRef,
    pub where_clause: Option<Predicate>,
}

/// A SET assignment in an UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Literal,
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: TableRef,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Predicate>,
}

/// Root of a parsed statement
#[derive(Debug, Clone, PartialEq)]
pub enum ParseTree {
    Select(SelectStatement),
    Insert(InsertStatement),
    Delete(DeleteStatement),
    Update(UpdateStatement),
}
