//! Error types for QuillDB
//!
//! This module defines all error types used throughout the statement
//! pipeline and the tuple construction layer.

use thiserror::Error;

/// The main error type for QuillDB
#[derive(Error, Debug)]
pub enum Error {
    // ========== Lexer Errors ==========
    #[error("Lexer error: unexpected character '{0}' at position {1}")]
    UnexpectedCharacter(char, usize),

    #[error("Lexer error: unterminated string literal starting at position {0}")]
    UnterminatedString(usize),

    #[error("Lexer error: invalid number format at position {0}")]
    InvalidNumber(usize),

    // ========== Parser Errors ==========
    #[error("Parse error: unexpected token '{found}', expected {expected}")]
    UnexpectedToken { expected: String, found: String },

    #[error("Parse error: unexpected end of input, expected {0}")]
    UnexpectedEof(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    // ========== Plan Errors ==========
    #[error("Plan error: {0}")]
    PlanError(String),

    // ========== Catalog Errors ==========
    #[error("Catalog error: table '{0}' not found")]
    TableNotFound(String),

    #[error("Catalog error: table '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("Catalog error: column '{0}' not found in table '{1}'")]
    ColumnNotFound(String, String),

    #[error("Catalog error: duplicate column '{0}' in schema")]
    DuplicateColumn(String),

    // ========== Type Errors ==========
    #[error("Type error: value of type {found} is not compatible with column '{column}' of type {expected}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    #[error("Type error: null value not allowed for column '{0}'")]
    NullNotAllowed(String),

    #[error("Type error: column index {index} out of range for schema with {arity} columns")]
    IndexOutOfRange { index: usize, arity: usize },

    #[error("Type error: tuple has {found} values but schema has {expected} columns")]
    ArityMismatch { expected: usize, found: usize },

    // ========== Execution Errors ==========
    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Execution error: primary key violation for table '{0}'")]
    PrimaryKeyViolation(String),

    #[error("Execution error: constraint violation - {0}")]
    ConstraintViolation(String),

    // ========== Statement Errors ==========
    #[error("Statement error: cannot execute a statement that was never planned")]
    StatementNotPlanned,

    #[error("Statement error: invalid transition from {from} to {to}")]
    InvalidStatementTransition { from: String, to: String },

    // ========== Parameter Errors ==========
    #[error("Parameter error: malformed parameter buffer - {0}")]
    InvalidParamBuffer(String),

    // ========== Transaction Errors ==========
    #[error("Transaction error: transaction {0} not found")]
    TransactionNotFound(u64),

    #[error("Transaction error: transaction {0} is not active")]
    TransactionNotActive(u64),

    // ========== Internal Errors ==========
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for QuillDB operations
pub type Result<T> = std::result::Result<T, Error>;
