//! Statement lifecycle
//!
//! A statement tracks one SQL string from creation through planning to
//! execution. States only ever advance Created -> Planned -> Executed;
//! a statement is never re-planned in place, and a fresh SQL string
//! requires a fresh statement.

use crate::error::{Error, Result};
use crate::executor::{PlanTree, TupleDescriptor};
use std::fmt;

/// The closed set of statement kinds the pipeline drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    CreateTable,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
            StatementKind::CreateTable => "CREATE TABLE",
        };
        write!(f, "{}", s)
    }
}

/// Lifecycle state of a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementState {
    Created,
    Planned,
    Executed,
}

impl fmt::Display for StatementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One SQL statement moving through the parse -> plan -> execute pipeline
#[derive(Debug)]
pub struct Statement {
    kind: StatementKind,
    sql: String,
    state: StatementState,
    plan: Option<PlanTree>,
    tuple_descriptor: TupleDescriptor,
}

impl Statement {
    /// Create a statement in the Created state
    pub fn new(kind: StatementKind, sql: impl Into<String>) -> Self {
        Self {
            kind,
            sql: sql.into(),
            state: StatementState::Created,
            plan: None,
            tuple_descriptor: Vec::new(),
        }
    }

    /// Statement kind
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// The SQL text this statement was created from
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Current lifecycle state
    pub fn state(&self) -> StatementState {
        self.state
    }

    /// Attach a plan and transition Created -> Planned. The tuple
    /// descriptor is derived from the plan at this point.
    pub fn attach_plan(&mut self, plan: PlanTree) -> Result<()> {
        if self.state != StatementState::Created {
            return Err(Error::InvalidStatementTransition {
                from: self.state.to_string(),
                to: StatementState::Planned.to_string(),
            });
        }
        self.tuple_descriptor = plan.tuple_descriptor();
        self.plan = Some(plan);
        self.state = StatementState::Planned;
        Ok(())
    }

    /// The attached plan, if the statement has been planned
    pub fn plan(&self) -> Option<&PlanTree> {
        self.plan.as_ref()
    }

    /// The derived output shape
    pub fn tuple_descriptor(&self) -> &TupleDescriptor {
        &self.tuple_descriptor
    }

    /// Wire format code per output column (all text)
    pub fn result_formats(&self) -> Vec<u8> {
        vec![0; self.tuple_descriptor.len()]
    }

    /// Transition Planned -> Executed. Executing a never-planned
    /// statement fails deterministically.
    pub fn mark_executed(&mut self) -> Result<()> {
        match self.state {
            StatementState::Planned => {
                self.state = StatementState::Executed;
                Ok(())
            }
            StatementState::Created => Err(Error::StatementNotPlanned),
            StatementState::Executed => Err(Error::InvalidStatementTransition {
                from: self.state.to_string(),
                to: StatementState::Executed.to_string(),
            }),
        }
    }
}
