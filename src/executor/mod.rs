//! Query planning and execution

mod engine;
mod planner;

pub use engine::{ExecutionEngine, ExecutorContext, QueryResult};
pub use planner::{ColumnInfo, PlanBuilder, PlanTree, PlannedPredicate, TupleDescriptor};
