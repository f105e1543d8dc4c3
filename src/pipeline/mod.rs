//! Statement lifecycle and the parse -> plan -> execute driver

mod driver;
mod statement;

pub use driver::StatementDriver;
pub use statement::{Statement, StatementKind, StatementState};
