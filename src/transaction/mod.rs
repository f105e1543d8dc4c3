//! Transaction lifecycle

mod transaction;

pub use transaction::{TransactionManager, TransactionState, Txn};
