//! Transaction Manager
//!
//! Handles transaction lifecycle (Begin, Commit, Abort). Concurrency
//! control and recovery live below this layer; the pipeline only needs
//! id allocation and state tracking so that statement execution and
//! table creation are scoped to exactly one transaction.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use tracing::trace;

/// Transaction State
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Active,
    Committed,
    Aborted,
}

/// Handle to a running transaction
#[derive(Debug, Clone)]
pub struct Txn {
    id: u64,
}

impl Txn {
    /// Transaction id
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Transaction Manager
#[derive(Debug, Default)]
pub struct TransactionManager {
    /// Transaction states by id
    states: RwLock<HashMap<u64, TransactionState>>,
    /// Next transaction ID
    next_txn_id: Mutex<u64>,
}

impl TransactionManager {
    /// Create a new transaction manager
    pub fn new() -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
            next_txn_id: Mutex::new(1),
        }
    }

    /// Begin a new transaction
    pub fn begin(&self) -> Txn {
        let mut next_id = self.next_txn_id.lock().unwrap();
        let id = *next_id;
        *next_id += 1;

        self.states
            .write()
            .unwrap()
            .insert(id, TransactionState::Active);
        trace!(txn = id, "transaction started");
        Txn { id }
    }

    /// Commit a transaction
    pub fn commit(&self, txn: &Txn) -> Result<()> {
        self.transition(txn, TransactionState::Committed)?;
        trace!(txn = txn.id, "transaction committed");
        Ok(())
    }

    /// Abort a transaction
    pub fn abort(&self, txn: &Txn) -> Result<()> {
        self.transition(txn, TransactionState::Aborted)?;
        trace!(txn = txn.id, "transaction aborted");
        Ok(())
    }

    /// Check if a transaction is active
    pub fn is_active(&self, txn: &Txn) -> bool {
        matches!(
            self.states.read().unwrap().get(&txn.id),
            Some(TransactionState::Active)
        )
    }

    fn transition(&self, txn: &Txn, target: TransactionState) -> Result<()> {
        let mut states = self.states.write().unwrap();
        let state = states
            .get_mut(&txn.id)
            .ok_or(Error::TransactionNotFound(txn.id))?;
        if *state != TransactionState::Active {
            return Err(Error::TransactionNotActive(txn.id));
        }
        *state = target;
        Ok(())
    }
}
