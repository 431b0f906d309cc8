//! In-memory transaction store.

use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;

use custodia_shared::types::{AccountId, TransactionId};

use super::error::TransactionError;
use super::types::{Transaction, TransactionStatus};

/// Holds every transaction, keyed by ID.
///
/// Each transaction carries its own lock; state transitions take the lock
/// for the compare-and-swap on `status == Pending`, so two concurrent
/// reviewer actions on the same transaction cannot both succeed.
#[derive(Debug, Default)]
pub struct TransactionStore {
    transactions: DashMap<TransactionId, Arc<Mutex<Transaction>>>,
}

impl TransactionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a newly submitted transaction.
    pub fn insert(&self, transaction: Transaction) {
        self.transactions
            .insert(transaction.id, Arc::new(Mutex::new(transaction)));
    }

    /// Returns a point-in-time snapshot of a transaction.
    pub fn get(&self, id: TransactionId) -> Result<Transaction, TransactionError> {
        let entry = self.entry(id)?;
        let transaction = entry.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(transaction.clone())
    }

    /// Returns the lockable handle for a transition.
    pub(super) fn entry(
        &self,
        id: TransactionId,
    ) -> Result<Arc<Mutex<Transaction>>, TransactionError> {
        self.transactions
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(TransactionError::NotFound(id))
    }

    /// Lists transaction snapshots for one account, newest first,
    /// optionally filtered by status.
    #[must_use]
    pub fn by_account(
        &self,
        account_id: AccountId,
        status: Option<TransactionStatus>,
    ) -> Vec<Transaction> {
        let mut transactions: Vec<Transaction> = self
            .transactions
            .iter()
            .filter_map(|entry| {
                let transaction = entry
                    .value()
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                let matches = transaction.account_id == account_id
                    && status.is_none_or(|s| transaction.status == s);
                matches.then(|| transaction.clone())
            })
            .collect();
        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        transactions
    }
}
