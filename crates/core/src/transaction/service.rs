//! Transaction workflow service.
//!
//! Implements the state machine: `submit` creates a `Pending`
//! transaction, `confirm`/`reject`/`cancel` each take the transaction
//! lock, verify `status == Pending`, apply the ledger effect, and write
//! the terminal state. The status check and the write happen under the
//! same lock, so a transaction reaches a terminal state exactly once.
//!
//! Investment principal is reserved (debited) at submission, not at
//! confirmation: an account can never hold pending investment requests
//! that collectively exceed its balance. Reject and cancel refund the
//! reservation.

use std::sync::{Arc, PoisonError};

use tracing::info;

use custodia_shared::types::{AccountId, TransactionId, UserId, round8};
use rust_decimal::Decimal;

use crate::accrual::ContractBook;
use crate::clock::Clock;
use crate::ledger::Ledger;
use crate::plan::PlanRegistry;

use super::error::TransactionError;
use super::store::TransactionStore;
use super::types::{SubmitInput, Transaction, TransactionKind, TransactionStatus};

/// Drives transactions through the approval workflow.
pub struct TransactionService {
    ledger: Arc<Ledger>,
    plans: Arc<dyn PlanRegistry>,
    contracts: Arc<ContractBook>,
    store: Arc<TransactionStore>,
    clock: Arc<dyn Clock>,
}

impl TransactionService {
    /// Creates a service over the given collaborators.
    #[must_use]
    pub fn new(
        ledger: Arc<Ledger>,
        plans: Arc<dyn PlanRegistry>,
        contracts: Arc<ContractBook>,
        store: Arc<TransactionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ledger,
            plans,
            contracts,
            store,
            clock,
        }
    }

    /// Submits a new transaction in `Pending` status.
    ///
    /// For investments this validates the plan, the plan minimum, and
    /// immediately debits the principal from the account. Deposits and
    /// withdrawals touch no balance at submission.
    ///
    /// # Errors
    ///
    /// `InvalidAmount`, `PlanNotFound`, `BelowMinimum`, or any ledger
    /// error from the principal reservation (`InsufficientFunds`,
    /// `AccountNotFound`).
    pub fn submit(&self, input: SubmitInput) -> Result<Transaction, TransactionError> {
        let amount = round8(input.amount);
        if amount <= Decimal::ZERO {
            return Err(TransactionError::InvalidAmount(amount));
        }

        let plan_id = match input.kind {
            TransactionKind::Investment => {
                let plan_id = input.plan_id.ok_or(TransactionError::MissingPlan)?;
                let plan = self
                    .plans
                    .get(plan_id)
                    .filter(|p| p.active)
                    .ok_or(TransactionError::PlanNotFound(plan_id))?;
                if amount < plan.min_amount {
                    return Err(TransactionError::BelowMinimum {
                        minimum: plan.min_amount,
                        amount,
                    });
                }
                // Reserve the principal now so pending investment requests
                // can never collectively exceed the balance.
                self.ledger.debit(input.account_id, amount)?;
                Some(plan_id)
            }
            TransactionKind::Deposit | TransactionKind::Withdrawal => {
                // No balance effect at submission, but the account must exist.
                self.ledger.balance(input.account_id)?;
                None
            }
        };

        let transaction = Transaction {
            id: TransactionId::new(),
            account_id: input.account_id,
            kind: input.kind,
            amount,
            status: TransactionStatus::Pending,
            plan_id,
            external_ref: input.external_ref,
            reviewer_id: None,
            notes: None,
            created_at: self.clock.now(),
            resolved_at: None,
        };
        self.store.insert(transaction.clone());

        info!(
            transaction_id = %transaction.id,
            account_id = %transaction.account_id,
            kind = transaction.kind.as_str(),
            %amount,
            "transaction submitted"
        );
        Ok(transaction)
    }

    /// Confirms a pending transaction and applies its ledger effect.
    ///
    /// - Deposit: credits the amount.
    /// - Withdrawal: debits the amount. If the balance is insufficient at
    ///   confirmation time the confirm fails and the transaction REMAINS
    ///   `Pending`, so it can be retried or rejected.
    /// - Investment: opens a contract (the principal was already reserved
    ///   at submission).
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidState` when not pending, or the ledger error
    /// that blocked the effect.
    pub fn confirm(
        &self,
        id: TransactionId,
        reviewer_id: UserId,
        notes: Option<String>,
    ) -> Result<Transaction, TransactionError> {
        let entry = self.store.entry(id)?;
        let mut transaction = entry.lock().unwrap_or_else(PoisonError::into_inner);
        Self::require_pending(&transaction)?;
        let now = self.clock.now();

        match transaction.kind {
            TransactionKind::Deposit => {
                self.ledger.credit(transaction.account_id, transaction.amount)?;
            }
            TransactionKind::Withdrawal => {
                // Insufficiency here leaves the transaction pending.
                self.ledger.debit(transaction.account_id, transaction.amount)?;
            }
            TransactionKind::Investment => {
                let plan_id = transaction.plan_id.ok_or(TransactionError::MissingPlan)?;
                let plan = self
                    .plans
                    .get(plan_id)
                    .ok_or(TransactionError::PlanNotFound(plan_id))?;
                let contract =
                    self.contracts
                        .open(transaction.account_id, &plan, transaction.amount, now);
                info!(
                    transaction_id = %transaction.id,
                    contract_id = %contract.id,
                    principal = %contract.principal,
                    "investment contract opened"
                );
            }
        }

        transaction.status = TransactionStatus::Confirmed;
        transaction.reviewer_id = Some(reviewer_id);
        transaction.notes = notes;
        transaction.resolved_at = Some(now);

        info!(
            transaction_id = %transaction.id,
            reviewer_id = %reviewer_id,
            "transaction confirmed"
        );
        Ok(transaction.clone())
    }

    /// Rejects a pending transaction.
    ///
    /// Investment rejections refund the principal reserved at submission.
    ///
    /// # Errors
    ///
    /// `NotFound` or `InvalidState` when not pending.
    pub fn reject(
        &self,
        id: TransactionId,
        reviewer_id: UserId,
        notes: Option<String>,
    ) -> Result<Transaction, TransactionError> {
        let entry = self.store.entry(id)?;
        let mut transaction = entry.lock().unwrap_or_else(PoisonError::into_inner);
        Self::require_pending(&transaction)?;

        self.refund_reservation(&transaction)?;

        transaction.status = TransactionStatus::Rejected;
        transaction.reviewer_id = Some(reviewer_id);
        transaction.notes = notes;
        transaction.resolved_at = Some(self.clock.now());

        info!(
            transaction_id = %transaction.id,
            reviewer_id = %reviewer_id,
            "transaction rejected"
        );
        Ok(transaction.clone())
    }

    /// Cancels a pending transaction on behalf of the account holder.
    ///
    /// Investment cancellations refund exactly as rejections do.
    ///
    /// # Errors
    ///
    /// `NotFound`, `NotOwner` when the transaction belongs to a different
    /// account, or `InvalidState` when not pending.
    pub fn cancel(
        &self,
        id: TransactionId,
        account_id: AccountId,
    ) -> Result<Transaction, TransactionError> {
        let entry = self.store.entry(id)?;
        let mut transaction = entry.lock().unwrap_or_else(PoisonError::into_inner);
        if transaction.account_id != account_id {
            return Err(TransactionError::NotOwner {
                transaction: transaction.id,
                account: account_id,
            });
        }
        Self::require_pending(&transaction)?;

        self.refund_reservation(&transaction)?;

        transaction.status = TransactionStatus::Cancelled;
        transaction.resolved_at = Some(self.clock.now());

        info!(transaction_id = %transaction.id, "transaction cancelled");
        Ok(transaction.clone())
    }

    /// Returns a point-in-time snapshot of a transaction.
    pub fn get(&self, id: TransactionId) -> Result<Transaction, TransactionError> {
        self.store.get(id)
    }

    /// Lists transactions for one account, newest first, optionally
    /// filtered by status.
    #[must_use]
    pub fn list_for_account(
        &self,
        account_id: AccountId,
        status: Option<TransactionStatus>,
    ) -> Vec<Transaction> {
        self.store.by_account(account_id, status)
    }

    fn require_pending(transaction: &Transaction) -> Result<(), TransactionError> {
        if transaction.status != TransactionStatus::Pending {
            return Err(TransactionError::InvalidState {
                current: transaction.status,
            });
        }
        Ok(())
    }

    /// Returns the submission-time principal reservation, if any.
    fn refund_reservation(&self, transaction: &Transaction) -> Result<(), TransactionError> {
        if transaction.kind == TransactionKind::Investment {
            self.ledger
                .credit(transaction.account_id, transaction.amount)?;
        }
        Ok(())
    }
}
