//! Ledger service holding authoritative balances.
//!
//! Every balance mutation is a single atomic read-modify-write under a
//! per-account lock, so two concurrent debits can never both pass the
//! `balance >= amount` check against a stale value. Distinct accounts
//! are mutated fully in parallel.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;

use custodia_shared::types::{AccountId, Asset, round8};

use super::error::LedgerError;
use super::types::{Account, Adjustment, AdjustmentDirection};

/// Authoritative per-account balance store.
///
/// Accounts live in a sharded map keyed by [`AccountId`]; each entry
/// carries its own mutex. Lock scope is a single credit/debit, so callers
/// never observe a torn balance.
#[derive(Debug, Default)]
pub struct Ledger {
    accounts: DashMap<AccountId, Arc<Mutex<Account>>>,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new account with a zero balance.
    ///
    /// Accounts are never deleted by this engine; provisioning is
    /// append-only.
    pub fn open_account(
        &self,
        asset: Asset,
        external_address: Option<String>,
        now: DateTime<Utc>,
    ) -> Account {
        let account = Account {
            id: AccountId::new(),
            asset,
            balance: Decimal::ZERO,
            external_address,
            created_at: now,
        };
        self.accounts
            .insert(account.id, Arc::new(Mutex::new(account.clone())));
        account
    }

    /// Increases the account balance by `amount`.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// `InvalidAmount` unless `amount > 0`; `AccountNotFound` if the
    /// account does not exist.
    pub fn credit(&self, id: AccountId, amount: Decimal) -> Result<Decimal, LedgerError> {
        let amount = validated(amount)?;
        let entry = self.entry(id)?;
        let mut account = entry.lock().unwrap_or_else(PoisonError::into_inner);
        account.balance += amount;
        Ok(account.balance)
    }

    /// Decreases the account balance by `amount`.
    ///
    /// The invariant check and the mutation happen under the same lock:
    /// the balance can never go negative, even under concurrent debits.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// `InvalidAmount` unless `amount > 0`; `AccountNotFound` if the
    /// account does not exist; `InsufficientFunds` when
    /// `balance < amount`.
    pub fn debit(&self, id: AccountId, amount: Decimal) -> Result<Decimal, LedgerError> {
        let amount = validated(amount)?;
        let entry = self.entry(id)?;
        let mut account = entry.lock().unwrap_or_else(PoisonError::into_inner);
        if account.balance < amount {
            return Err(LedgerError::InsufficientFunds {
                available: account.balance,
                requested: amount,
            });
        }
        account.balance -= amount;
        Ok(account.balance)
    }

    /// Returns a point-in-time balance snapshot.
    pub fn balance(&self, id: AccountId) -> Result<Decimal, LedgerError> {
        let entry = self.entry(id)?;
        let account = entry.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(account.balance)
    }

    /// Returns a point-in-time account snapshot.
    pub fn account(&self, id: AccountId) -> Result<Account, LedgerError> {
        let entry = self.entry(id)?;
        let account = entry.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(account.clone())
    }

    /// Brings the balance in line with an externally observed value.
    ///
    /// The delta is computed against the live balance inside the account
    /// lock, which is what makes repeated application of the same external
    /// reading a no-op: the second call computes `delta == 0`.
    ///
    /// Returns the applied adjustment, or `None` when the balances
    /// already matched.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` if the account does not exist; `InvalidAmount`
    /// when the external reading is negative.
    pub fn reconcile_to(
        &self,
        id: AccountId,
        external: Decimal,
    ) -> Result<Option<Adjustment>, LedgerError> {
        if external.is_sign_negative() {
            return Err(LedgerError::InvalidAmount(external));
        }
        let external = round8(external);
        let entry = self.entry(id)?;
        let mut account = entry.lock().unwrap_or_else(PoisonError::into_inner);

        let delta = external - account.balance;
        if delta.is_zero() {
            return Ok(None);
        }

        let direction = if delta > Decimal::ZERO {
            AdjustmentDirection::Received
        } else {
            AdjustmentDirection::Sent
        };
        account.balance = external;

        Ok(Some(Adjustment {
            direction,
            amount: delta.abs(),
            new_balance: account.balance,
        }))
    }

    /// Lists accounts that carry an external watch address, for the
    /// reconciliation tick.
    #[must_use]
    pub fn watched_accounts(&self) -> Vec<(AccountId, String)> {
        self.accounts
            .iter()
            .filter_map(|entry| {
                let account = entry.value().lock().unwrap_or_else(PoisonError::into_inner);
                account
                    .external_address
                    .clone()
                    .map(|addr| (account.id, addr))
            })
            .collect()
    }

    fn entry(&self, id: AccountId) -> Result<Arc<Mutex<Account>>, LedgerError> {
        self.accounts
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(LedgerError::AccountNotFound(id))
    }
}

/// Validates and normalizes an amount for a balance mutation.
fn validated(amount: Decimal) -> Result<Decimal, LedgerError> {
    let amount = round8(amount);
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(amount)
}
