//! In-memory store of investment contracts.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;

use custodia_shared::types::{AccountId, ContractId};

use crate::plan::Plan;

use super::types::InvestmentContract;

/// Holds every investment contract, active or completed.
///
/// Each contract carries its own lock so the accrual engine can mutate
/// one contract while readers snapshot others.
#[derive(Debug, Default)]
pub struct ContractBook {
    contracts: DashMap<ContractId, Arc<Mutex<InvestmentContract>>>,
}

impl ContractBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a contract for `principal` under `plan`, starting at `now`.
    ///
    /// The caller (transaction confirmation) has already reserved the
    /// principal on the ledger.
    pub fn open(
        &self,
        account_id: AccountId,
        plan: &Plan,
        principal: Decimal,
        now: DateTime<Utc>,
    ) -> InvestmentContract {
        let contract = InvestmentContract {
            id: ContractId::new(),
            account_id,
            plan_id: plan.id,
            principal,
            accrued_profit: Decimal::ZERO,
            start_at: now,
            end_at: now + plan.duration(),
            last_accrued_at: now,
            active: true,
        };
        self.contracts
            .insert(contract.id, Arc::new(Mutex::new(contract.clone())));
        contract
    }

    /// Returns a point-in-time snapshot of a contract.
    #[must_use]
    pub fn get(&self, id: ContractId) -> Option<InvestmentContract> {
        self.contracts.get(&id).map(|entry| {
            entry
                .value()
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        })
    }

    /// Returns handles to every active contract, for the accrual tick.
    #[must_use]
    pub fn active(&self) -> Vec<Arc<Mutex<InvestmentContract>>> {
        self.contracts
            .iter()
            .filter(|entry| {
                entry
                    .value()
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .active
            })
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Lists contract snapshots for one account, newest first.
    #[must_use]
    pub fn by_account(&self, account_id: AccountId) -> Vec<InvestmentContract> {
        let mut contracts: Vec<InvestmentContract> = self
            .contracts
            .iter()
            .filter_map(|entry| {
                let contract = entry
                    .value()
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                (contract.account_id == account_id).then(|| contract.clone())
            })
            .collect();
        contracts.sort_by(|a, b| b.start_at.cmp(&a.start_at));
        contracts
    }
}
