//! Investment contract domain types.

use chrono::{DateTime, Utc};
use custodia_shared::types::{AccountId, ContractId, PlanId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One placement of a fixed principal under a plan's terms.
///
/// The ledger is debited for the principal when the underlying investment
/// transaction is submitted; profit is credited incrementally by the
/// accrual engine while the contract is active. The principal itself is
/// never credited back (see DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentContract {
    /// The contract ID.
    pub id: ContractId,
    /// The account holding the contract.
    pub account_id: AccountId,
    /// The plan whose terms apply.
    pub plan_id: PlanId,
    /// Principal amount placed.
    pub principal: Decimal,
    /// Total profit credited so far. Monotonically non-decreasing while
    /// the contract is active.
    pub accrued_profit: Decimal,
    /// When the contract opened.
    pub start_at: DateTime<Utc>,
    /// When the contract matures (`start_at` + plan duration).
    pub end_at: DateTime<Utc>,
    /// Watermark of the last successful accrual. Only advances together
    /// with a successful ledger credit, so a retried tick cannot
    /// double-credit.
    pub last_accrued_at: DateTime<Utc>,
    /// Whether the contract is still accruing.
    pub active: bool,
}

impl InvestmentContract {
    /// Returns true when the contract has passed its end timestamp.
    #[must_use]
    pub fn is_matured(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[test]
    fn test_is_matured() {
        let start = Utc::now();
        let contract = InvestmentContract {
            id: ContractId::new(),
            account_id: AccountId::new(),
            plan_id: PlanId::new(),
            principal: dec!(0.005),
            accrued_profit: Decimal::ZERO,
            start_at: start,
            end_at: start + Duration::days(30),
            last_accrued_at: start,
            active: true,
        };
        assert!(!contract.is_matured(start + Duration::days(29)));
        assert!(contract.is_matured(start + Duration::days(30)));
        assert!(contract.is_matured(start + Duration::days(31)));
    }
}
