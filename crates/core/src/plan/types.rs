//! Plan domain types.

use chrono::Duration;
use custodia_shared::types::PlanId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An investment plan: the terms under which a contract accrues profit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// The plan ID.
    pub id: PlanId,
    /// Human-readable plan name.
    pub name: String,
    /// Minimum principal accepted by the plan.
    pub min_amount: Decimal,
    /// Daily return rate as a fraction of principal (e.g. 0.0075 for 0.75%/day).
    pub daily_rate: Decimal,
    /// Contract duration in days.
    pub duration_days: u32,
    /// Whether the plan accepts new contracts.
    pub active: bool,
}

impl Plan {
    /// Returns the contract duration as a chrono `Duration`.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::days(i64::from(self.duration_days))
    }
}
