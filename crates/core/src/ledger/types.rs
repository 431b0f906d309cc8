//! Ledger domain types.

use chrono::{DateTime, Utc};
use custodia_shared::types::{AccountId, Asset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A custodial account holding a single-asset balance.
///
/// Mutated only through [`Ledger`](super::Ledger) operations; the balance
/// is never negative after any single operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// The account ID.
    pub id: AccountId,
    /// Asset the balance is denominated in.
    pub asset: Asset,
    /// Current balance, normalized to 8 decimal places.
    pub balance: Decimal,
    /// Externally observable address watched by reconciliation, if any.
    pub external_address: Option<String>,
    /// When the account was opened.
    pub created_at: DateTime<Utc>,
}

/// Direction of a reconciliation adjustment, from the account's point
/// of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentDirection {
    /// The external balance was higher; funds were credited.
    Received,
    /// The external balance was lower; funds were debited.
    Sent,
}

impl AdjustmentDirection {
    /// Returns the string representation of the direction.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Sent => "sent",
        }
    }
}

impl std::fmt::Display for AdjustmentDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A corrective adjustment applied by reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    /// Whether funds were received or sent.
    pub direction: AdjustmentDirection,
    /// Magnitude of the adjustment (always positive).
    pub amount: Decimal,
    /// Balance after the adjustment was applied.
    pub new_balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_as_str() {
        assert_eq!(AdjustmentDirection::Received.as_str(), "received");
        assert_eq!(AdjustmentDirection::Sent.as_str(), "sent");
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(format!("{}", AdjustmentDirection::Received), "received");
    }
}
