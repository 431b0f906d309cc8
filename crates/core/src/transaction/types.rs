//! Transaction domain types.

use chrono::{DateTime, Utc};
use custodia_shared::types::{AccountId, PlanId, TransactionId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of money movement a transaction requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Funds arriving from outside.
    Deposit,
    /// Funds leaving to outside.
    Withdrawal,
    /// Principal placed into an investment plan.
    Investment,
}

impl TransactionKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Investment => "investment",
        }
    }

    /// Parses a kind from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deposit" => Some(Self::Deposit),
            "withdrawal" => Some(Self::Withdrawal),
            "investment" => Some(Self::Investment),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction status in the approval workflow.
///
/// The only valid transitions are out of `Pending`:
/// - Pending → Confirmed (reviewer approves)
/// - Pending → Rejected (reviewer declines)
/// - Pending → Cancelled (account holder withdraws the request)
///
/// The three terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Awaiting review.
    Pending,
    /// Approved; the ledger effect has been applied.
    Confirmed,
    /// Declined by a reviewer.
    Rejected,
    /// Withdrawn by the account holder.
    Cancelled,
}

impl TransactionStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "rejected" => Some(Self::Rejected),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if no further transition is permitted.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Rejected | Self::Cancelled)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One money-movement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// The transaction ID.
    pub id: TransactionId,
    /// The account the movement concerns.
    pub account_id: AccountId,
    /// What kind of movement is requested.
    pub kind: TransactionKind,
    /// Amount to move (always positive).
    pub amount: Decimal,
    /// Current workflow status.
    pub status: TransactionStatus,
    /// Target plan, for investment transactions.
    pub plan_id: Option<PlanId>,
    /// User-supplied external reference (e.g. a payment proof string).
    pub external_ref: Option<String>,
    /// Reviewer who resolved the transaction.
    pub reviewer_id: Option<UserId>,
    /// Reviewer or holder notes attached at resolution.
    pub notes: Option<String>,
    /// When the transaction was submitted.
    pub created_at: DateTime<Utc>,
    /// When the transaction reached a terminal state.
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Input for submitting a new transaction.
#[derive(Debug, Clone)]
pub struct SubmitInput {
    /// The account submitting the request.
    pub account_id: AccountId,
    /// What kind of movement is requested.
    pub kind: TransactionKind,
    /// Amount to move.
    pub amount: Decimal,
    /// Target plan (investment only).
    pub plan_id: Option<PlanId>,
    /// Optional external reference.
    pub external_ref: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TransactionKind::Deposit)]
    #[case(TransactionKind::Withdrawal)]
    #[case(TransactionKind::Investment)]
    fn test_kind_roundtrip(#[case] kind: TransactionKind) {
        assert_eq!(TransactionKind::parse(kind.as_str()), Some(kind));
    }

    #[rstest]
    #[case(TransactionStatus::Pending)]
    #[case(TransactionStatus::Confirmed)]
    #[case(TransactionStatus::Rejected)]
    #[case(TransactionStatus::Cancelled)]
    fn test_status_roundtrip(#[case] status: TransactionStatus) {
        assert_eq!(TransactionStatus::parse(status.as_str()), Some(status));
    }

    #[test]
    fn test_parse_is_case_insensitive_and_rejects_unknown() {
        assert_eq!(TransactionKind::parse("transfer"), None);
        assert_eq!(
            TransactionStatus::parse("PENDING"),
            Some(TransactionStatus::Pending)
        );
        assert_eq!(TransactionStatus::parse("draft"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(TransactionStatus::Confirmed.is_terminal());
        assert!(TransactionStatus::Rejected.is_terminal());
        assert!(TransactionStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", TransactionKind::Deposit), "deposit");
        assert_eq!(format!("{}", TransactionStatus::Confirmed), "confirmed");
    }
}
