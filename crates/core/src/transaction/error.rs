//! Transaction workflow error types.

use custodia_shared::types::{AccountId, PlanId, TransactionId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::ledger::LedgerError;

use super::types::TransactionStatus;

/// Errors that can occur during transaction workflow operations.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    NotFound(TransactionId),

    /// Amount must be strictly positive.
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Investment transactions must name a plan.
    #[error("Investment transactions require a plan")]
    MissingPlan,

    /// Plan not found or not accepting new contracts.
    #[error("Plan not found or inactive: {0}")]
    PlanNotFound(PlanId),

    /// Amount is below the plan's minimum.
    #[error("Amount {amount} is below the plan minimum {minimum}")]
    BelowMinimum {
        /// The plan's minimum principal.
        minimum: Decimal,
        /// The amount that was submitted.
        amount: Decimal,
    },

    /// The transaction is not in a status that permits the requested
    /// transition.
    #[error("Transaction is {current}, expected pending")]
    InvalidState {
        /// The status at the time of the attempt.
        current: TransactionStatus,
    },

    /// The transaction does not belong to the caller's account.
    #[error("Transaction {transaction} does not belong to account {account}")]
    NotOwner {
        /// The transaction that was targeted.
        transaction: TransactionId,
        /// The account that attempted the operation.
        account: AccountId,
    },

    /// An underlying ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl TransactionError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::MissingPlan => "PLAN_REQUIRED",
            Self::PlanNotFound(_) => "PLAN_NOT_FOUND",
            Self::BelowMinimum { .. } => "BELOW_MINIMUM",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::NotOwner { .. } => "NOT_OWNER",
            Self::Ledger(err) => err.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::PlanNotFound(_) => 404,
            Self::InvalidAmount(_) | Self::MissingPlan => 400,
            Self::BelowMinimum { .. } => 422,
            Self::InvalidState { .. } => 409,
            Self::NotOwner { .. } => 403,
            Self::Ledger(err) => err.http_status_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            TransactionError::NotFound(TransactionId::new()).error_code(),
            "TRANSACTION_NOT_FOUND"
        );
        assert_eq!(
            TransactionError::InvalidState {
                current: TransactionStatus::Confirmed,
            }
            .error_code(),
            "INVALID_STATE"
        );
        assert_eq!(
            TransactionError::Ledger(LedgerError::InsufficientFunds {
                available: dec!(0),
                requested: dec!(1),
            })
            .error_code(),
            "INSUFFICIENT_FUNDS"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            TransactionError::PlanNotFound(PlanId::new()).http_status_code(),
            404
        );
        assert_eq!(
            TransactionError::InvalidState {
                current: TransactionStatus::Rejected,
            }
            .http_status_code(),
            409
        );
        assert_eq!(
            TransactionError::NotOwner {
                transaction: TransactionId::new(),
                account: AccountId::new(),
            }
            .http_status_code(),
            403
        );
    }

    #[test]
    fn test_invalid_state_display() {
        let err = TransactionError::InvalidState {
            current: TransactionStatus::Confirmed,
        };
        assert_eq!(err.to_string(), "Transaction is confirmed, expected pending");
    }
}
