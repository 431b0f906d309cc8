//! Maps domain errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use custodia_core::ledger::LedgerError;
use custodia_core::transaction::TransactionError;
use custodia_shared::AppError;

/// A domain error on its way out as an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    /// Error from the transaction workflow.
    Transaction(TransactionError),
    /// Error from the ledger.
    Ledger(LedgerError),
    /// Request failed validation before reaching the domain.
    App(AppError),
}

impl From<TransactionError> for ApiError {
    fn from(err: TransactionError) -> Self {
        Self::Transaction(err)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl ApiError {
    fn parts(&self) -> (u16, &'static str, String) {
        match self {
            Self::Transaction(err) => (err.http_status_code(), err.error_code(), err.to_string()),
            Self::Ledger(err) => (err.http_status_code(), err.error_code(), err.to_string()),
            Self::App(err) => (err.status_code(), err.error_code(), err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let status =
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            Json(json!({
                "error": code.to_ascii_lowercase(),
                "message": message
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custodia_shared::types::TransactionId;

    #[test]
    fn test_transaction_error_maps_status_and_code() {
        let err = ApiError::from(TransactionError::NotFound(TransactionId::new()));
        let (status, code, _) = err.parts();
        assert_eq!(status, 404);
        assert_eq!(code, "TRANSACTION_NOT_FOUND");
    }

    #[test]
    fn test_ledger_error_maps_through_transaction_wrapper() {
        use rust_decimal::Decimal;

        let err = ApiError::from(TransactionError::Ledger(LedgerError::InsufficientFunds {
            available: Decimal::ZERO,
            requested: Decimal::ONE,
        }));
        let (status, code, _) = err.parts();
        assert_eq!(status, 422);
        assert_eq!(code, "INSUFFICIENT_FUNDS");
    }

    #[test]
    fn test_validation_error_is_bad_request() {
        let err = ApiError::from(AppError::Validation("bad kind".into()));
        let (status, code, message) = err.parts();
        assert_eq!(status, 400);
        assert_eq!(code, "VALIDATION_ERROR");
        assert_eq!(message, "Validation error: bad kind");
    }
}
