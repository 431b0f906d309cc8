//! Transaction workflow routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use custodia_core::transaction::{SubmitInput, Transaction, TransactionKind};
use custodia_shared::types::{AccountId, PlanId, TransactionId, UserId};

use crate::AppState;
use crate::error::ApiError;

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(submit_transaction))
        .route("/transactions/{transaction_id}", get(get_transaction))
        .route("/transactions/{transaction_id}/confirm", post(confirm_transaction))
        .route("/transactions/{transaction_id}/reject", post(reject_transaction))
        .route("/transactions/{transaction_id}/cancel", post(cancel_transaction))
}

/// Request body for submitting a transaction.
#[derive(Debug, Deserialize)]
pub struct SubmitTransactionRequest {
    /// The account the movement concerns.
    pub account_id: AccountId,
    /// Transaction kind: deposit, withdrawal, or investment.
    pub kind: String,
    /// Amount to move.
    pub amount: Decimal,
    /// Target plan (investment only).
    pub plan_id: Option<PlanId>,
    /// Optional external reference, e.g. a payment proof.
    pub external_ref: Option<String>,
}

/// Request body for a reviewer decision.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    /// The reviewer resolving the transaction.
    pub reviewer_id: UserId,
    /// Optional notes attached to the decision.
    pub notes: Option<String>,
}

/// Request body for cancelling a transaction.
#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    /// The account holder requesting cancellation.
    pub account_id: AccountId,
}

/// Response for a transaction.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: TransactionId,
    /// The account the movement concerns.
    pub account_id: AccountId,
    /// Transaction kind.
    pub kind: &'static str,
    /// Amount to move.
    pub amount: Decimal,
    /// Workflow status.
    pub status: &'static str,
    /// Target plan (investment only).
    pub plan_id: Option<PlanId>,
    /// External reference, if any.
    pub external_ref: Option<String>,
    /// Reviewer who resolved the transaction.
    pub reviewer_id: Option<UserId>,
    /// Notes attached at resolution.
    pub notes: Option<String>,
    /// When the transaction was submitted.
    pub created_at: String,
    /// When the transaction reached a terminal state.
    pub resolved_at: Option<String>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            account_id: tx.account_id,
            kind: tx.kind.as_str(),
            amount: tx.amount,
            status: tx.status.as_str(),
            plan_id: tx.plan_id,
            external_ref: tx.external_ref,
            reviewer_id: tx.reviewer_id,
            notes: tx.notes,
            created_at: tx.created_at.to_rfc3339(),
            resolved_at: tx.resolved_at.map(|at| at.to_rfc3339()),
        }
    }
}

/// POST `/transactions` - Submit a new transaction for review.
async fn submit_transaction(
    State(state): State<AppState>,
    Json(payload): Json<SubmitTransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(kind) = TransactionKind::parse(&payload.kind) else {
        return Err(custodia_shared::AppError::Validation(format!(
            "Unknown transaction kind: {}",
            payload.kind
        ))
        .into());
    };

    let transaction = state.transactions.submit(SubmitInput {
        account_id: payload.account_id,
        kind,
        amount: payload.amount,
        plan_id: payload.plan_id,
        external_ref: payload.external_ref,
    })?;
    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse::from(transaction)),
    ))
}

/// GET `/transactions/{transaction_id}` - Fetch one transaction.
async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let transaction = state.transactions.get(transaction_id)?;
    Ok(Json(TransactionResponse::from(transaction)))
}

/// POST `/transactions/{transaction_id}/confirm` - Approve a pending
/// transaction and apply its ledger effect.
async fn confirm_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<TransactionId>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let transaction =
        state
            .transactions
            .confirm(transaction_id, payload.reviewer_id, payload.notes)?;
    Ok(Json(TransactionResponse::from(transaction)))
}

/// POST `/transactions/{transaction_id}/reject` - Decline a pending
/// transaction, refunding any reserved principal.
async fn reject_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<TransactionId>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let transaction =
        state
            .transactions
            .reject(transaction_id, payload.reviewer_id, payload.notes)?;
    Ok(Json(TransactionResponse::from(transaction)))
}

/// POST `/transactions/{transaction_id}/cancel` - Withdraw a pending
/// transaction as the account holder.
async fn cancel_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<TransactionId>,
    Json(payload): Json<CancelRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let transaction = state.transactions.cancel(transaction_id, payload.account_id)?;
    Ok(Json(TransactionResponse::from(transaction)))
}
