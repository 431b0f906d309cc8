//! Custodial account routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use custodia_core::accrual::InvestmentContract;
use custodia_core::ledger::Account;
use custodia_shared::types::{AccountId, Asset, ContractId, PageRequest, PageResponse, PlanId};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::transactions::TransactionResponse;

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(open_account))
        .route("/accounts/{account_id}", get(get_account))
        .route("/accounts/{account_id}/transactions", get(list_transactions))
        .route("/accounts/{account_id}/contracts", get(list_contracts))
}

/// Request body for opening an account.
#[derive(Debug, Deserialize)]
pub struct OpenAccountRequest {
    /// Asset the account is denominated in.
    #[serde(default = "default_asset")]
    pub asset: Asset,
    /// External address to watch for balance reconciliation.
    pub external_address: Option<String>,
}

fn default_asset() -> Asset {
    Asset::Btc
}

/// Response for an account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: AccountId,
    /// Asset the balance is denominated in.
    pub asset: Asset,
    /// Current balance.
    pub balance: Decimal,
    /// Watched external address, if any.
    pub external_address: Option<String>,
    /// When the account was opened.
    pub created_at: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            asset: account.asset,
            balance: account.balance,
            external_address: account.external_address,
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

/// Response for an investment contract.
#[derive(Debug, Serialize)]
pub struct ContractResponse {
    /// Contract ID.
    pub id: ContractId,
    /// Plan the contract runs under.
    pub plan_id: PlanId,
    /// Invested principal.
    pub principal: Decimal,
    /// Profit credited so far.
    pub accrued_profit: Decimal,
    /// Contract start.
    pub start_at: String,
    /// Contract maturity.
    pub end_at: String,
    /// Whether the contract is still accruing.
    pub active: bool,
}

impl From<InvestmentContract> for ContractResponse {
    fn from(contract: InvestmentContract) -> Self {
        Self {
            id: contract.id,
            plan_id: contract.plan_id,
            principal: contract.principal,
            accrued_profit: contract.accrued_profit,
            start_at: contract.start_at.to_rfc3339(),
            end_at: contract.end_at.to_rfc3339(),
            active: contract.active,
        }
    }
}

/// Query parameters for listing an account's transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Filter by status.
    pub status: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl ListTransactionsQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// POST `/accounts` - Open a new custodial account.
async fn open_account(
    State(state): State<AppState>,
    Json(payload): Json<OpenAccountRequest>,
) -> impl IntoResponse {
    let account =
        state
            .ledger
            .open_account(payload.asset, payload.external_address, state.clock.now());
    info!(account_id = %account.id, "account opened");
    (StatusCode::CREATED, Json(AccountResponse::from(account)))
}

/// GET `/accounts/{account_id}` - Fetch an account with its balance.
async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.ledger.account(account_id)?;
    Ok(Json(AccountResponse::from(account)))
}

/// GET `/accounts/{account_id}/transactions` - List the account's
/// transactions, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<PageResponse<TransactionResponse>>, ApiError> {
    // Listing an unknown account is a 404, not an empty list
    state.ledger.balance(account_id)?;

    let status = match query.status.as_deref() {
        Some(raw) => {
            let Some(status) = custodia_core::transaction::TransactionStatus::parse(raw) else {
                return Err(custodia_shared::AppError::Validation(format!(
                    "Unknown transaction status: {raw}"
                ))
                .into());
            };
            Some(status)
        }
        None => None,
    };
    let page = query.page_request();
    let all = state.transactions.list_for_account(account_id, status);
    let total = all.len() as u64;
    let data = all
        .into_iter()
        .skip(page.offset())
        .take(page.limit())
        .map(TransactionResponse::from)
        .collect();
    Ok(Json(PageResponse::new(data, page.page, page.per_page, total)))
}

/// GET `/accounts/{account_id}/contracts` - List the account's investment
/// contracts, newest first.
async fn list_contracts(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<Vec<ContractResponse>>, ApiError> {
    state.ledger.balance(account_id)?;

    let contracts = state
        .contracts
        .by_account(account_id)
        .into_iter()
        .map(ContractResponse::from)
        .collect();
    Ok(Json(contracts))
}
