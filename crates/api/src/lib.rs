//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for accounts, transactions, plans, and contracts
//! - Error-to-response mapping
//! - Shared application state

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use custodia_core::accrual::ContractBook;
use custodia_core::clock::Clock;
use custodia_core::ledger::Ledger;
use custodia_core::plan::PlanRegistry;
use custodia_core::reconcile::ReconcileHealth;
use custodia_core::transaction::TransactionService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Authoritative balance store.
    pub ledger: Arc<Ledger>,
    /// Transaction approval workflow.
    pub transactions: Arc<TransactionService>,
    /// Open investment contracts.
    pub contracts: Arc<ContractBook>,
    /// Available investment plans.
    pub plans: Arc<dyn PlanRegistry>,
    /// Time source for request handling.
    pub clock: Arc<dyn Clock>,
    /// Health of the background reconciliation loop.
    pub reconcile_health: Arc<ReconcileHealth>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
