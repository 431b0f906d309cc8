//! Health check endpoints.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status: `healthy`, or `degraded` when the reconciliation
    /// loop has been failing and balances may be stale.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Consecutive failed reconciliation ticks.
    pub reconcile_failures: u32,
}

/// Health check handler.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.reconcile_health.is_degraded() {
        "degraded"
    } else {
        "healthy"
    };
    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        reconcile_failures: state.reconcile_health.consecutive_failures(),
    })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
