//! Investment plan routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use rust_decimal::Decimal;
use serde::Serialize;

use custodia_core::plan::Plan;
use custodia_shared::types::PlanId;

use crate::AppState;
use crate::error::ApiError;

/// Creates the plan routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans))
        .route("/plans/{plan_id}", get(get_plan))
}

/// Response for an investment plan.
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    /// Plan ID.
    pub id: PlanId,
    /// Display name.
    pub name: String,
    /// Minimum principal for a new contract.
    pub min_amount: Decimal,
    /// Daily profit rate.
    pub daily_rate: Decimal,
    /// Contract duration in days.
    pub duration_days: u32,
    /// Whether the plan accepts new contracts.
    pub active: bool,
}

impl From<Plan> for PlanResponse {
    fn from(plan: Plan) -> Self {
        Self {
            id: plan.id,
            name: plan.name,
            min_amount: plan.min_amount,
            daily_rate: plan.daily_rate,
            duration_days: plan.duration_days,
            active: plan.active,
        }
    }
}

/// GET `/plans` - List every plan.
async fn list_plans(State(state): State<AppState>) -> Json<Vec<PlanResponse>> {
    let plans = state
        .plans
        .list()
        .into_iter()
        .map(PlanResponse::from)
        .collect();
    Json(plans)
}

/// GET `/plans/{plan_id}` - Fetch one plan.
async fn get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<PlanId>,
) -> Result<Json<PlanResponse>, ApiError> {
    let plan = state
        .plans
        .get(plan_id)
        .ok_or(custodia_core::transaction::TransactionError::PlanNotFound(plan_id))?;
    Ok(Json(PlanResponse::from(plan)))
}
