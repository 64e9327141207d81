//! Monitoring dashboard endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::monitor::DashboardSnapshot;
use crate::safety::ValidationStats;

#[derive(Serialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub monitoring: DashboardSnapshot,
    pub validation: ValidationStats,
}

/// `GET /api/medical-ai/dashboard` — counters, priority mix, recent
/// assessments, and the state of the validation queue.
pub async fn snapshot(
    State(ctx): State<ApiContext>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let monitoring = ctx.monitor.snapshot();
    let validation = ctx.workflow.stats()?;
    Ok(Json(DashboardResponse {
        monitoring,
        validation,
    }))
}
