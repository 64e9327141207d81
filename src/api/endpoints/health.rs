//! Health endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;
use crate::config::APP_VERSION;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub llm_configured: bool,
    pub uptime_s: u64,
}

/// `GET /api/medical-ai/health` — liveness plus basic setup facts.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: APP_VERSION,
        llm_configured: ctx.llm_configured,
        uptime_s: ctx.monitor.uptime_secs(),
    })
}
