//! Consultation endpoints.
//!
//! - `POST /api/medical-ai/initialize` — open a consultation, return the greeting
//! - `POST /api/medical-ai/message` — triage one patient message
//!
//! The message handler is the whole per-turn flow: assess, compose the
//! reply, run safety validation, persist, maybe open a review case, then
//! advance the session. Database failures surface as 500; LLM trouble
//! never does, the pipeline degrades internally instead.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::{insert_assessment, insert_safety_alerts, AssessmentRecord};
use crate::empathy;
use crate::safety;
use crate::session::TurnOutcome;

const MAX_MESSAGE_CHARS: usize = 4000;

type ContextMap = serde_json::Map<String, serde_json::Value>;

#[derive(Deserialize)]
pub struct InitializeRequest {
    pub patient_id: String,
    pub context: Option<ContextMap>,
}

#[derive(Serialize)]
pub struct InitializeResponse {
    pub consultation_id: String,
    pub response: &'static str,
    pub context: ContextMap,
    pub stage: &'static str,
}

/// `POST /api/medical-ai/initialize` — open a fresh consultation.
pub async fn initialize(
    State(ctx): State<ApiContext>,
    Json(req): Json<InitializeRequest>,
) -> Result<Json<InitializeResponse>, ApiError> {
    if req.patient_id.trim().is_empty() {
        return Err(ApiError::BadRequest("patient_id is required".into()));
    }

    let session = ctx.sessions.initialize(&req.patient_id, req.context)?;
    Ok(Json(InitializeResponse {
        consultation_id: session.consultation_id,
        response: empathy::GREETING,
        context: session.context,
        stage: session.stage.as_str(),
    }))
}

#[derive(Deserialize)]
pub struct MessageRequest {
    pub patient_id: String,
    pub message: String,
    pub consultation_id: Option<String>,
    pub context: Option<ContextMap>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub consultation_id: String,
    pub response: String,
    pub context: ContextMap,
    pub stage: &'static str,
    pub urgency: &'static str,
    pub next_questions: Vec<String>,
}

/// `POST /api/medical-ai/message` — triage one patient message.
///
/// A missing or unknown `consultation_id` starts a new consultation
/// rather than erroring; the original web clients relied on that.
pub async fn message(
    State(ctx): State<ApiContext>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if req.patient_id.trim().is_empty() {
        return Err(ApiError::BadRequest("patient_id is required".into()));
    }
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".into()));
    }
    if req.message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Message too long (max {MAX_MESSAGE_CHARS} chars)"
        )));
    }

    let session = ctx.sessions.fetch_or_create(
        req.consultation_id.as_deref(),
        &req.patient_id,
        req.context.clone(),
    )?;

    let assessment = ctx
        .orchestrator
        .assess(&req.message, session.stage, &session.active_intents)
        .await;
    let response_text = ctx.composer.compose(&assessment).await;

    let flags = safety::validate_assessment(&req.message, &assessment, &response_text);
    ctx.monitor.record_safety_flags(flags.len());

    // Alerts and cases reference the assessment row, so it goes in first.
    let record = AssessmentRecord::from_assessment(
        &assessment,
        &session.consultation_id,
        &req.patient_id,
        &response_text,
    );
    ctx.db.with_conn(|conn| {
        insert_assessment(conn, &record)?;
        insert_safety_alerts(conn, &assessment.id, &flags)
    })?;
    ctx.workflow.maybe_open_case(&assessment, &flags)?;

    let updated = ctx.sessions.apply_turn(
        &session.consultation_id,
        TurnOutcome {
            stage: assessment.pathway.next_stage,
            intents: assessment.intents.iter().map(|i| i.name.clone()).collect(),
            message: req.message,
            urgency: assessment.priority.level.as_str().to_string(),
            context_patch: req.context,
        },
    )?;

    Ok(Json(MessageResponse {
        consultation_id: updated.consultation_id,
        response: response_text,
        context: updated.context,
        stage: updated.stage.as_str(),
        urgency: assessment.priority.level.as_str(),
        next_questions: assessment.follow_up_questions,
    }))
}
