//! Consultation session state.
//!
//! In-memory store keyed by consultation id. The `context` map is opaque:
//! callers hand us JSON, we shallow-merge and hand it back, never enforcing
//! a schema on it. Active intents carry across turns so a short follow-up
//! ("recently") keeps the clinical thread of the conversation.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Turns kept per session; older ones are dropped from the front.
const MAX_TURNS: usize = 50;

// ---------------------------------------------------------------------------
// ConversationStage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStage {
    Greeting,
    GatheringInfo,
    Assessment,
    Recommendation,
    EmergencyEscalation,
    Completed,
}

impl ConversationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::GatheringInfo => "gathering_info",
            Self::Assessment => "assessment",
            Self::Recommendation => "recommendation",
            Self::EmergencyEscalation => "emergency_escalation",
            Self::Completed => "completed",
        }
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub message: String,
    pub urgency: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub consultation_id: String,
    pub patient_id: String,
    pub stage: ConversationStage,
    /// Opaque passthrough map owned by the caller.
    pub context: serde_json::Map<String, serde_json::Value>,
    /// Intent names seen in recent turns, for cross-turn carryover.
    pub active_intents: Vec<String>,
    pub turns: Vec<TurnRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    fn new(patient_id: &str, context: Option<serde_json::Map<String, serde_json::Value>>) -> Self {
        let now = Utc::now();
        Self {
            consultation_id: Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            stage: ConversationStage::Greeting,
            context: context.unwrap_or_default(),
            active_intents: Vec::new(),
            turns: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// What one processed message changes on its session.
pub struct TurnOutcome {
    pub stage: ConversationStage,
    pub intents: Vec<String>,
    pub message: String,
    pub urgency: String,
    pub context_patch: Option<serde_json::Map<String, serde_json::Value>>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("consultation not found: {0}")]
    NotFound(String),

    #[error("session store lock poisoned")]
    LockFailed,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// In-memory session store backed by RwLock.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Open a fresh consultation at the greeting stage.
    pub fn initialize(
        &self,
        patient_id: &str,
        context: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<SessionState, SessionError> {
        let session = SessionState::new(patient_id, context);
        let mut sessions = self.sessions.write().map_err(|_| SessionError::LockFailed)?;
        sessions.insert(session.consultation_id.clone(), session.clone());
        tracing::info!(
            consultation_id = %session.consultation_id,
            patient_id,
            "consultation initialized"
        );
        Ok(session)
    }

    pub fn get(&self, consultation_id: &str) -> Result<Option<SessionState>, SessionError> {
        let sessions = self.sessions.read().map_err(|_| SessionError::LockFailed)?;
        Ok(sessions.get(consultation_id).cloned())
    }

    /// Resolve the session for a message turn. Unknown or absent ids start a
    /// new consultation; the original web clients relied on that.
    pub fn fetch_or_create(
        &self,
        consultation_id: Option<&str>,
        patient_id: &str,
        context: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<SessionState, SessionError> {
        if let Some(id) = consultation_id {
            if let Some(existing) = self.get(id)? {
                return Ok(existing);
            }
            tracing::debug!(consultation_id = id, "unknown consultation id, starting fresh");
        }
        self.initialize(patient_id, context)
    }

    /// Apply one processed turn: merge caller context over the stored map,
    /// advance the stage, refresh active intents, append the turn record.
    /// Returns the updated session.
    pub fn apply_turn(
        &self,
        consultation_id: &str,
        outcome: TurnOutcome,
    ) -> Result<SessionState, SessionError> {
        let mut sessions = self.sessions.write().map_err(|_| SessionError::LockFailed)?;
        let session = sessions
            .get_mut(consultation_id)
            .ok_or_else(|| SessionError::NotFound(consultation_id.to_string()))?;

        if let Some(patch) = outcome.context_patch {
            for (key, value) in patch {
                session.context.insert(key, value);
            }
        }
        for intent in outcome.intents {
            if !session.active_intents.contains(&intent) {
                session.active_intents.push(intent);
            }
        }
        session.stage = outcome.stage;
        session.turns.push(TurnRecord {
            message: outcome.message,
            urgency: outcome.urgency,
            at: Utc::now(),
        });
        if session.turns.len() > MAX_TURNS {
            let excess = session.turns.len() - MAX_TURNS;
            session.turns.drain(..excess);
        }
        session.updated_at = Utc::now();
        Ok(session.clone())
    }

    pub fn session_count(&self) -> Result<usize, SessionError> {
        let sessions = self.sessions.read().map_err(|_| SessionError::LockFailed)?;
        Ok(sessions.len())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
