use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::llm::LlmError;
use crate::session::ConversationStage;

// ---------------------------------------------------------------------------
// IntentCandidate
// ---------------------------------------------------------------------------

/// One detected intent with its confidence.
///
/// Confidence is clamped to [0,1] at construction so every producer
/// (keyword scorer, LLM parser, compound detector, booster) upholds the
/// invariant without re-checking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntentCandidate {
    pub name: String,
    pub confidence: f64,
}

impl IntentCandidate {
    pub fn new(name: impl Into<String>, confidence: f64) -> Self {
        Self {
            name: name.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

// ---------------------------------------------------------------------------
// PriorityLevel
// ---------------------------------------------------------------------------

/// Ordinal urgency bucket. Variant order matters: derived `Ord` gives
/// `Routine < Low < Moderate < High < Critical < Emergency`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PriorityLevel {
    Routine,
    Low,
    Moderate,
    High,
    Critical,
    Emergency,
}

impl PriorityLevel {
    /// Bucket a numeric score (0-10) into a level.
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            Self::Emergency
        } else if score >= 7.5 {
            Self::Critical
        } else if score >= 6.0 {
            Self::High
        } else if score >= 4.0 {
            Self::Moderate
        } else if score >= 2.0 {
            Self::Low
        } else {
            Self::Routine
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Critical => "critical",
            Self::High => "high",
            Self::Moderate => "moderate",
            Self::Low => "low",
            Self::Routine => "routine",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "emergency" => Some(Self::Emergency),
            "critical" => Some(Self::Critical),
            "high" => Some(Self::High),
            "moderate" => Some(Self::Moderate),
            "low" => Some(Self::Low),
            "routine" => Some(Self::Routine),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ClinicalPriority
// ---------------------------------------------------------------------------

/// The folded priority for one message: ordinal level, numeric score,
/// the intent that drove it, and a patient-facing recommended action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalPriority {
    pub level: PriorityLevel,
    /// Clamped to [0,10].
    pub score: f64,
    pub driving_intent: String,
    pub recommended_action: String,
}

// ---------------------------------------------------------------------------
// Intent interactions
// ---------------------------------------------------------------------------

/// How two simultaneously detected intents influence each other's urgency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    Synergistic,
    Contradictory,
    Sequential,
    Independent,
    Masking,
    Amplifying,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Synergistic => "synergistic",
            Self::Contradictory => "contradictory",
            Self::Sequential => "sequential",
            Self::Independent => "independent",
            Self::Masking => "masking",
            Self::Amplifying => "amplifying",
        }
    }
}

/// Annotation for one unordered intent pair, computed per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentInteraction {
    pub intent_a: String,
    pub intent_b: String,
    pub interaction_type: InteractionType,
    /// How clinically meaningful the pairing is, in [0,1].
    pub clinical_significance: f64,
    /// Added to the priority score fold. May be 0.
    pub priority_modifier: f64,
    pub rationale: String,
}

// ---------------------------------------------------------------------------
// Completeness
// ---------------------------------------------------------------------------

/// A clinical detail the message should have contained but did not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingDetail {
    /// Slot label, e.g. `pain_quality`.
    pub slot: String,
    /// Intent whose slot table flagged it.
    pub intent: String,
    /// Concrete follow-up question for the patient.
    pub question: String,
}

// ---------------------------------------------------------------------------
// ConversationPathway
// ---------------------------------------------------------------------------

/// Predicted continuation of the consultation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationPathway {
    pub next_stage: ConversationStage,
    pub focus_intent: String,
    pub suggested_topics: Vec<String>,
    pub rationale: String,
}

// ---------------------------------------------------------------------------
// TriageAssessment
// ---------------------------------------------------------------------------

/// Full output of one orchestration pass over a patient message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageAssessment {
    pub id: Uuid,
    /// Ranked, at most 5, confidence-descending.
    pub intents: Vec<IntentCandidate>,
    pub interactions: Vec<IntentInteraction>,
    pub priority: ClinicalPriority,
    pub pathway: ConversationPathway,
    pub missing_details: Vec<MissingDetail>,
    /// At most 3, derived from `missing_details`.
    pub follow_up_questions: Vec<String>,
    /// True when the pipeline errored and this is the canned fallback.
    pub fallback: bool,
    pub assessed_at: DateTime<Utc>,
    pub processing_ms: u64,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("message is empty")]
    EmptyInput,

    #[error("no intents detected in message")]
    NoIntentsDetected,

    #[error("llm error: {0}")]
    Llm(#[from] LlmError),
}
