//! Multi-intent clinical triage.
//!
//! A patient message rarely carries one concern. "Chest pain and I'm
//! worried about my blood pressure meds" is a cardiac assessment, a
//! medication question, and an anxiety signal at once, and the pieces
//! change each other's urgency. This module detects every intent in a
//! message, scores how the detected intents interact, folds them into a
//! single clinical priority, and works out what the conversation still
//! needs to ask.

pub mod boost;
pub mod catalog;
pub mod classifier;
pub mod completeness;
pub mod compound;
pub mod interactions;
pub mod orchestrator;
pub mod pathway;
pub mod priority;
pub mod types;

pub use orchestrator::MultiIntentOrchestrator;
pub use types::{
    ClinicalPriority, ConversationPathway, IntentCandidate, IntentInteraction, InteractionType,
    MissingDetail, PriorityLevel, TriageAssessment, TriageError,
};
