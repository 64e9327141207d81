//! Incompleteness detection.
//!
//! Clinical intents expect certain details (pain quality, severity, onset
//! timing). Each slot has a vocabulary regex that counts as "filled" and a
//! concrete follow-up question for when it is not. Vague temporal wording
//! ("recently", "a while") never fills the onset slot; the onset question
//! always offers concrete units instead.

use std::sync::LazyLock;

use regex::Regex;

use super::catalog;
use super::types::{IntentCandidate, MissingDetail};

/// Follow-up questions surfaced per turn.
pub const MAX_FOLLOW_UP_QUESTIONS: usize = 3;

struct DetailSlot {
    slot: &'static str,
    /// Detecting any of these intents makes the slot required.
    intents: &'static [&'static str],
    filled: Regex,
    question: &'static str,
}

static DETAIL_SLOTS: LazyLock<Vec<DetailSlot>> = LazyLock::new(|| {
    vec![
        slot(
            "pain_quality",
            &[catalog::CARDIAC_CHEST_PAIN, catalog::PAIN_ASSESSMENT],
            r"(?i)\b(?:sharp|dull|burning|crushing|stabbing|aching|throbbing|squeezing|tearing|pressure|tight(?:ness)?)\b",
            "Can you describe what the pain feels like? For example, is it sharp, dull, burning, or crushing?",
        ),
        slot(
            "pain_severity",
            &[catalog::CARDIAC_CHEST_PAIN, catalog::PAIN_ASSESSMENT],
            r"(?i)\b(?:[0-9]|10)\s*(?:/|out\s+of)\s*10\b|\b(?:mild|moderate|severe|excruciating|unbearable|worst)\b",
            "On a scale of 1 to 10, how severe is the pain right now?",
        ),
        slot(
            "onset_timing",
            &[
                catalog::CARDIAC_CHEST_PAIN,
                catalog::PAIN_ASSESSMENT,
                catalog::BREATHING_DIFFICULTY,
                catalog::NEUROLOGICAL,
                catalog::SYMPTOM_REPORTING,
            ],
            r"(?i)\b\d+\s*(?:minutes?|mins?|hours?|hrs?|days?|weeks?|months?|years?)\b|\b(?:today|yesterday|this\s+morning|last\s+night|just\s+now)\b|\ba\s+few\s+(?:minutes|hours|days|weeks)\b|\ban?\s+(?:hour|day|week|month)\s+ago\b",
            "When did this start? Roughly how many hours, days, or weeks ago?",
        ),
        slot(
            "trigger_context",
            &[catalog::BREATHING_DIFFICULTY],
            r"(?i)\b(?:at\s+rest|resting|lying\s+down|walking|climbing|stairs|exertion|exercise|exercising)\b",
            "Does the breathing difficulty happen at rest, or only with activity like walking or climbing stairs?",
        ),
        slot(
            "medication_name",
            &[catalog::MEDICATION_QUESTION],
            r"(?i)\b(?:aspirin|ibuprofen|paracetamol|acetaminophen|metformin|insulin|lisinopril|atorvastatin|amlodipine|omeprazole|warfarin|levothyroxine|statin|beta.?blocker)\b",
            "Which medication is this about? The name on the label helps me answer accurately.",
        ),
    ]
});

fn slot(
    slot: &'static str,
    intents: &'static [&'static str],
    filled_regex: &str,
    question: &'static str,
) -> DetailSlot {
    DetailSlot {
        slot,
        intents,
        filled: Regex::new(filled_regex).expect("Invalid detail slot regex"),
        question,
    }
}

static VAGUE_TEMPORAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:recently|lately|a\s+while|for\s+some\s+time|some\s+time\s+ago)\b")
        .expect("Invalid vague temporal regex")
});

/// Whether the message leans on vague time wording instead of a concrete
/// timeframe.
pub fn has_vague_temporal(message: &str) -> bool {
    VAGUE_TEMPORAL.is_match(message)
}

/// Detect expected-but-absent clinical details.
///
/// A slot is required when any detected intent appears in its intent list,
/// and missing when its filled-vocabulary regex finds nothing in the
/// message. Slot-table order is question order.
pub fn detect_missing_details(
    message: &str,
    candidates: &[IntentCandidate],
) -> Vec<MissingDetail> {
    let mut missing = Vec::new();
    for ds in DETAIL_SLOTS.iter() {
        let requiring = ds
            .intents
            .iter()
            .find(|intent| candidates.iter().any(|c| c.name == **intent));
        let Some(intent) = requiring else {
            continue;
        };
        if ds.filled.is_match(message) {
            continue;
        }
        missing.push(MissingDetail {
            slot: ds.slot.to_string(),
            intent: intent.to_string(),
            question: ds.question.to_string(),
        });
    }

    if !missing.is_empty() && has_vague_temporal(message) {
        tracing::debug!(slots = missing.len(), "vague temporal wording, asking for concrete timeframe");
    }
    missing
}

/// First few follow-up questions, slot-table order.
pub fn follow_up_questions(missing: &[MissingDetail]) -> Vec<String> {
    missing
        .iter()
        .take(MAX_FOLLOW_UP_QUESTIONS)
        .map(|m| m.question.clone())
        .collect()
}
