//! Multi-symptom compound patterns.
//!
//! A handful of fixed phrase templates that catch symptom combinations a
//! per-intent keyword scan misses (chest pain radiating to the arm, one-sided
//! weakness with slurred speech). Each match asserts a primary intent at full
//! confidence and implies a secondary intent at a discounted confidence.

use std::sync::LazyLock;

use regex::Regex;

use super::catalog;
use super::types::IntentCandidate;

/// Confidence discount applied to the secondary intent a compound match implies.
pub const SECONDARY_DISCOUNT: f64 = 0.7;

/// A compiled compound template.
struct CompoundPattern {
    id: &'static str,
    regex: Regex,
    primary_intent: &'static str,
    primary_confidence: f64,
    secondary_intent: &'static str,
    description: &'static str,
}

static COMPOUND_PATTERNS: LazyLock<Vec<CompoundPattern>> = LazyLock::new(|| {
    vec![
        pattern(
            "CMP-001",
            r"(?i)\bchest\s+(?:pain|pressure|tightness)\b.{0,80}\b(?:left\s+arm|arm|jaw|shoulder|back)\b",
            catalog::CARDIAC_CHEST_PAIN,
            0.95,
            catalog::PAIN_ASSESSMENT,
            "Chest pain radiating to arm/jaw/shoulder",
        ),
        pattern(
            "CMP-002",
            r"(?i)\bchest\s+(?:pain|pressure|tightness)\b.{0,120}\b(?:short(?:ness)?\s+of\s+breath|can'?t\s+breathe|difficulty\s+breathing|trouble\s+breathing)\b",
            catalog::CARDIAC_CHEST_PAIN,
            0.95,
            catalog::BREATHING_DIFFICULTY,
            "Chest pain with dyspnea",
        ),
        pattern(
            "CMP-003",
            r"(?i)\b(?:numb(?:ness)?|weak(?:ness)?)\b.{0,80}\b(?:one\s+side|left\s+side|right\s+side|face)\b|\bslurr(?:ed|ing)\b.{0,20}\bspeech\b|\bface\s+(?:is\s+)?droop",
            catalog::NEUROLOGICAL,
            0.9,
            catalog::SYMPTOM_REPORTING,
            "Unilateral weakness / slurred speech / facial droop",
        ),
        pattern(
            "CMP-004",
            r"(?i)\b(?:fever|high\s+temperature)\b.{0,100}\b(?:stiff\s+neck|neck\s+stiffness|rash\s+that\s+doesn'?t\s+fade|purple\s+rash)\b",
            catalog::SYMPTOM_REPORTING,
            0.85,
            catalog::EMERGENCY_ESCALATION,
            "Fever with stiff neck or non-blanching rash",
        ),
        pattern(
            "CMP-005",
            r"(?i)\b(?:worried|anxious|scared|afraid)\b.{0,100}\b(?:heart|chest|heart\s+attack)\b",
            catalog::ANXIETY_CONCERN,
            0.8,
            catalog::CARDIAC_CHEST_PAIN,
            "Anxiety focused on cardiac symptoms",
        ),
        pattern(
            "CMP-006",
            r"(?i)\b(?:medication|medicine|pill|tablet)s?\b.{0,100}\b(?:reaction|side\s+effects?|rash|swelling|itch(?:y|ing)?)\b",
            catalog::MEDICATION_QUESTION,
            0.85,
            catalog::SYMPTOM_REPORTING,
            "Medication with suspected adverse reaction",
        ),
    ]
});

fn pattern(
    id: &'static str,
    regex_str: &str,
    primary_intent: &'static str,
    primary_confidence: f64,
    secondary_intent: &'static str,
    description: &'static str,
) -> CompoundPattern {
    CompoundPattern {
        id,
        regex: Regex::new(regex_str).expect("Invalid compound pattern regex"),
        primary_intent,
        primary_confidence,
        secondary_intent,
        description,
    }
}

/// Scan the message against every compound template.
///
/// Returns primary and secondary candidates for each matching pattern.
/// Duplicate intents across patterns are kept; the classifier merge keeps
/// the maximum confidence per intent.
pub fn detect_compound_intents(message: &str) -> Vec<IntentCandidate> {
    let mut candidates = Vec::new();

    for cp in COMPOUND_PATTERNS.iter() {
        if cp.regex.is_match(message) {
            tracing::debug!(
                pattern_id = cp.id,
                primary = cp.primary_intent,
                secondary = cp.secondary_intent,
                "compound pattern matched: {}",
                cp.description
            );
            candidates.push(IntentCandidate::new(cp.primary_intent, cp.primary_confidence));
            candidates.push(IntentCandidate::new(
                cp.secondary_intent,
                cp.primary_confidence * SECONDARY_DISCOUNT,
            ));
        }
    }

    candidates
}
