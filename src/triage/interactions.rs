//! Pairwise intent interactions.
//!
//! For every unordered pair of detected intents: look the pair up in the
//! static rule table (either key order), and when no rule exists fall back
//! to three hard-coded heuristics in first-match-wins order. The resulting
//! modifiers feed the priority fold.

use super::catalog;
use super::types::{IntentCandidate, IntentInteraction, InteractionType};

/// Confidence delta under which two intents count as near-equal (H3).
pub const NEAR_EQUAL_CONFIDENCE_DELTA: f64 = 0.15;

struct InteractionRule {
    key_a: &'static str,
    key_b: &'static str,
    interaction_type: InteractionType,
    clinical_significance: f64,
    priority_modifier: f64,
    rationale: &'static str,
}

/// Hand-authored pair table. Order matters: the first matching rule wins.
static INTERACTION_RULES: &[InteractionRule] = &[
    InteractionRule {
        key_a: catalog::CARDIAC_CHEST_PAIN,
        key_b: catalog::MEDICATION_QUESTION,
        interaction_type: InteractionType::Amplifying,
        clinical_significance: 0.9,
        priority_modifier: 0.75,
        rationale: "Medication decisions during possible cardiac symptoms raise the stakes of both",
    },
    InteractionRule {
        key_a: catalog::CARDIAC_CHEST_PAIN,
        key_b: catalog::BREATHING_DIFFICULTY,
        interaction_type: InteractionType::Synergistic,
        clinical_significance: 0.95,
        priority_modifier: 1.0,
        rationale: "Chest pain with dyspnea is a classic acute coronary presentation",
    },
    InteractionRule {
        key_a: catalog::CARDIAC_CHEST_PAIN,
        key_b: catalog::ANXIETY_CONCERN,
        interaction_type: InteractionType::Masking,
        clinical_significance: 0.8,
        priority_modifier: 0.5,
        rationale: "Anxiety can mask cardiac symptoms; both need ruling out",
    },
    InteractionRule {
        key_a: catalog::BREATHING_DIFFICULTY,
        key_b: catalog::ANXIETY_CONCERN,
        interaction_type: InteractionType::Masking,
        clinical_significance: 0.75,
        priority_modifier: 0.4,
        rationale: "Hyperventilation and organic dyspnea are hard to tell apart",
    },
    InteractionRule {
        key_a: catalog::NEUROLOGICAL,
        key_b: catalog::SYMPTOM_REPORTING,
        interaction_type: InteractionType::Synergistic,
        clinical_significance: 0.7,
        priority_modifier: 0.4,
        rationale: "Neurological signs with systemic symptoms broaden the differential",
    },
    InteractionRule {
        key_a: catalog::PAIN_ASSESSMENT,
        key_b: catalog::SYMPTOM_REPORTING,
        interaction_type: InteractionType::Synergistic,
        clinical_significance: 0.6,
        priority_modifier: 0.25,
        rationale: "Pain alongside other symptoms points at one underlying picture",
    },
    InteractionRule {
        key_a: catalog::SYMPTOM_REPORTING,
        key_b: catalog::MEDICATION_QUESTION,
        interaction_type: InteractionType::Sequential,
        clinical_significance: 0.6,
        priority_modifier: 0.25,
        rationale: "Symptoms should be assessed before medication guidance",
    },
    InteractionRule {
        key_a: catalog::SYMPTOM_REPORTING,
        key_b: catalog::ANXIETY_CONCERN,
        interaction_type: InteractionType::Synergistic,
        clinical_significance: 0.55,
        priority_modifier: 0.2,
        rationale: "Worry about reported symptoms deserves acknowledgment alongside triage",
    },
    InteractionRule {
        key_a: catalog::APPOINTMENT_SCHEDULING,
        key_b: catalog::EMERGENCY_ESCALATION,
        interaction_type: InteractionType::Contradictory,
        clinical_significance: 0.85,
        priority_modifier: 0.5,
        rationale: "Booking a routine visit during an emergency needs immediate redirection",
    },
    InteractionRule {
        key_a: catalog::MEDICATION_QUESTION,
        key_b: catalog::CHRONIC_CONDITION,
        interaction_type: InteractionType::Sequential,
        clinical_significance: 0.5,
        priority_modifier: 0.1,
        rationale: "Medication questions in chronic care follow the management plan",
    },
    InteractionRule {
        key_a: catalog::GENERAL_INQUIRY,
        key_b: catalog::APPOINTMENT_SCHEDULING,
        interaction_type: InteractionType::Independent,
        clinical_significance: 0.2,
        priority_modifier: 0.0,
        rationale: "Administrative requests proceed independently",
    },
];

fn find_rule(a: &str, b: &str) -> Option<&'static InteractionRule> {
    INTERACTION_RULES.iter().find(|r| {
        (r.key_a == a && r.key_b == b) || (r.key_a == b && r.key_b == a)
    })
}

/// Classify one unordered pair: table first, then heuristics.
pub fn classify_pair(a: &IntentCandidate, b: &IntentCandidate) -> IntentInteraction {
    if let Some(rule) = find_rule(&a.name, &b.name) {
        tracing::debug!(
            intent_a = %a.name,
            intent_b = %b.name,
            interaction = rule.interaction_type.as_str(),
            "interaction rule matched"
        );
        return IntentInteraction {
            intent_a: a.name.clone(),
            intent_b: b.name.clone(),
            interaction_type: rule.interaction_type,
            clinical_significance: rule.clinical_significance,
            priority_modifier: rule.priority_modifier,
            rationale: rule.rationale.to_string(),
        };
    }

    // H1: any emergency intent amplifies whatever it co-occurs with.
    if catalog::is_emergency(&a.name) || catalog::is_emergency(&b.name) {
        return heuristic(a, b, InteractionType::Amplifying, 0.7, 0.5,
            "Emergency context amplifies co-occurring concerns");
    }
    // H2: two symptom/assessment intents reinforce each other.
    if catalog::is_symptom_or_assessment(&a.name) && catalog::is_symptom_or_assessment(&b.name) {
        return heuristic(a, b, InteractionType::Synergistic, 0.5, 0.25,
            "Co-reported clinical findings reinforce each other");
    }
    // H3: near-equal confidence with no clinical link reads as two
    // independent asks.
    if (a.confidence - b.confidence).abs() < NEAR_EQUAL_CONFIDENCE_DELTA {
        return heuristic(a, b, InteractionType::Independent, 0.3, 0.0,
            "Comparable confidence, no known clinical linkage");
    }

    // No rule, no heuristic: independent with no score impact.
    heuristic(a, b, InteractionType::Independent, 0.1, 0.0,
        "No known relationship between these intents")
}

fn heuristic(
    a: &IntentCandidate,
    b: &IntentCandidate,
    interaction_type: InteractionType,
    clinical_significance: f64,
    priority_modifier: f64,
    rationale: &'static str,
) -> IntentInteraction {
    IntentInteraction {
        intent_a: a.name.clone(),
        intent_b: b.name.clone(),
        interaction_type,
        clinical_significance,
        priority_modifier,
        rationale: rationale.to_string(),
    }
}

/// Annotate every unordered pair of the candidate set.
pub fn analyze_interactions(candidates: &[IntentCandidate]) -> Vec<IntentInteraction> {
    let mut interactions = Vec::new();
    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            interactions.push(classify_pair(&candidates[i], &candidates[j]));
        }
    }
    interactions
}
