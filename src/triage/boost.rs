//! Contextual confidence boosting.
//!
//! When an anchor intent is present (`symptom_reporting`, `anxiety_concern`,
//! or anything emergency-flavored), thematically related intents get their
//! confidence multiplied by a fixed factor. Boosted values are clamped to
//! 1.0, and `apply_boosts` consumes its input so the orchestrator can only
//! run it once per request; each rule fires at most once within a pass.

use super::catalog;
use super::types::IntentCandidate;

/// What makes a rule applicable.
enum BoostAnchor {
    /// A specific intent is among the candidates.
    Intent(&'static str),
    /// Any candidate with `emergency` in its name (catalog::is_emergency).
    AnyEmergency,
}

struct BoostRule {
    id: &'static str,
    anchor: BoostAnchor,
    factor: f64,
    targets: &'static [&'static str],
    description: &'static str,
}

/// Ordered rule table. Factors stay within the 1.2-1.5 band; an anchor
/// never boosts itself.
fn rules() -> Vec<BoostRule> {
    vec![
        BoostRule {
            id: "BST-001",
            anchor: BoostAnchor::Intent(catalog::SYMPTOM_REPORTING),
            factor: 1.2,
            targets: &[
                catalog::CARDIAC_CHEST_PAIN,
                catalog::BREATHING_DIFFICULTY,
                catalog::NEUROLOGICAL,
                catalog::PAIN_ASSESSMENT,
            ],
            description: "Reported symptoms raise related assessment intents",
        },
        BoostRule {
            id: "BST-002",
            anchor: BoostAnchor::Intent(catalog::ANXIETY_CONCERN),
            factor: 1.3,
            targets: &[catalog::CARDIAC_CHEST_PAIN, catalog::BREATHING_DIFFICULTY],
            description: "Anxiety raises cardiac/respiratory intents (somatic presentations)",
        },
        BoostRule {
            id: "BST-003",
            anchor: BoostAnchor::AnyEmergency,
            factor: 1.5,
            targets: &[
                catalog::CARDIAC_CHEST_PAIN,
                catalog::BREATHING_DIFFICULTY,
                catalog::NEUROLOGICAL,
                catalog::PAIN_ASSESSMENT,
            ],
            description: "Emergency context raises every assessment intent",
        },
    ]
}

fn anchor_present(anchor: &BoostAnchor, candidates: &[IntentCandidate]) -> bool {
    match anchor {
        BoostAnchor::Intent(name) => candidates.iter().any(|c| c.name == *name),
        BoostAnchor::AnyEmergency => candidates.iter().any(|c| catalog::is_emergency(&c.name)),
    }
}

/// Apply the boost table to a candidate set, once.
///
/// Takes the vector by value: call sites cannot keep the un-boosted set
/// around and accidentally re-boost it later. Confidence is clamped to 1.0
/// after every multiplication.
pub fn apply_boosts(mut candidates: Vec<IntentCandidate>) -> Vec<IntentCandidate> {
    for rule in rules() {
        if !anchor_present(&rule.anchor, &candidates) {
            continue;
        }
        for candidate in candidates.iter_mut() {
            let is_anchor = match rule.anchor {
                BoostAnchor::Intent(name) => candidate.name == name,
                BoostAnchor::AnyEmergency => catalog::is_emergency(&candidate.name),
            };
            if is_anchor || !rule.targets.contains(&candidate.name.as_str()) {
                continue;
            }
            let before = candidate.confidence;
            candidate.confidence = (candidate.confidence * rule.factor).min(1.0);
            tracing::debug!(
                rule_id = rule.id,
                intent = %candidate.name,
                before,
                after = candidate.confidence,
                "{}",
                rule.description
            );
        }
    }
    candidates
}
