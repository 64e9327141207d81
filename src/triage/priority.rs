//! Clinical priority fold.
//!
//! `score = max(base priority over detected intents) + Σ interaction
//! modifiers`, clamped to [0,10], bucketed into the six ordinal levels.
//! The recommended action is a per-level template with an optional
//! driving-intent clause.

use super::catalog;
use super::types::{ClinicalPriority, IntentCandidate, IntentInteraction, PriorityLevel};

/// Fold candidates and interactions into one priority.
///
/// Returns `None` for an empty candidate set; the orchestrator treats that
/// as a pipeline error and falls back.
pub fn compute_clinical_priority(
    candidates: &[IntentCandidate],
    interactions: &[IntentInteraction],
) -> Option<ClinicalPriority> {
    let driving = candidates.iter().max_by(|a, b| {
        catalog::base_priority(&a.name)
            .partial_cmp(&catalog::base_priority(&b.name))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                a.confidence
                    .partial_cmp(&b.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    })?;

    let max_base = catalog::base_priority(&driving.name);
    let modifier_sum: f64 = interactions.iter().map(|i| i.priority_modifier).sum();
    let score = (max_base + modifier_sum).clamp(0.0, 10.0);
    let level = PriorityLevel::from_score(score);

    Some(ClinicalPriority {
        level,
        score,
        driving_intent: driving.name.clone(),
        recommended_action: recommended_action(level, &driving.name),
    })
}

/// Patient-facing action wording per level, refined by the driving intent.
///
/// Emergency and critical wording always names emergency services; the
/// safety validator checks for it after response generation.
pub fn recommended_action(level: PriorityLevel, driving_intent: &str) -> String {
    let base = match level {
        PriorityLevel::Emergency => {
            "Call emergency services (911) now or have someone take you to the nearest emergency department."
        }
        PriorityLevel::Critical => {
            "Seek urgent medical care right away. If symptoms worsen, call 911."
        }
        PriorityLevel::High => "Contact your care provider today to be seen as soon as possible.",
        PriorityLevel::Moderate => {
            "Schedule an appointment with your care provider in the next few days."
        }
        PriorityLevel::Low => "Monitor your symptoms and arrange a routine visit if they persist.",
        PriorityLevel::Routine => "We can help with that; no urgent action is needed.",
    };

    match intent_clause(driving_intent) {
        Some(clause) => format!("{base} {clause}"),
        None => base.to_string(),
    }
}

fn intent_clause(driving_intent: &str) -> Option<&'static str> {
    match driving_intent {
        catalog::CARDIAC_CHEST_PAIN => {
            Some("Chest symptoms need an in-person evaluation, not remote advice.")
        }
        catalog::BREATHING_DIFFICULTY => {
            Some("Breathing difficulty should be assessed in person without delay.")
        }
        catalog::NEUROLOGICAL => {
            Some("Sudden neurological symptoms need immediate evaluation to rule out stroke.")
        }
        catalog::MEDICATION_QUESTION => {
            Some("Please keep your medication list at hand for the conversation.")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::types::InteractionType;

    fn cand(name: &str, confidence: f64) -> IntentCandidate {
        IntentCandidate::new(name, confidence)
    }

    fn amplifying(a: &str, b: &str, modifier: f64) -> IntentInteraction {
        IntentInteraction {
            intent_a: a.to_string(),
            intent_b: b.to_string(),
            interaction_type: InteractionType::Amplifying,
            clinical_significance: 0.9,
            priority_modifier: modifier,
            rationale: "test".to_string(),
        }
    }

    /// T-01: max base plus modifier sum, bucketed.
    #[test]
    fn fold_arithmetic() {
        let candidates = vec![
            cand(catalog::CARDIAC_CHEST_PAIN, 0.9),
            cand(catalog::MEDICATION_QUESTION, 0.6),
        ];
        let interactions = vec![amplifying(
            catalog::CARDIAC_CHEST_PAIN,
            catalog::MEDICATION_QUESTION,
            0.75,
        )];
        let p = compute_clinical_priority(&candidates, &interactions).unwrap();
        assert!((p.score - 9.25).abs() < 1e-9);
        assert_eq!(p.level, PriorityLevel::Emergency);
        assert_eq!(p.driving_intent, catalog::CARDIAC_CHEST_PAIN);
    }

    /// T-02: an amplifying interaction never lowers the score
    /// (monotonicity against the no-interaction baseline).
    #[test]
    fn amplifying_is_monotone() {
        let candidates = vec![
            cand(catalog::SYMPTOM_REPORTING, 0.8),
            cand(catalog::MEDICATION_QUESTION, 0.5),
        ];
        let without = compute_clinical_priority(&candidates, &[]).unwrap();
        let with = compute_clinical_priority(
            &candidates,
            &[amplifying(
                catalog::SYMPTOM_REPORTING,
                catalog::MEDICATION_QUESTION,
                0.5,
            )],
        )
        .unwrap();
        assert!(with.score >= without.score);
        assert!(with.level >= without.level);
    }

    /// T-03: score clamps at 10 even with stacked modifiers.
    #[test]
    fn score_clamped_to_ten() {
        let candidates = vec![
            cand(catalog::EMERGENCY_ESCALATION, 0.9),
            cand(catalog::CARDIAC_CHEST_PAIN, 0.9),
            cand(catalog::BREATHING_DIFFICULTY, 0.8),
        ];
        let interactions = vec![
            amplifying(catalog::EMERGENCY_ESCALATION, catalog::CARDIAC_CHEST_PAIN, 1.0),
            amplifying(catalog::EMERGENCY_ESCALATION, catalog::BREATHING_DIFFICULTY, 1.0),
        ];
        let p = compute_clinical_priority(&candidates, &interactions).unwrap();
        assert_eq!(p.score, 10.0);
        assert_eq!(p.level, PriorityLevel::Emergency);
    }

    /// T-04: the driving intent is the highest base priority, with
    /// confidence breaking ties.
    #[test]
    fn driving_intent_selection() {
        let p = compute_clinical_priority(
            &[
                cand(catalog::MEDICATION_QUESTION, 0.9),
                cand(catalog::CARDIAC_CHEST_PAIN, 0.4),
            ],
            &[],
        )
        .unwrap();
        assert_eq!(p.driving_intent, catalog::CARDIAC_CHEST_PAIN);
    }

    /// T-05: unknown intents fold at the default base, except
    /// emergency-flavored ones, which keep the emergency fallback base.
    #[test]
    fn unknown_intent_folds() {
        let p = compute_clinical_priority(&[cand("insurance_paperwork", 0.9)], &[]).unwrap();
        assert_eq!(p.score, catalog::DEFAULT_BASE_PRIORITY);
        assert_eq!(p.level, PriorityLevel::Routine);

        let p = compute_clinical_priority(&[cand("pediatric_emergency", 0.9)], &[]).unwrap();
        assert_eq!(p.score, catalog::EMERGENCY_FALLBACK_BASE);
        assert_eq!(p.level, PriorityLevel::Emergency);
    }

    /// T-06: empty candidate set yields no priority.
    #[test]
    fn empty_candidates_none() {
        assert!(compute_clinical_priority(&[], &[]).is_none());
    }

    /// T-07: emergency and critical actions name emergency services.
    #[test]
    fn urgent_actions_mention_emergency_services() {
        for level in [PriorityLevel::Emergency, PriorityLevel::Critical] {
            let action = recommended_action(level, catalog::CARDIAC_CHEST_PAIN);
            assert!(action.contains("911"), "missing 911 in: {action}");
        }
    }
}
