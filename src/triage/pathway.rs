//! Conversation pathway prediction.
//!
//! Decides where the consultation goes next: escalate, keep gathering
//! detail, or move toward assessment and recommendation, plus the topics
//! worth raising. Purely table-and-branch logic over the current turn's
//! results.

use super::catalog;
use super::types::{ClinicalPriority, ConversationPathway, MissingDetail, PriorityLevel};
use crate::session::ConversationStage;

/// Suggested topics per turn.
pub const MAX_TOPICS: usize = 4;

/// Follow-on topics per driving intent once detail gathering is done.
fn intent_topics(driving_intent: &str) -> &'static [&'static str] {
    match driving_intent {
        catalog::CARDIAC_CHEST_PAIN => {
            &["pain_quality", "associated_symptoms", "cardiac_history", "current_medications"]
        }
        catalog::BREATHING_DIFFICULTY => &["onset_timing", "trigger_context", "asthma_history"],
        catalog::NEUROLOGICAL => &["symptom_timeline", "one_sided_weakness", "speech_changes"],
        catalog::SYMPTOM_REPORTING => &["symptom_details", "onset_timing", "severity"],
        catalog::PAIN_ASSESSMENT => &["pain_quality", "pain_severity", "onset_timing"],
        catalog::ANXIETY_CONCERN => &["specific_worries", "physical_symptoms", "support_options"],
        catalog::MEDICATION_QUESTION => &["medication_name", "dosing_schedule", "side_effects"],
        catalog::CHRONIC_CONDITION => {
            &["recent_readings", "medication_adherence", "lifestyle_factors"]
        }
        catalog::TEST_RESULTS => &["which_test", "ordering_provider"],
        catalog::APPOINTMENT_SCHEDULING => &["preferred_time", "provider_choice", "visit_reason"],
        _ => &["clarify_question"],
    }
}

/// Predict the consultation's continuation for this turn.
pub fn predict_pathway(
    priority: &ClinicalPriority,
    missing: &[MissingDetail],
    current_stage: ConversationStage,
) -> ConversationPathway {
    if priority.level >= PriorityLevel::Critical {
        return ConversationPathway {
            next_stage: ConversationStage::EmergencyEscalation,
            focus_intent: priority.driving_intent.clone(),
            suggested_topics: vec![
                "emergency_services_confirmation".to_string(),
                "symptom_monitoring_until_help_arrives".to_string(),
            ],
            rationale: format!(
                "{} priority requires immediate escalation",
                priority.level.as_str()
            ),
        };
    }

    if !missing.is_empty() {
        let suggested_topics = missing
            .iter()
            .take(MAX_TOPICS)
            .map(|m| m.slot.clone())
            .collect();
        return ConversationPathway {
            next_stage: ConversationStage::GatheringInfo,
            focus_intent: priority.driving_intent.clone(),
            suggested_topics,
            rationale: "clinical details still missing".to_string(),
        };
    }

    let next_stage = match current_stage {
        ConversationStage::Greeting | ConversationStage::GatheringInfo => {
            ConversationStage::Assessment
        }
        ConversationStage::Assessment
        | ConversationStage::Recommendation
        | ConversationStage::Completed => ConversationStage::Recommendation,
        // A session that was escalated but no longer looks critical drops
        // back to assessment rather than staying stuck.
        ConversationStage::EmergencyEscalation => ConversationStage::Assessment,
    };

    ConversationPathway {
        next_stage,
        focus_intent: priority.driving_intent.clone(),
        suggested_topics: intent_topics(&priority.driving_intent)
            .iter()
            .take(MAX_TOPICS)
            .map(|t| t.to_string())
            .collect(),
        rationale: "details sufficient for this stage".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::priority::recommended_action;

    fn priority(level: PriorityLevel, driving: &str) -> ClinicalPriority {
        ClinicalPriority {
            level,
            score: 5.0,
            driving_intent: driving.to_string(),
            recommended_action: recommended_action(level, driving),
        }
    }

    fn missing(slot: &str) -> MissingDetail {
        MissingDetail {
            slot: slot.to_string(),
            intent: catalog::PAIN_ASSESSMENT.to_string(),
            question: "q".to_string(),
        }
    }

    /// T-01: critical and above always route to emergency escalation,
    /// even with missing details.
    #[test]
    fn critical_escalates() {
        for level in [PriorityLevel::Critical, PriorityLevel::Emergency] {
            let p = predict_pathway(
                &priority(level, catalog::CARDIAC_CHEST_PAIN),
                &[missing("pain_quality")],
                ConversationStage::Greeting,
            );
            assert_eq!(p.next_stage, ConversationStage::EmergencyEscalation);
            assert!(p
                .suggested_topics
                .iter()
                .any(|t| t.contains("emergency_services")));
        }
    }

    /// T-02: missing details keep the conversation in gathering and suggest
    /// exactly those slots.
    #[test]
    fn missing_details_gather() {
        let p = predict_pathway(
            &priority(PriorityLevel::Moderate, catalog::PAIN_ASSESSMENT),
            &[missing("pain_quality"), missing("pain_severity")],
            ConversationStage::Greeting,
        );
        assert_eq!(p.next_stage, ConversationStage::GatheringInfo);
        assert_eq!(p.suggested_topics, vec!["pain_quality", "pain_severity"]);
    }

    /// T-03: complete info advances along the stage chain.
    #[test]
    fn stage_advancement() {
        let p = priority(PriorityLevel::Moderate, catalog::MEDICATION_QUESTION);
        let cases = [
            (ConversationStage::Greeting, ConversationStage::Assessment),
            (ConversationStage::GatheringInfo, ConversationStage::Assessment),
            (ConversationStage::Assessment, ConversationStage::Recommendation),
            (ConversationStage::Recommendation, ConversationStage::Recommendation),
            (ConversationStage::EmergencyEscalation, ConversationStage::Assessment),
        ];
        for (current, expected) in cases {
            assert_eq!(predict_pathway(&p, &[], current).next_stage, expected);
        }
    }

    /// T-04: topics follow the driving intent and stay capped.
    #[test]
    fn topics_follow_driving_intent() {
        let p = predict_pathway(
            &priority(PriorityLevel::Moderate, catalog::CHRONIC_CONDITION),
            &[],
            ConversationStage::Assessment,
        );
        assert!(p.suggested_topics.contains(&"recent_readings".to_string()));
        assert!(p.suggested_topics.len() <= MAX_TOPICS);

        let unknown = predict_pathway(
            &priority(PriorityLevel::Low, "some_unknown_intent"),
            &[],
            ConversationStage::Assessment,
        );
        assert_eq!(unknown.suggested_topics, vec!["clarify_question"]);
    }
}
