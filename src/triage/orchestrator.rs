//! Multi-intent orchestration.
//!
//! Runs the full pipeline for one patient message: classify (keyword +
//! optional LLM) → union compound matches → boost once → rank → pairwise
//! interactions → priority fold → completeness → pathway. Any pipeline
//! error is caught at this one boundary and replaced by the canned
//! moderate-priority fallback; the request itself never fails.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use super::boost::apply_boosts;
use super::classifier::{merge_candidates, rank_candidates, IntentClassifier};
use super::completeness::{detect_missing_details, follow_up_questions};
use super::compound::detect_compound_intents;
use super::interactions::analyze_interactions;
use super::priority::{compute_clinical_priority, recommended_action};
use super::types::{
    ClinicalPriority, ConversationPathway, IntentCandidate, PriorityLevel, TriageAssessment,
    TriageError,
};
use super::pathway;
use crate::llm::LlmClient;
use crate::monitor::TriageMonitor;
use crate::session::ConversationStage;

/// Driving intent reported by the canned fallback.
pub const FALLBACK_INTENT: &str = "unclear_intent";

/// Clarifying question attached to the canned fallback.
const FALLBACK_QUESTION: &str =
    "Could you tell me a bit more about what's going on so I can point you the right way?";

/// Confidence assigned to intents carried over from earlier turns when the
/// current message alone detects nothing ("recently", "yes", "a bit worse").
const CARRYOVER_CONFIDENCE: f64 = 0.4;

pub struct MultiIntentOrchestrator {
    classifier: IntentClassifier,
    monitor: Arc<TriageMonitor>,
}

impl MultiIntentOrchestrator {
    pub fn new(llm: Option<Arc<dyn LlmClient>>, monitor: Arc<TriageMonitor>) -> Self {
        Self {
            classifier: IntentClassifier::new(llm),
            monitor,
        }
    }

    /// Assess one message in the context of its conversation.
    ///
    /// `context_intents` are the session's accumulated intents; `stage` is
    /// where the conversation currently stands. Always returns an
    /// assessment — failures become the fallback, marked as such.
    pub async fn assess(
        &self,
        message: &str,
        stage: ConversationStage,
        context_intents: &[String],
    ) -> TriageAssessment {
        let started = Instant::now();
        let assessment = match self.run_pipeline(message, stage, context_intents, started).await {
            Ok(assessment) => assessment,
            Err(e) => {
                tracing::warn!(error = %e, "triage pipeline failed, returning fallback");
                fallback_assessment(started)
            }
        };
        self.monitor.record_assessment(&assessment);
        assessment
    }

    async fn run_pipeline(
        &self,
        message: &str,
        stage: ConversationStage,
        context_intents: &[String],
        started: Instant,
    ) -> Result<TriageAssessment, TriageError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(TriageError::EmptyInput);
        }

        let classified = self.classifier.classify(message).await;
        if classified.llm_degraded {
            self.monitor.record_llm_failure();
        }

        let mut candidates =
            merge_candidates(classified.candidates, detect_compound_intents(message));

        // A short follow-up turn detects nothing on its own; the
        // conversation's active intents keep the clinical thread alive.
        if candidates.is_empty() && !context_intents.is_empty() {
            tracing::debug!(
                carried = context_intents.len(),
                "no intents in message, carrying over session intents"
            );
            candidates = context_intents
                .iter()
                .map(|name| IntentCandidate::new(name.clone(), CARRYOVER_CONFIDENCE))
                .collect();
        }

        let ranked = rank_candidates(apply_boosts(candidates));
        if ranked.is_empty() {
            return Err(TriageError::NoIntentsDetected);
        }

        let interactions = analyze_interactions(&ranked);
        let priority = compute_clinical_priority(&ranked, &interactions)
            .ok_or(TriageError::NoIntentsDetected)?;
        let missing = detect_missing_details(message, &ranked);
        let questions = follow_up_questions(&missing);
        let predicted = pathway::predict_pathway(&priority, &missing, stage);

        let assessment = TriageAssessment {
            id: Uuid::new_v4(),
            intents: ranked,
            interactions,
            priority,
            pathway: predicted,
            missing_details: missing,
            follow_up_questions: questions,
            fallback: false,
            assessed_at: Utc::now(),
            processing_ms: started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            assessment_id = %assessment.id,
            level = assessment.priority.level.as_str(),
            score = assessment.priority.score,
            intents = assessment.intents.len(),
            interactions = assessment.interactions.len(),
            missing = assessment.missing_details.len(),
            elapsed_ms = assessment.processing_ms,
            "triage assessment complete"
        );
        Ok(assessment)
    }
}

/// The canned result every pipeline error maps to: moderate priority,
/// unclear intent, one clarifying question.
pub fn fallback_assessment(started: Instant) -> TriageAssessment {
    TriageAssessment {
        id: Uuid::new_v4(),
        intents: Vec::new(),
        interactions: Vec::new(),
        priority: ClinicalPriority {
            level: PriorityLevel::Moderate,
            score: 5.0,
            driving_intent: FALLBACK_INTENT.to_string(),
            recommended_action: recommended_action(PriorityLevel::Moderate, FALLBACK_INTENT),
        },
        pathway: ConversationPathway {
            next_stage: ConversationStage::GatheringInfo,
            focus_intent: FALLBACK_INTENT.to_string(),
            suggested_topics: vec!["clarify_concern".to_string()],
            rationale: "assessment fell back; clarification needed".to_string(),
        },
        missing_details: Vec::new(),
        follow_up_questions: vec![FALLBACK_QUESTION.to_string()],
        fallback: true,
        assessed_at: Utc::now(),
        processing_ms: started.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::triage::catalog;

    fn keyword_orchestrator() -> (MultiIntentOrchestrator, Arc<TriageMonitor>) {
        let monitor = Arc::new(TriageMonitor::default());
        (
            MultiIntentOrchestrator::new(None, monitor.clone()),
            monitor,
        )
    }

    /// T-01: the embedded regression case — severe chest pain plus a blood
    /// pressure medication question surfaces the cardiac intent at or above
    /// critical.
    #[tokio::test]
    async fn chest_pain_medication_is_critical_or_above() {
        let (orchestrator, _) = keyword_orchestrator();
        let out = orchestrator
            .assess(
                "I have severe chest pain and I'm wondering if I should take my blood pressure medication?",
                ConversationStage::Greeting,
                &[],
            )
            .await;
        assert!(!out.fallback);
        assert_eq!(out.priority.driving_intent, catalog::CARDIAC_CHEST_PAIN);
        assert!(out.priority.level >= PriorityLevel::Critical);
        assert!(out
            .interactions
            .iter()
            .any(|i| i.priority_modifier > 0.0));
        assert_eq!(out.pathway.next_stage, ConversationStage::EmergencyEscalation);
    }

    /// T-02: bare "chest pain" flags the missing pain detail slots with
    /// usable questions.
    #[tokio::test]
    async fn bare_chest_pain_asks_for_details() {
        let (orchestrator, _) = keyword_orchestrator();
        let out = orchestrator
            .assess("chest pain", ConversationStage::Greeting, &[])
            .await;
        let slots: Vec<&str> = out.missing_details.iter().map(|m| m.slot.as_str()).collect();
        assert!(slots.contains(&"pain_quality"));
        assert!(slots.contains(&"pain_severity"));
        assert!(out
            .follow_up_questions
            .iter()
            .any(|q| q.contains("sharp") || q.contains("1 to 10")));
    }

    /// T-03: a vague follow-up turn rides on the session's intents and asks
    /// for a concrete timeframe.
    #[tokio::test]
    async fn vague_follow_up_uses_carryover() {
        let (orchestrator, _) = keyword_orchestrator();
        let out = orchestrator
            .assess(
                "it started recently",
                ConversationStage::GatheringInfo,
                &[catalog::SYMPTOM_REPORTING.to_string()],
            )
            .await;
        assert!(!out.fallback);
        assert!(out
            .follow_up_questions
            .iter()
            .any(|q| q.contains("hours") && q.contains("days")));
    }

    /// T-04: empty input and undetectable input both produce the canned
    /// fallback, and the monitor counts them.
    #[tokio::test]
    async fn errors_fall_back() {
        let (orchestrator, monitor) = keyword_orchestrator();
        for message in ["", "   ", "zzz qqq xyzzy"] {
            let out = orchestrator
                .assess(message, ConversationStage::Greeting, &[])
                .await;
            assert!(out.fallback, "no fallback for {message:?}");
            assert_eq!(out.priority.level, PriorityLevel::Moderate);
            assert_eq!(out.priority.driving_intent, FALLBACK_INTENT);
            assert!(!out.follow_up_questions.is_empty());
        }
        let snap = monitor.snapshot();
        assert_eq!(snap.total_assessments, 3);
        assert_eq!(snap.fallback_assessments, 3);
    }

    /// T-05: an LLM outage degrades to keywords, counts the failure, and
    /// still assesses.
    #[tokio::test]
    async fn llm_outage_degrades_not_fails() {
        let monitor = Arc::new(TriageMonitor::default());
        let orchestrator =
            MultiIntentOrchestrator::new(Some(Arc::new(MockLlmClient::failing())), monitor.clone());
        let out = orchestrator
            .assess("I have chest pain", ConversationStage::Greeting, &[])
            .await;
        assert!(!out.fallback);
        assert_eq!(monitor.snapshot().llm_failures, 1);
    }

    /// T-06: LLM candidates flow through the whole pipeline.
    #[tokio::test]
    async fn llm_candidates_flow_through() {
        let monitor = Arc::new(TriageMonitor::default());
        let mock = MockLlmClient::new(
            r#"[{"intent": "anxiety_concern", "confidence": 0.85},
                {"intent": "cardiac_chest_pain_assessment", "confidence": 0.7}]"#,
        );
        let orchestrator = MultiIntentOrchestrator::new(Some(Arc::new(mock)), monitor);
        let out = orchestrator
            .assess(
                "I keep worrying something is wrong with my heart",
                ConversationStage::Greeting,
                &[],
            )
            .await;
        assert!(out.intents.iter().any(|c| c.name == catalog::ANXIETY_CONCERN));
        assert!(out
            .interactions
            .iter()
            .any(|i| i.intent_a == catalog::CARDIAC_CHEST_PAIN
                || i.intent_b == catalog::CARDIAC_CHEST_PAIN));
    }

    /// T-07: every reported confidence stays in [0,1] end to end, boosts
    /// included.
    #[tokio::test]
    async fn confidences_clamped_end_to_end() {
        let (orchestrator, _) = keyword_orchestrator();
        let out = orchestrator
            .assess(
                "Emergency! Severe chest pain, trouble breathing, dizziness, I'm very scared",
                ConversationStage::Greeting,
                &[],
            )
            .await;
        assert!(!out.intents.is_empty());
        assert!(out.intents.len() <= 5);
        for c in &out.intents {
            assert!((0.0..=1.0).contains(&c.confidence), "{c:?}");
        }
    }
}
