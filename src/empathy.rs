//! Patient-facing response composition.
//!
//! Turns a triage assessment into the reply the patient reads: a calm
//! acknowledgment matched to the priority level, the recommended action,
//! then the questions the conversation still needs answered. When an LLM
//! is configured the draft gets one rewrite for warmth; the rewrite is
//! checked rather than trusted, so emergency wording can never be lost
//! to a model.

use std::sync::Arc;

use crate::llm::{parse, prompts, LlmClient, LlmError};
use crate::monitor::TriageMonitor;
use crate::triage::{PriorityLevel, TriageAssessment};

/// Opening line of a new consultation, before any message arrives.
pub const GREETING: &str =
    "Hello, I'm here to help you figure out what kind of care you might need. \
     What's going on today?";

/// Response template builder. Calm framing throughout; urgency lives in
/// the recommended action, not in alarm wording here.
pub struct ResponseTemplates;

impl ResponseTemplates {
    /// Per-level acknowledgment opening.
    pub fn acknowledgment(level: PriorityLevel) -> &'static str {
        match level {
            PriorityLevel::Emergency => {
                "I hear you, and I'm taking what you've described very seriously."
            }
            PriorityLevel::Critical => {
                "Thank you for telling me. What you're describing needs prompt medical attention."
            }
            PriorityLevel::High => {
                "Thank you for sharing that with me. This is worth getting checked soon."
            }
            PriorityLevel::Moderate => {
                "Thank you for explaining what's going on. Let's look at this together."
            }
            PriorityLevel::Low => "Thanks for reaching out. I can help you with that.",
            PriorityLevel::Routine => "Thanks for your message. I'm happy to help.",
        }
    }

    /// Opening used when the assessment fell back and the concern is
    /// still unclear.
    pub fn clarification_opening() -> &'static str {
        "I want to make sure I understand what you're going through."
    }

    /// Header introducing the follow-up questions.
    pub fn questions_header() -> &'static str {
        "To help me understand better:"
    }
}

/// Assemble the template response: acknowledgment, action, questions.
pub fn compose_draft(assessment: &TriageAssessment) -> String {
    let opening = if assessment.fallback {
        ResponseTemplates::clarification_opening()
    } else {
        ResponseTemplates::acknowledgment(assessment.priority.level)
    };

    let mut sections = vec![opening.to_string(), assessment.priority.recommended_action.clone()];

    if !assessment.follow_up_questions.is_empty() {
        let mut block = String::from(ResponseTemplates::questions_header());
        for question in &assessment.follow_up_questions {
            block.push_str("\n- ");
            block.push_str(question);
        }
        sections.push(block);
    }

    sections.join("\n\n")
}

/// A rewrite may rephrase anything except the emergency-services
/// instruction.
fn keeps_emergency_wording(draft: &str, refined: &str) -> bool {
    !draft.contains("911") || refined.contains("911")
}

pub struct ResponseComposer {
    llm: Option<Arc<dyn LlmClient>>,
    monitor: Arc<TriageMonitor>,
}

impl ResponseComposer {
    pub fn new(llm: Option<Arc<dyn LlmClient>>, monitor: Arc<TriageMonitor>) -> Self {
        Self { llm, monitor }
    }

    #[cfg(test)]
    pub fn template_only() -> Self {
        Self::new(None, Arc::new(TriageMonitor::default()))
    }

    /// Compose the reply for an assessment. Never fails: any LLM problem
    /// keeps the template draft.
    pub async fn compose(&self, assessment: &TriageAssessment) -> String {
        let draft = compose_draft(assessment);
        let Some(llm) = &self.llm else {
            return draft;
        };

        let prompt =
            prompts::build_empathy_prompt(&draft, assessment.priority.level.as_str());
        match self.refine(llm.as_ref(), &prompt).await {
            Ok(refined) if keeps_emergency_wording(&draft, &refined) => refined,
            Ok(_) => {
                tracing::warn!("llm rewrite dropped emergency wording, keeping template");
                draft
            }
            Err(e) => {
                tracing::warn!(error = %e, "llm refinement failed, keeping template");
                self.monitor.record_llm_failure();
                draft
            }
        }
    }

    async fn refine(&self, llm: &dyn LlmClient, prompt: &str) -> Result<String, LlmError> {
        let raw = llm.generate(prompt).await?;
        parse::parse_refined_text(&raw)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::llm::MockLlmClient;
    use crate::triage::orchestrator::fallback_assessment;
    use crate::triage::{ClinicalPriority, IntentCandidate};

    fn assessment_at(level: PriorityLevel, score: f64) -> TriageAssessment {
        let mut assessment = fallback_assessment(Instant::now());
        assessment.fallback = false;
        assessment.intents = vec![IntentCandidate::new("symptom_reporting", 0.8)];
        assessment.priority = ClinicalPriority {
            level,
            score,
            driving_intent: "cardiac_chest_pain_assessment".to_string(),
            recommended_action: crate::triage::priority::recommended_action(
                level,
                "cardiac_chest_pain_assessment",
            ),
        };
        assessment.follow_up_questions =
            vec!["When did the pain start?".to_string()];
        assessment
    }

    /// T-01: the template stacks acknowledgment, action, and questions.
    #[test]
    fn draft_has_all_sections() {
        let draft = compose_draft(&assessment_at(PriorityLevel::High, 6.5));
        assert!(draft.starts_with(ResponseTemplates::acknowledgment(PriorityLevel::High)));
        assert!(draft.contains(ResponseTemplates::questions_header()));
        assert!(draft.contains("When did the pain start?"));
    }

    /// T-02: emergency drafts carry the emergency-services instruction.
    #[test]
    fn emergency_draft_names_emergency_services() {
        let draft = compose_draft(&assessment_at(PriorityLevel::Emergency, 9.5));
        assert!(draft.contains("911"));
    }

    /// T-03: no alarm wording in the acknowledgment openings themselves.
    #[test]
    fn acknowledgments_stay_calm() {
        let alarm_words = ["danger", "alarm", "panic", "terrible"];
        for level in [
            PriorityLevel::Routine,
            PriorityLevel::Low,
            PriorityLevel::Moderate,
            PriorityLevel::High,
            PriorityLevel::Critical,
            PriorityLevel::Emergency,
        ] {
            let lower = ResponseTemplates::acknowledgment(level).to_lowercase();
            for word in &alarm_words {
                assert!(!lower.contains(word), "alarm word '{word}' at {level:?}");
            }
        }
    }

    /// T-04: a successful rewrite replaces the draft.
    #[tokio::test]
    async fn llm_rewrite_is_used() {
        let monitor = Arc::new(TriageMonitor::default());
        let mock = MockLlmClient::new("That sounds uncomfortable. When did the pain start?");
        let composer = ResponseComposer::new(Some(Arc::new(mock)), monitor);
        let reply = composer.compose(&assessment_at(PriorityLevel::Moderate, 4.5)).await;
        assert!(reply.starts_with("That sounds uncomfortable."));
    }

    /// T-05: a rewrite that drops the emergency instruction is discarded.
    #[tokio::test]
    async fn rewrite_without_emergency_wording_is_rejected() {
        let monitor = Arc::new(TriageMonitor::default());
        let mock = MockLlmClient::new("Try to stay calm and rest for a while.");
        let composer = ResponseComposer::new(Some(Arc::new(mock)), monitor);
        let reply = composer.compose(&assessment_at(PriorityLevel::Emergency, 9.5)).await;
        assert!(reply.contains("911"));
    }

    /// T-06: LLM failure keeps the template and counts against the monitor.
    #[tokio::test]
    async fn llm_failure_keeps_template() {
        let monitor = Arc::new(TriageMonitor::default());
        let composer =
            ResponseComposer::new(Some(Arc::new(MockLlmClient::failing())), monitor.clone());
        let assessment = assessment_at(PriorityLevel::High, 6.5);
        let reply = composer.compose(&assessment).await;
        assert_eq!(reply, compose_draft(&assessment));
        assert_eq!(monitor.snapshot().llm_failures, 1);
    }

    /// T-07: fallback assessments open with the clarification line.
    #[test]
    fn fallback_uses_clarification_opening() {
        let draft = compose_draft(&fallback_assessment(Instant::now()));
        assert!(draft.starts_with(ResponseTemplates::clarification_opening()));
    }
}
