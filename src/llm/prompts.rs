//! Prompt templates for the generative-language calls.

use crate::triage::catalog;

/// System framing for intent classification. The JSON contract is strict so
/// `parse::parse_intent_candidates` has something to hold the model to.
pub const INTENT_SYSTEM_PROMPT: &str = r#"You are an intent classifier for a medical triage assistant.

RULES:
1. Classify the patient message into the allowed intent labels ONLY.
2. Return up to 5 intents, most likely first.
3. Confidence is a number between 0.0 and 1.0.
4. Output ONLY a JSON array, no prose: [{"intent": "<label>", "confidence": <number>}]
5. If nothing fits, return []."#;

/// Build the full classification prompt for one patient message.
pub fn build_intent_prompt(message: &str) -> String {
    let labels: Vec<&str> = catalog::intent_names().collect();
    format!(
        "{system}\n\nALLOWED LABELS:\n{labels}\n\nPATIENT MESSAGE:\n\"\"\"\n{message}\n\"\"\"",
        system = INTENT_SYSTEM_PROMPT,
        labels = labels.join("\n"),
        message = message,
    )
}

/// System framing for the empathy refinement pass.
///
/// The model may only rephrase. Safety wording survives regardless because
/// `empathy::ResponseComposer` re-checks the output rather than trusting it.
pub const EMPATHY_SYSTEM_PROMPT: &str = r#"You rewrite a medical triage response to sound warmer and more human.

RULES:
1. Keep every medical instruction and every question from the draft.
2. Do NOT add medical claims, diagnoses, or new advice.
3. Do NOT soften or remove emergency wording such as "call 911".
4. Keep it to at most 5 sentences plus the questions.
5. Output the rewritten text only."#;

/// Build the refinement prompt from the template draft.
pub fn build_empathy_prompt(draft: &str, urgency: &str) -> String {
    format!(
        "{system}\n\nURGENCY LEVEL: {urgency}\n\nDRAFT:\n\"\"\"\n{draft}\n\"\"\"",
        system = EMPATHY_SYSTEM_PROMPT,
        urgency = urgency,
        draft = draft,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// T-01: the classification prompt carries every allowed label and the
    /// message body.
    #[test]
    fn intent_prompt_lists_labels() {
        let prompt = build_intent_prompt("my chest hurts");
        for label in catalog::intent_names() {
            assert!(prompt.contains(label), "missing label {label}");
        }
        assert!(prompt.contains("my chest hurts"));
        assert!(prompt.contains("JSON array"));
    }

    /// T-02: the empathy prompt embeds the draft and the urgency level.
    #[test]
    fn empathy_prompt_embeds_draft() {
        let prompt = build_empathy_prompt("Please call 911 now.", "emergency");
        assert!(prompt.contains("Please call 911 now."));
        assert!(prompt.contains("URGENCY LEVEL: emergency"));
    }
}
