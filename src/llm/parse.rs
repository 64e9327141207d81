//! Lenient parsing of LLM text output.
//!
//! Gemini answers prose around JSON more often than bare JSON. The
//! extractors here accept fenced blocks, leading/trailing chatter, and
//! per-element garbage (bad elements are skipped, not fatal). A response
//! with no parseable JSON at all is `LlmError::MalformedResponse`, which
//! callers treat as "degrade to keyword results".

use serde::Deserialize;

use super::LlmError;
use crate::triage::types::IntentCandidate;

/// Pull the JSON payload out of an LLM response.
///
/// Preference order: a ```json fenced block, then the widest `[...]` span,
/// then the widest `{...}` span, then the trimmed response as-is.
pub fn extract_json_block(response: &str) -> &str {
    if let Some(fence_start) = response.find("```json") {
        let content_start = fence_start + 7;
        if let Some(fence_len) = response[content_start..].find("```") {
            return response[content_start..content_start + fence_len].trim();
        }
    }
    for (open, close) in [('[', ']'), ('{', '}')] {
        if let (Some(start), Some(end)) = (response.find(open), response.rfind(close)) {
            if start < end {
                return response[start..=end].trim();
            }
        }
    }
    response.trim()
}

/// One element of the classifier's JSON contract.
#[derive(Deserialize)]
struct RawIntent {
    #[serde(alias = "name")]
    intent: String,
    #[serde(default)]
    confidence: f64,
}

/// Parse the intent-classification response.
///
/// Accepts either a bare array `[{"intent": ..., "confidence": ...}]` or an
/// object `{"intents": [...]}`. Elements that fail to deserialize are
/// skipped; confidences are clamped by `IntentCandidate::new`.
pub fn parse_intent_candidates(response: &str) -> Result<Vec<IntentCandidate>, LlmError> {
    let json_str = extract_json_block(response);

    let value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| LlmError::MalformedResponse(format!("intent JSON: {e}")))?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("intents") {
            Some(serde_json::Value::Array(items)) => items,
            _ => {
                return Err(LlmError::MalformedResponse(
                    "expected an array or an object with an 'intents' array".into(),
                ))
            }
        },
        _ => {
            return Err(LlmError::MalformedResponse(
                "expected an array or an object with an 'intents' array".into(),
            ))
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|v| serde_json::from_value::<RawIntent>(v).ok())
        .filter(|raw| !raw.intent.trim().is_empty())
        .map(|raw| IntentCandidate::new(raw.intent, raw.confidence))
        .collect())
}

/// Parse the empathy-refinement response: plain text, fences stripped.
///
/// Empty output is malformed (the caller keeps its template instead).
pub fn parse_refined_text(response: &str) -> Result<String, LlmError> {
    let trimmed = response
        .trim()
        .trim_start_matches("```text")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    if trimmed.is_empty() {
        return Err(LlmError::MalformedResponse("empty refinement".into()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// T-01: fenced block wins over surrounding prose.
    #[test]
    fn fenced_block_extracted() {
        let response = "Sure! Here you go:\n```json\n[{\"intent\": \"pain_assessment\", \"confidence\": 0.8}]\n```\nHope that helps.";
        let parsed = parse_intent_candidates(response).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "pain_assessment");
        assert_eq!(parsed[0].confidence, 0.8);
    }

    /// T-02: bare array with chatter before and after still parses.
    #[test]
    fn bare_array_with_chatter() {
        let response = "The intents are: [{\"intent\": \"anxiety_concern\", \"confidence\": 0.6}] as requested";
        let parsed = parse_intent_candidates(response).unwrap();
        assert_eq!(parsed[0].name, "anxiety_concern");
    }

    /// T-03: object form with an `intents` key.
    #[test]
    fn object_with_intents_key() {
        let response = r#"{"intents": [{"name": "symptom_reporting", "confidence": 0.7}]}"#;
        let parsed = parse_intent_candidates(response).unwrap();
        assert_eq!(parsed[0].name, "symptom_reporting");
    }

    /// T-04: bad elements are skipped, good ones kept, confidences clamped.
    #[test]
    fn lenient_per_element() {
        let response = r#"[
            {"intent": "cardiac_chest_pain_assessment", "confidence": 1.4},
            {"wrong_shape": true},
            "just a string",
            {"intent": "", "confidence": 0.5},
            {"intent": "medication_question"}
        ]"#;
        let parsed = parse_intent_candidates(response).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].confidence, 1.0);
        assert_eq!(parsed[1].name, "medication_question");
        assert_eq!(parsed[1].confidence, 0.0);
    }

    /// T-05: no JSON anywhere is a malformed-response error.
    #[test]
    fn prose_only_is_malformed() {
        assert!(matches!(
            parse_intent_candidates("I cannot classify that message."),
            Err(LlmError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_intent_candidates(""),
            Err(LlmError::MalformedResponse(_))
        ));
    }

    /// T-06: refined text keeps prose, strips fences, rejects empty.
    #[test]
    fn refined_text_extraction() {
        assert_eq!(
            parse_refined_text("```text\nI'm sorry you're in pain.\n```").unwrap(),
            "I'm sorry you're in pain."
        );
        assert_eq!(parse_refined_text("  plain answer ").unwrap(), "plain answer");
        assert!(parse_refined_text("``````").is_err());
    }
}
