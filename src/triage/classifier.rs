//! Intent detection: keyword scoring merged with the external classifier.
//!
//! The keyword scorer is pure and always runs; the LLM pass is optional and
//! best-effort. Any LLM transport or parse failure degrades to keyword-only
//! results (the caller just learns it happened via `llm_degraded`).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::catalog;
use super::types::IntentCandidate;
use crate::llm::{parse, prompts, LlmClient};

/// Ranked output is capped at this many intents.
pub const MAX_INTENTS: usize = 5;

const KEYWORD_BASE_CONFIDENCE: f64 = 0.35;
const KEYWORD_HIT_INCREMENT: f64 = 0.15;
const KEYWORD_CONFIDENCE_CAP: f64 = 0.9;

// ---------------------------------------------------------------------------
// Keyword scoring
// ---------------------------------------------------------------------------

/// Multi-word keywords match as substrings of the lowercased message;
/// single words must match a whole word, so "painting" never hits "pain".
fn keyword_matches(lowered: &str, words: &HashSet<&str>, keyword: &str) -> bool {
    if keyword.contains(' ') || keyword.chars().any(|c| !c.is_alphanumeric()) {
        lowered.contains(keyword)
    } else {
        words.contains(keyword)
    }
}

/// Score every catalog intent against the message.
///
/// Confidence grows with the hit count (0.35 + 0.15 per hit) and is capped
/// below 1.0 so keyword evidence alone never saturates an intent.
pub fn detect_keyword_intents(message: &str) -> Vec<IntentCandidate> {
    let lowered = message.to_lowercase();
    let words: HashSet<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let mut candidates = Vec::new();
    for def in catalog::definitions() {
        let hits = def
            .keywords
            .iter()
            .filter(|kw| keyword_matches(&lowered, &words, kw))
            .count();
        if hits > 0 {
            let confidence = (KEYWORD_BASE_CONFIDENCE + KEYWORD_HIT_INCREMENT * hits as f64)
                .min(KEYWORD_CONFIDENCE_CAP);
            candidates.push(IntentCandidate::new(def.name, confidence));
        }
    }
    candidates
}

// ---------------------------------------------------------------------------
// Merging and ranking
// ---------------------------------------------------------------------------

/// Union two candidate sets, keeping the maximum confidence per intent.
pub fn merge_candidates(
    base: Vec<IntentCandidate>,
    extra: Vec<IntentCandidate>,
) -> Vec<IntentCandidate> {
    let mut by_name: HashMap<String, f64> = HashMap::new();
    for c in base.into_iter().chain(extra) {
        let entry = by_name.entry(c.name).or_insert(0.0);
        if c.confidence > *entry {
            *entry = c.confidence;
        }
    }
    by_name
        .into_iter()
        .map(|(name, confidence)| IntentCandidate::new(name, confidence))
        .collect()
}

/// Sort confidence-descending (name-ascending tie-break for determinism)
/// and truncate to the top 5.
pub fn rank_candidates(mut candidates: Vec<IntentCandidate>) -> Vec<IntentCandidate> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    candidates.truncate(MAX_INTENTS);
    candidates
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Output of one classification pass.
pub struct ClassifierOutput {
    /// Merged keyword + LLM candidates, unranked and untruncated; the
    /// orchestrator still has to union compound matches and boost before
    /// ranking.
    pub candidates: Vec<IntentCandidate>,
    /// True when an LLM call was attempted and failed (transport or parse).
    pub llm_degraded: bool,
}

pub struct IntentClassifier {
    llm: Option<Arc<dyn LlmClient>>,
}

impl IntentClassifier {
    pub fn new(llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self { llm }
    }

    /// Classifier without an external model; keyword scoring only.
    pub fn keyword_only() -> Self {
        Self { llm: None }
    }

    pub async fn classify(&self, message: &str) -> ClassifierOutput {
        let keyword_candidates = detect_keyword_intents(message);

        let mut llm_candidates = Vec::new();
        let mut llm_degraded = false;
        if let Some(client) = &self.llm {
            match self.classify_with_llm(client.as_ref(), message).await {
                Ok(candidates) => llm_candidates = candidates,
                Err(e) => {
                    tracing::warn!(error = %e, "intent LLM unavailable, using keyword results");
                    llm_degraded = true;
                }
            }
        }

        ClassifierOutput {
            candidates: merge_candidates(keyword_candidates, llm_candidates),
            llm_degraded,
        }
    }

    async fn classify_with_llm(
        &self,
        client: &dyn LlmClient,
        message: &str,
    ) -> Result<Vec<IntentCandidate>, crate::llm::LlmError> {
        let prompt = prompts::build_intent_prompt(message);
        let response = client.generate(&prompt).await?;
        let parsed = parse::parse_intent_candidates(&response)?;

        // Labels outside the catalog are dropped, except emergency-flavored
        // ones, which the heuristics downstream know how to treat.
        let (kept, dropped): (Vec<_>, Vec<_>) = parsed.into_iter().partition(|c| {
            catalog::lookup(&c.name).is_some() || catalog::is_emergency(&c.name)
        });
        if !dropped.is_empty() {
            tracing::debug!(
                dropped = dropped.len(),
                labels = ?dropped.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                "LLM returned labels outside the catalog"
            );
        }
        Ok(kept)
    }
}
