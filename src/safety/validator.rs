//! Post-hoc safety checks over one completed triage turn.
//!
//! Rules run against the patient message, the assessment, and the
//! outgoing response. They never block or rewrite anything; they flag,
//! log, and leave the record for human review. A triage bot that
//! silently edits itself is harder to audit than one that owns its
//! misses.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::keywords::{scan_red_flags, RedFlagCategory};
use crate::triage::{PriorityLevel, TriageAssessment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagSeverity {
    /// Worth a look during review.
    Advisory,
    /// Should open a validation case.
    Warning,
}

impl FlagSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Advisory => "advisory",
            Self::Warning => "warning",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "advisory" => Some(Self::Advisory),
            "warning" => Some(Self::Warning),
            _ => None,
        }
    }
}

/// One fired safety rule.
#[derive(Debug, Clone, Serialize)]
pub struct SafetyFlag {
    pub rule_id: &'static str,
    pub severity: FlagSeverity,
    pub message: String,
}

/// Response phrasing that claims a diagnosis. The assistant triages; it
/// never tells a patient what they have.
static DIAGNOSIS_CLAIM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\byou\s+(?:have|are\s+suffering\s+from)\s+(?:a\s+|an\s+)?[a-z]",
        r"(?i)\byou\s+(?:likely|probably|definitely)\s+have\b",
        r"(?i)\bthis\s+is\s+(?:definitely|certainly)\b",
        r"(?i)\bdiagnos(?:is|ed)\s+is\b",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("Invalid diagnosis-claim regex"))
    .collect()
});

/// Response phrasing that changes a medication regimen.
static DOSING_DIRECTIVE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bstop\s+taking\s+your\b",
        r"(?i)\b(?:double|triple|halve)\s+(?:the|your)\s+dose\b",
        r"(?i)\btake\s+an?\s+extra\s+(?:dose|pill|tablet)\b",
        r"(?i)\b(?:increase|decrease)\s+your\s+(?:dose|dosage)\b",
        r"(?i)\bskip\s+your\s+(?:next\s+)?(?:dose|medication)\b",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("Invalid dosing-directive regex"))
    .collect()
});

fn response_mentions_emergency_services(response: &str) -> bool {
    let lower = response.to_lowercase();
    lower.contains("911") || lower.contains("emergency")
}

/// Run every safety rule over one turn. Each flag is logged as it fires.
pub fn validate_assessment(
    message: &str,
    assessment: &TriageAssessment,
    response: &str,
) -> Vec<SafetyFlag> {
    let mut flags = Vec::new();
    let red_flags = scan_red_flags(message);
    let level = assessment.priority.level;

    // SAF-001: red-flag wording in the message but the fold landed below
    // critical. One flag per category.
    let mut seen = Vec::new();
    for hit in &red_flags {
        if hit.category == RedFlagCategory::SelfHarm || seen.contains(&hit.category) {
            continue;
        }
        seen.push(hit.category);
        if level < PriorityLevel::Critical {
            flags.push(SafetyFlag {
                rule_id: "SAF-001",
                severity: FlagSeverity::Warning,
                message: format!(
                    "possible under-triage: {} ({}) but priority is {}",
                    hit.description,
                    hit.category.as_str(),
                    level.as_str()
                ),
            });
        }
    }

    // SAF-002: self-harm language that did not reach emergency handling.
    if red_flags
        .iter()
        .any(|hit| hit.category == RedFlagCategory::SelfHarm)
        && level < PriorityLevel::Critical
    {
        flags.push(SafetyFlag {
            rule_id: "SAF-002",
            severity: FlagSeverity::Warning,
            message: format!(
                "self-harm language without emergency escalation (priority {})",
                level.as_str()
            ),
        });
    }

    // SAF-003: the response claims a diagnosis.
    if let Some(m) = DIAGNOSIS_CLAIM_PATTERNS
        .iter()
        .find_map(|p| p.find(response))
    {
        flags.push(SafetyFlag {
            rule_id: "SAF-003",
            severity: FlagSeverity::Advisory,
            message: format!("diagnosis-claim phrasing in response: \"{}\"", m.as_str()),
        });
    }

    // SAF-004: critical-or-above assessment whose response never names
    // emergency services.
    if level >= PriorityLevel::Critical && !response_mentions_emergency_services(response) {
        flags.push(SafetyFlag {
            rule_id: "SAF-004",
            severity: FlagSeverity::Warning,
            message: format!(
                "{} assessment but response does not name emergency services",
                level.as_str()
            ),
        });
    }

    // SAF-005: the canned fallback swallowed a red-flagged message.
    if assessment.fallback && !red_flags.is_empty() {
        flags.push(SafetyFlag {
            rule_id: "SAF-005",
            severity: FlagSeverity::Warning,
            message: format!(
                "fallback response while message carries {} red flag(s)",
                red_flags.len()
            ),
        });
    }

    // SAF-006: the response instructs a medication change.
    if let Some(m) = DOSING_DIRECTIVE_PATTERNS
        .iter()
        .find_map(|p| p.find(response))
    {
        flags.push(SafetyFlag {
            rule_id: "SAF-006",
            severity: FlagSeverity::Advisory,
            message: format!("medication directive in response: \"{}\"", m.as_str()),
        });
    }

    for flag in &flags {
        tracing::warn!(
            rule = flag.rule_id,
            severity = flag.severity.as_str(),
            detail = %flag.message,
            "clinical safety flag"
        );
    }
    flags
}
