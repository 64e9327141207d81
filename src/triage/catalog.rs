//! Static intent knowledge base.
//!
//! One row per intent the classifier can produce: hand-authored base
//! priority (0-10), the keyword list the scorer matches against, and a
//! family tag used by interaction heuristics and boosting. Tables are
//! data, not logic; the scoring lives in `classifier.rs` and
//! `priority.rs`.

// ---------------------------------------------------------------------------
// Intent names
// ---------------------------------------------------------------------------

pub const EMERGENCY_ESCALATION: &str = "emergency_escalation";
pub const CARDIAC_CHEST_PAIN: &str = "cardiac_chest_pain_assessment";
pub const BREATHING_DIFFICULTY: &str = "breathing_difficulty_assessment";
pub const NEUROLOGICAL: &str = "neurological_assessment";
pub const SYMPTOM_REPORTING: &str = "symptom_reporting";
pub const PAIN_ASSESSMENT: &str = "pain_assessment";
pub const ANXIETY_CONCERN: &str = "anxiety_concern";
pub const MEDICATION_QUESTION: &str = "medication_question";
pub const CHRONIC_CONDITION: &str = "chronic_condition_management";
pub const TEST_RESULTS: &str = "test_results_inquiry";
pub const APPOINTMENT_SCHEDULING: &str = "appointment_scheduling";
pub const GENERAL_INQUIRY: &str = "general_inquiry";

/// Base priority used when an intent is not in the catalog (an LLM label
/// we did not list, for instance). Low, so unknowns never drive triage.
pub const DEFAULT_BASE_PRIORITY: f64 = 1.0;

/// Exception to the rule above: an unknown label that is still
/// emergency-flavored (`pediatric_emergency`) must not fold to routine.
pub const EMERGENCY_FALLBACK_BASE: f64 = 9.0;

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentFamily {
    Emergency,
    Assessment,
    Symptom,
    Concern,
    Medication,
    Administrative,
}

pub struct IntentDefinition {
    pub name: &'static str,
    pub base_priority: f64,
    pub family: IntentFamily,
    /// Lowercase. Multi-word entries are matched as substrings, single
    /// words as whole words (see `classifier::keyword_matches`).
    pub keywords: &'static [&'static str],
}

static INTENTS: &[IntentDefinition] = &[
    IntentDefinition {
        name: EMERGENCY_ESCALATION,
        base_priority: 10.0,
        family: IntentFamily::Emergency,
        keywords: &[
            "emergency",
            "call 911",
            "911",
            "ambulance",
            "unconscious",
            "not breathing",
            "unresponsive",
            "collapsed",
            "passed out",
        ],
    },
    IntentDefinition {
        name: CARDIAC_CHEST_PAIN,
        base_priority: 8.5,
        family: IntentFamily::Assessment,
        keywords: &[
            "chest pain",
            "chest pressure",
            "chest tightness",
            "heart pain",
            "heart attack",
            "angina",
            "palpitations",
            "heart racing",
        ],
    },
    IntentDefinition {
        name: BREATHING_DIFFICULTY,
        base_priority: 8.0,
        family: IntentFamily::Assessment,
        keywords: &[
            "short of breath",
            "shortness of breath",
            "can't breathe",
            "cannot breathe",
            "difficulty breathing",
            "trouble breathing",
            "wheezing",
            "gasping",
        ],
    },
    IntentDefinition {
        name: NEUROLOGICAL,
        base_priority: 7.5,
        family: IntentFamily::Assessment,
        keywords: &[
            "slurred speech",
            "face drooping",
            "facial droop",
            "numbness",
            "weakness on one side",
            "stroke",
            "seizure",
            "sudden confusion",
            "vision loss",
        ],
    },
    IntentDefinition {
        name: SYMPTOM_REPORTING,
        base_priority: 6.0,
        family: IntentFamily::Symptom,
        keywords: &[
            "symptom",
            "fever",
            "nausea",
            "vomiting",
            "dizzy",
            "dizziness",
            "headache",
            "rash",
            "swelling",
            "cough",
            "fatigue",
            "chills",
        ],
    },
    IntentDefinition {
        name: PAIN_ASSESSMENT,
        base_priority: 5.5,
        family: IntentFamily::Assessment,
        keywords: &["pain", "hurts", "hurting", "aching", "sore", "ache", "painful"],
    },
    IntentDefinition {
        name: ANXIETY_CONCERN,
        base_priority: 4.5,
        family: IntentFamily::Concern,
        keywords: &[
            "worried",
            "anxious",
            "anxiety",
            "scared",
            "afraid",
            "nervous",
            "panic",
            "stressed",
            "frightened",
        ],
    },
    IntentDefinition {
        name: MEDICATION_QUESTION,
        base_priority: 4.0,
        family: IntentFamily::Medication,
        keywords: &[
            "medication",
            "medicine",
            "pill",
            "dose",
            "dosage",
            "prescription",
            "refill",
            "side effect",
            "side effects",
        ],
    },
    IntentDefinition {
        name: CHRONIC_CONDITION,
        base_priority: 3.5,
        family: IntentFamily::Medication,
        keywords: &[
            "diabetes",
            "blood pressure",
            "hypertension",
            "asthma",
            "chronic",
            "blood sugar",
            "insulin",
            "copd",
            "arthritis",
        ],
    },
    IntentDefinition {
        name: TEST_RESULTS,
        base_priority: 3.0,
        family: IntentFamily::Administrative,
        keywords: &[
            "test result",
            "test results",
            "lab result",
            "lab results",
            "blood test",
            "x-ray",
            "scan result",
            "mri",
            "biopsy",
        ],
    },
    IntentDefinition {
        name: APPOINTMENT_SCHEDULING,
        base_priority: 2.0,
        family: IntentFamily::Administrative,
        keywords: &[
            "appointment",
            "schedule",
            "reschedule",
            "book a",
            "booking",
            "cancel my",
            "available slot",
            "opening",
        ],
    },
    IntentDefinition {
        name: GENERAL_INQUIRY,
        base_priority: 1.5,
        family: IntentFamily::Administrative,
        keywords: &[
            "question",
            "information",
            "wondering",
            "how do i",
            "what is",
            "opening hours",
            "insurance",
        ],
    },
];

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

pub fn definitions() -> &'static [IntentDefinition] {
    INTENTS
}

pub fn lookup(name: &str) -> Option<&'static IntentDefinition> {
    INTENTS.iter().find(|d| d.name == name)
}

/// Base priority for the fold; unknown intents score low instead of
/// erroring, except emergency-flavored ones.
pub fn base_priority(name: &str) -> f64 {
    match lookup(name) {
        Some(d) => d.base_priority,
        None if is_emergency(name) => EMERGENCY_FALLBACK_BASE,
        None => DEFAULT_BASE_PRIORITY,
    }
}

/// Any intent whose name carries `emergency` counts, so LLM-invented labels
/// like `pediatric_emergency` still trip the emergency heuristics.
pub fn is_emergency(name: &str) -> bool {
    name.contains("emergency")
}

/// Membership list for the synergistic-pair heuristic.
pub fn is_symptom_or_assessment(name: &str) -> bool {
    lookup(name).is_some_and(|d| {
        matches!(d.family, IntentFamily::Assessment | IntentFamily::Symptom)
    })
}

/// Labels the LLM classifier is allowed to return, prompt-ready.
pub fn intent_names() -> impl Iterator<Item = &'static str> {
    INTENTS.iter().map(|d| d.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// T-01: names are unique and keywords are lowercase (the scorer
    /// lowercases the message once and never the table).
    #[test]
    fn table_is_well_formed() {
        let mut seen = std::collections::HashSet::new();
        for def in definitions() {
            assert!(seen.insert(def.name), "duplicate intent {}", def.name);
            assert!(
                (0.0..=10.0).contains(&def.base_priority),
                "{} base out of range",
                def.name
            );
            assert!(!def.keywords.is_empty(), "{} has no keywords", def.name);
            for kw in def.keywords {
                assert_eq!(*kw, kw.to_lowercase(), "keyword not lowercase: {kw}");
            }
        }
    }

    /// T-02: base priorities follow clinical ordering for the top tiers.
    #[test]
    fn base_priority_ordering() {
        assert_eq!(base_priority(EMERGENCY_ESCALATION), 10.0);
        assert!(base_priority(CARDIAC_CHEST_PAIN) > base_priority(SYMPTOM_REPORTING));
        assert!(base_priority(SYMPTOM_REPORTING) > base_priority(MEDICATION_QUESTION));
        assert!(base_priority(MEDICATION_QUESTION) > base_priority(GENERAL_INQUIRY));
    }

    /// T-03: unknown intents fall back to the default base, unless they
    /// carry emergency flavor.
    #[test]
    fn unknown_intent_defaults() {
        assert!(lookup("made_up_intent").is_none());
        assert_eq!(base_priority("made_up_intent"), DEFAULT_BASE_PRIORITY);
        assert_eq!(base_priority("pediatric_emergency"), EMERGENCY_FALLBACK_BASE);
    }

    /// T-04: emergency detection is substring-based.
    #[test]
    fn emergency_is_substring_match() {
        assert!(is_emergency(EMERGENCY_ESCALATION));
        assert!(is_emergency("pediatric_emergency"));
        assert!(!is_emergency(CARDIAC_CHEST_PAIN));
    }

    /// T-05: heuristic membership list covers assessments and symptoms only.
    #[test]
    fn symptom_or_assessment_membership() {
        assert!(is_symptom_or_assessment(CARDIAC_CHEST_PAIN));
        assert!(is_symptom_or_assessment(SYMPTOM_REPORTING));
        assert!(is_symptom_or_assessment(PAIN_ASSESSMENT));
        assert!(!is_symptom_or_assessment(APPOINTMENT_SCHEDULING));
        assert!(!is_symptom_or_assessment(EMERGENCY_ESCALATION));
        assert!(!is_symptom_or_assessment(ANXIETY_CONCERN));
    }
}
