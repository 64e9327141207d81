use std::sync::LazyLock;

use regex::Regex;

/// What a red flag points at clinically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedFlagCategory {
    Cardiac,
    Stroke,
    Anaphylaxis,
    SelfHarm,
    Bleeding,
    Breathing,
}

impl RedFlagCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cardiac => "cardiac",
            Self::Stroke => "stroke",
            Self::Anaphylaxis => "anaphylaxis",
            Self::SelfHarm => "self_harm",
            Self::Bleeding => "bleeding",
            Self::Breathing => "breathing",
        }
    }
}

/// A compiled red-flag pattern with its clinical metadata.
pub struct RedFlagPattern {
    pub id: &'static str,
    regex: Regex,
    pub category: RedFlagCategory,
    pub description: &'static str,
}

/// Patient-message wording that must never end up in a low bucket.
/// Matched against the raw message, not the assessment.
static RED_FLAG_PATTERNS: LazyLock<Vec<RedFlagPattern>> = LazyLock::new(|| {
    vec![
        pattern(
            "RF-01",
            r"(?i)\b(?:crushing|squeezing|pressing|elephant\s+on\s+my)\b.{0,40}\bchest\b",
            RedFlagCategory::Cardiac,
            "Crushing or squeezing chest pain",
        ),
        pattern(
            "RF-02",
            r"(?i)\bchest\b.{0,60}\bradiat\w+\b|\bpain\b.{0,50}\b(?:left\s+arm|jaw|shoulder\s+blade)\b",
            RedFlagCategory::Cardiac,
            "Chest pain radiating to arm, jaw, or shoulder blade",
        ),
        pattern(
            "RF-03",
            r"(?i)\b(?:face|facial)\b.{0,15}\b(?:droop|numb)\w*|\bslurr\w+\s+speech\b|\bone\s+side\b.{0,30}\b(?:numb|weak)\w*",
            RedFlagCategory::Stroke,
            "Facial droop, slurred speech, or one-sided weakness",
        ),
        pattern(
            "RF-04",
            r"(?i)\bworst\s+headache\b|\bthunderclap\s+headache\b",
            RedFlagCategory::Stroke,
            "Worst-ever or thunderclap headache",
        ),
        pattern(
            "RF-05",
            r"(?i)\bthroat\b.{0,30}\b(?:closing|swelling|tight)\w*|\b(?:can'?t|cannot)\s+swallow\b|\btongue\b.{0,20}\bswell\w*",
            RedFlagCategory::Anaphylaxis,
            "Throat or tongue swelling",
        ),
        pattern(
            "RF-06",
            r"(?i)\b(?:kill|hurt|harm)\w*\s+myself\b|\bsuicid\w+\b|\bend\s+my\s+life\b|\bdon'?t\s+want\s+to\s+(?:live|be\s+alive)\b",
            RedFlagCategory::SelfHarm,
            "Self-harm or suicidal language",
        ),
        pattern(
            "RF-07",
            r"(?i)\bbleed\w*\b.{0,30}\b(?:won'?t|will\s+not)\s+stop\b|\b(?:heavy|severe|uncontroll\w+)\s+bleeding\b|\bblood\s+everywhere\b",
            RedFlagCategory::Bleeding,
            "Bleeding that does not stop",
        ),
        pattern(
            "RF-08",
            r"(?i)\b(?:can'?t|cannot|barely|hardly)\s+breathe?\b|\bgasping\s+for\b|\b(?:lips|face)\b.{0,20}\b(?:blue|gr[ae]y)\b",
            RedFlagCategory::Breathing,
            "Severe breathing difficulty",
        ),
    ]
});

fn pattern(
    id: &'static str,
    regex_str: &str,
    category: RedFlagCategory,
    description: &'static str,
) -> RedFlagPattern {
    RedFlagPattern {
        id,
        regex: Regex::new(regex_str).expect("Invalid red-flag regex pattern"),
        category,
        description,
    }
}

/// Scan a patient message for red flags. Each pattern reports at most once.
pub fn scan_red_flags(message: &str) -> Vec<&'static RedFlagPattern> {
    RED_FLAG_PATTERNS
        .iter()
        .filter(|p| p.regex.is_match(message))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(message: &str) -> Vec<RedFlagCategory> {
        scan_red_flags(message).iter().map(|p| p.category).collect()
    }

    #[test]
    fn crushing_chest_pain_is_cardiac() {
        assert!(categories("it feels like something is crushing my chest")
            .contains(&RedFlagCategory::Cardiac));
        assert!(categories("a squeezing pressure in my chest")
            .contains(&RedFlagCategory::Cardiac));
    }

    #[test]
    fn radiating_pain_is_cardiac() {
        assert!(categories("chest discomfort radiating down my arm")
            .contains(&RedFlagCategory::Cardiac));
        assert!(categories("the pain goes into my jaw").contains(&RedFlagCategory::Cardiac));
    }

    #[test]
    fn stroke_signs_detected() {
        assert!(categories("his face is drooping on one side").contains(&RedFlagCategory::Stroke));
        assert!(categories("she has slurred speech suddenly").contains(&RedFlagCategory::Stroke));
        assert!(categories("one side of my body feels numb").contains(&RedFlagCategory::Stroke));
        assert!(categories("the worst headache of my life").contains(&RedFlagCategory::Stroke));
    }

    #[test]
    fn airway_swelling_is_anaphylaxis() {
        assert!(categories("my throat feels like it's closing up")
            .contains(&RedFlagCategory::Anaphylaxis));
        assert!(categories("I can't swallow and my tongue is swelling")
            .contains(&RedFlagCategory::Anaphylaxis));
    }

    #[test]
    fn self_harm_language_detected() {
        assert!(categories("I want to hurt myself").contains(&RedFlagCategory::SelfHarm));
        assert!(categories("I've been having suicidal thoughts")
            .contains(&RedFlagCategory::SelfHarm));
        assert!(categories("I don't want to be alive anymore")
            .contains(&RedFlagCategory::SelfHarm));
    }

    #[test]
    fn uncontrolled_bleeding_detected() {
        assert!(categories("the cut is bleeding and it won't stop")
            .contains(&RedFlagCategory::Bleeding));
        assert!(categories("there is heavy bleeding from the wound")
            .contains(&RedFlagCategory::Bleeding));
    }

    #[test]
    fn breathing_failure_detected() {
        assert!(categories("I can't breathe properly").contains(&RedFlagCategory::Breathing));
        assert!(categories("he is gasping for air and his lips look blue")
            .contains(&RedFlagCategory::Breathing));
    }

    #[test]
    fn ordinary_messages_are_clean() {
        let clean = [
            "I have a mild headache since this morning",
            "Can I take ibuprofen with my blood pressure medication?",
            "I'd like to schedule a check-up next week",
            "My knee hurts when I run",
        ];
        for message in clean {
            assert!(
                scan_red_flags(message).is_empty(),
                "false red flag on: {message}"
            );
        }
    }

    #[test]
    fn each_pattern_reports_once() {
        let hits = scan_red_flags("crushing pain in my chest, crushing feeling in my chest");
        let mut ids: Vec<&str> = hits.iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), hits.len());
    }
}
