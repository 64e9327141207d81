//! Validation-case lifecycle.
//!
//! High-stakes assessments get a pending case a clinician can later
//! confirm, adjust, or dismiss. The case rides on the persisted
//! assessment row; this module owns when a case opens and how a review
//! lands.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::validator::{FlagSeverity, SafetyFlag};
use crate::db::{self, Database, DatabaseError};
use crate::triage::{PriorityLevel, TriageAssessment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStatus {
    Pending,
    Reviewed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "reviewed" => Some(Self::Reviewed),
            _ => None,
        }
    }
}

/// What the reviewer concluded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReviewOutcome {
    /// The automated priority stood.
    Confirmed,
    /// The reviewer re-leveled the assessment.
    Adjusted(PriorityLevel),
    /// Case was noise.
    Dismissed,
}

impl ReviewOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Adjusted(_) => "adjusted",
            Self::Dismissed => "dismissed",
        }
    }

    pub fn adjusted_level(&self) -> Option<PriorityLevel> {
        match self {
            Self::Adjusted(level) => Some(*level),
            _ => None,
        }
    }
}

/// One review case over a persisted assessment.
#[derive(Debug, Clone)]
pub struct ValidationCase {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub priority_level: PriorityLevel,
    pub status: CaseStatus,
    pub outcome: Option<ReviewOutcome>,
    pub reviewer: Option<String>,
    pub notes: Option<String>,
    pub opened_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl ValidationCase {
    pub fn for_assessment(assessment: &TriageAssessment) -> Self {
        Self {
            id: Uuid::new_v4(),
            assessment_id: assessment.id,
            priority_level: assessment.priority.level,
            status: CaseStatus::Pending,
            outcome: None,
            reviewer: None,
            notes: None,
            opened_at: Utc::now(),
            reviewed_at: None,
        }
    }
}

/// Aggregate review counts for the whole table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationStats {
    pub pending: u64,
    pub reviewed: u64,
    pub confirmed: u64,
    pub adjusted: u64,
    pub dismissed: u64,
}

pub struct ValidationWorkflow {
    db: Arc<Database>,
}

impl ValidationWorkflow {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Open a pending case when the turn warrants one: priority at High or
    /// above, or any warning-severity safety flag. The assessment row must
    /// already be persisted.
    pub fn maybe_open_case(
        &self,
        assessment: &TriageAssessment,
        flags: &[SafetyFlag],
    ) -> Result<Option<Uuid>, DatabaseError> {
        let needs_review = assessment.priority.level >= PriorityLevel::High
            || flags.iter().any(|f| f.severity == FlagSeverity::Warning);
        if !needs_review {
            return Ok(None);
        }

        let case = ValidationCase::for_assessment(assessment);
        self.db
            .with_conn(|conn| db::insert_validation_case(conn, &case))?;
        tracing::info!(
            case_id = %case.id,
            assessment_id = %case.assessment_id,
            level = case.priority_level.as_str(),
            "validation case opened"
        );
        Ok(Some(case.id))
    }

    /// Land a reviewer decision on a pending case.
    pub fn record_review(
        &self,
        case_id: &Uuid,
        outcome: ReviewOutcome,
        reviewer: &str,
        notes: Option<&str>,
    ) -> Result<(), DatabaseError> {
        self.db.with_conn(|conn| {
            db::update_validation_review(conn, case_id, &outcome, reviewer, notes, Utc::now())
        })?;
        tracing::info!(
            case_id = %case_id,
            outcome = outcome.as_str(),
            reviewer,
            "validation case reviewed"
        );
        Ok(())
    }

    pub fn pending_cases(&self) -> Result<Vec<ValidationCase>, DatabaseError> {
        self.db.with_conn(db::list_pending_cases)
    }

    pub fn stats(&self) -> Result<ValidationStats, DatabaseError> {
        self.db.with_conn(db::validation_case_stats)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::db::{insert_assessment, AssessmentRecord};
    use crate::triage::orchestrator::fallback_assessment;

    fn assessment_at(level: PriorityLevel) -> TriageAssessment {
        let mut assessment = fallback_assessment(Instant::now());
        assessment.fallback = false;
        assessment.priority.level = level;
        assessment
    }

    fn persist(db: &Database, assessment: &TriageAssessment) {
        let record = AssessmentRecord::from_assessment(assessment, "consult-1", "patient-1", "ok");
        db.with_conn(|conn| insert_assessment(conn, &record))
            .unwrap();
    }

    fn warning_flag() -> SafetyFlag {
        SafetyFlag {
            rule_id: "SAF-001",
            severity: FlagSeverity::Warning,
            message: "test".to_string(),
        }
    }

    #[test]
    fn high_priority_opens_case() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let workflow = ValidationWorkflow::new(db.clone());
        let assessment = assessment_at(PriorityLevel::High);
        persist(&db, &assessment);

        let case_id = workflow.maybe_open_case(&assessment, &[]).unwrap();
        assert!(case_id.is_some());

        let pending = workflow.pending_cases().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].assessment_id, assessment.id);
        assert_eq!(pending[0].status, CaseStatus::Pending);
    }

    #[test]
    fn quiet_low_priority_opens_nothing() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let workflow = ValidationWorkflow::new(db.clone());
        let assessment = assessment_at(PriorityLevel::Low);
        persist(&db, &assessment);

        assert!(workflow.maybe_open_case(&assessment, &[]).unwrap().is_none());
        assert!(workflow.pending_cases().unwrap().is_empty());
    }

    #[test]
    fn warning_flag_opens_case_at_any_level() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let workflow = ValidationWorkflow::new(db.clone());
        let assessment = assessment_at(PriorityLevel::Routine);
        persist(&db, &assessment);

        let case_id = workflow
            .maybe_open_case(&assessment, &[warning_flag()])
            .unwrap();
        assert!(case_id.is_some());
    }

    #[test]
    fn review_lands_outcome_and_stats() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let workflow = ValidationWorkflow::new(db.clone());

        let confirmed = assessment_at(PriorityLevel::High);
        persist(&db, &confirmed);
        let confirmed_case = workflow.maybe_open_case(&confirmed, &[]).unwrap().unwrap();

        let adjusted = assessment_at(PriorityLevel::Critical);
        persist(&db, &adjusted);
        let adjusted_case = workflow.maybe_open_case(&adjusted, &[]).unwrap().unwrap();

        let open = assessment_at(PriorityLevel::Emergency);
        persist(&db, &open);
        workflow.maybe_open_case(&open, &[]).unwrap().unwrap();

        workflow
            .record_review(&confirmed_case, ReviewOutcome::Confirmed, "dr-ellis", None)
            .unwrap();
        workflow
            .record_review(
                &adjusted_case,
                ReviewOutcome::Adjusted(PriorityLevel::High),
                "dr-ellis",
                Some("patient had known anxiety history"),
            )
            .unwrap();

        let stats = workflow.stats().unwrap();
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.reviewed, 2);
        assert_eq!(stats.confirmed, 1);
        assert_eq!(stats.adjusted, 1);
        assert_eq!(stats.dismissed, 0);

        let case = db
            .with_conn(|conn| crate::db::get_validation_case(conn, &adjusted_case))
            .unwrap()
            .unwrap();
        assert_eq!(case.status, CaseStatus::Reviewed);
        assert_eq!(
            case.outcome,
            Some(ReviewOutcome::Adjusted(PriorityLevel::High))
        );
        assert_eq!(case.reviewer.as_deref(), Some("dr-ellis"));
        assert!(case.reviewed_at.is_some());
    }

    #[test]
    fn review_of_unknown_case_is_not_found() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let workflow = ValidationWorkflow::new(db);
        let err = workflow
            .record_review(&Uuid::new_v4(), ReviewOutcome::Dismissed, "dr-ellis", None)
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }
}
