use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::triage::{IntentCandidate, IntentInteraction, PriorityLevel, TriageAssessment};

/// One persisted triage turn.
#[derive(Debug, Clone)]
pub struct AssessmentRecord {
    pub id: Uuid,
    pub consultation_id: String,
    pub patient_id: String,
    pub level: PriorityLevel,
    pub score: f64,
    pub driving_intent: String,
    pub intents: Vec<IntentCandidate>,
    pub interactions: Vec<IntentInteraction>,
    pub follow_up_questions: Vec<String>,
    /// The reply that was actually sent, post-refinement.
    pub response: String,
    pub fallback: bool,
    pub processing_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl AssessmentRecord {
    /// Build the persistence row for one assessed turn.
    pub fn from_assessment(
        assessment: &TriageAssessment,
        consultation_id: &str,
        patient_id: &str,
        response: &str,
    ) -> Self {
        Self {
            id: assessment.id,
            consultation_id: consultation_id.to_string(),
            patient_id: patient_id.to_string(),
            level: assessment.priority.level,
            score: assessment.priority.score,
            driving_intent: assessment.priority.driving_intent.clone(),
            intents: assessment.intents.clone(),
            interactions: assessment.interactions.clone(),
            follow_up_questions: assessment.follow_up_questions.clone(),
            response: response.to_string(),
            fallback: assessment.fallback,
            processing_ms: assessment.processing_ms,
            created_at: assessment.assessed_at,
        }
    }
}

pub fn insert_assessment(
    conn: &Connection,
    record: &AssessmentRecord,
) -> Result<(), DatabaseError> {
    let intents_json =
        serde_json::to_string(&record.intents).unwrap_or_else(|_| "[]".to_string());
    let interactions_json =
        serde_json::to_string(&record.interactions).unwrap_or_else(|_| "[]".to_string());
    let questions_json =
        serde_json::to_string(&record.follow_up_questions).unwrap_or_else(|_| "[]".to_string());

    conn.execute(
        "INSERT INTO assessments
         (id, consultation_id, patient_id, level, score, driving_intent,
          intents, interactions, follow_up_questions, response, fallback,
          processing_ms, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            record.id.to_string(),
            record.consultation_id,
            record.patient_id,
            record.level.as_str(),
            record.score,
            record.driving_intent,
            intents_json,
            interactions_json,
            questions_json,
            record.response,
            record.fallback as i32,
            record.processing_ms as i64,
            record.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

struct RawAssessmentRow {
    id: String,
    consultation_id: String,
    patient_id: String,
    level: String,
    score: f64,
    driving_intent: String,
    intents: String,
    interactions: String,
    follow_up_questions: String,
    response: String,
    fallback: i32,
    processing_ms: i64,
    created_at: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAssessmentRow> {
    Ok(RawAssessmentRow {
        id: row.get(0)?,
        consultation_id: row.get(1)?,
        patient_id: row.get(2)?,
        level: row.get(3)?,
        score: row.get(4)?,
        driving_intent: row.get(5)?,
        intents: row.get(6)?,
        interactions: row.get(7)?,
        follow_up_questions: row.get(8)?,
        response: row.get(9)?,
        fallback: row.get(10)?,
        processing_ms: row.get(11)?,
        created_at: row.get(12)?,
    })
}

fn invalid(field: &str, value: &str) -> DatabaseError {
    DatabaseError::InvalidStored {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn into_record(raw: RawAssessmentRow) -> Result<AssessmentRecord, DatabaseError> {
    let id = Uuid::parse_str(&raw.id).map_err(|_| invalid("assessments.id", &raw.id))?;
    let level =
        PriorityLevel::parse(&raw.level).ok_or_else(|| invalid("assessments.level", &raw.level))?;
    let created_at = DateTime::parse_from_rfc3339(&raw.created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default();

    Ok(AssessmentRecord {
        id,
        consultation_id: raw.consultation_id,
        patient_id: raw.patient_id,
        level,
        score: raw.score,
        driving_intent: raw.driving_intent,
        intents: serde_json::from_str(&raw.intents).unwrap_or_default(),
        interactions: serde_json::from_str(&raw.interactions).unwrap_or_default(),
        follow_up_questions: serde_json::from_str(&raw.follow_up_questions).unwrap_or_default(),
        response: raw.response,
        fallback: raw.fallback != 0,
        processing_ms: raw.processing_ms.max(0) as u64,
        created_at,
    })
}

pub fn get_assessment(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<AssessmentRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, consultation_id, patient_id, level, score, driving_intent,
                intents, interactions, follow_up_questions, response, fallback,
                processing_ms, created_at
         FROM assessments WHERE id = ?1",
    )?;
    let raw = stmt
        .query_row(params![id.to_string()], read_row)
        .optional()?;
    raw.map(into_record).transpose()
}

/// Most recent assessments first.
pub fn list_recent_assessments(
    conn: &Connection,
    limit: usize,
) -> Result<Vec<AssessmentRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, consultation_id, patient_id, level, score, driving_intent,
                intents, interactions, follow_up_questions, response, fallback,
                processing_ms, created_at
         FROM assessments ORDER BY created_at DESC LIMIT ?1",
    )?;
    let raws = stmt
        .query_map(params![limit as i64], read_row)?
        .collect::<Result<Vec<_>, _>>()?;
    raws.into_iter().map(into_record).collect()
}

/// All assessments of one consultation, oldest first.
pub fn list_assessments_for_consultation(
    conn: &Connection,
    consultation_id: &str,
) -> Result<Vec<AssessmentRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, consultation_id, patient_id, level, score, driving_intent,
                intents, interactions, follow_up_questions, response, fallback,
                processing_ms, created_at
         FROM assessments WHERE consultation_id = ?1 ORDER BY created_at ASC",
    )?;
    let raws = stmt
        .query_map(params![consultation_id], read_row)?
        .collect::<Result<Vec<_>, _>>()?;
    raws.into_iter().map(into_record).collect()
}

pub fn count_assessments(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM assessments", [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::triage::InteractionType;

    fn sample_record(minutes_ago: i64) -> AssessmentRecord {
        AssessmentRecord {
            id: Uuid::new_v4(),
            consultation_id: "consult-1".to_string(),
            patient_id: "patient-1".to_string(),
            level: PriorityLevel::High,
            score: 6.5,
            driving_intent: "cardiac_chest_pain_assessment".to_string(),
            intents: vec![
                IntentCandidate::new("cardiac_chest_pain_assessment", 0.9),
                IntentCandidate::new("anxiety_concern", 0.4),
            ],
            interactions: vec![IntentInteraction {
                intent_a: "cardiac_chest_pain_assessment".to_string(),
                intent_b: "anxiety_concern".to_string(),
                interaction_type: InteractionType::Masking,
                clinical_significance: 0.6,
                priority_modifier: 0.25,
                rationale: "anxiety can mask cardiac symptoms".to_string(),
            }],
            follow_up_questions: vec!["When did the pain start?".to_string()],
            response: "Please get this looked at soon.".to_string(),
            fallback: false,
            processing_ms: 12,
            created_at: Utc::now() - chrono::Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let conn = open_memory_database().unwrap();
        let record = sample_record(0);
        insert_assessment(&conn, &record).unwrap();

        let got = get_assessment(&conn, &record.id).unwrap().unwrap();
        assert_eq!(got.id, record.id);
        assert_eq!(got.level, PriorityLevel::High);
        assert_eq!(got.intents, record.intents);
        assert_eq!(got.interactions.len(), 1);
        assert_eq!(
            got.interactions[0].interaction_type,
            InteractionType::Masking
        );
        assert_eq!(got.follow_up_questions, record.follow_up_questions);
        assert_eq!(got.created_at, record.created_at);
        assert!(!got.fallback);
    }

    #[test]
    fn get_missing_returns_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_assessment(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn recent_list_is_newest_first() {
        let conn = open_memory_database().unwrap();
        let old = sample_record(30);
        let mid = sample_record(10);
        let new = sample_record(0);
        for r in [&old, &mid, &new] {
            insert_assessment(&conn, r).unwrap();
        }

        let listed = list_recent_assessments(&conn, 2).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, new.id);
        assert_eq!(listed[1].id, mid.id);
        assert_eq!(count_assessments(&conn).unwrap(), 3);
    }

    #[test]
    fn consultation_list_is_oldest_first() {
        let conn = open_memory_database().unwrap();
        let mut other = sample_record(5);
        other.consultation_id = "consult-2".to_string();
        let first = sample_record(20);
        let second = sample_record(1);
        for r in [&other, &first, &second] {
            insert_assessment(&conn, r).unwrap();
        }

        let listed = list_assessments_for_consultation(&conn, "consult-1").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);
    }

    #[test]
    fn corrupted_level_is_reported() {
        let conn = open_memory_database().unwrap();
        let record = sample_record(0);
        insert_assessment(&conn, &record).unwrap();
        conn.execute("UPDATE assessments SET level = 'severe'", [])
            .unwrap();

        let err = get_assessment(&conn, &record.id).unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidStored { .. }));
    }

    #[test]
    fn fallback_flag_round_trips() {
        let conn = open_memory_database().unwrap();
        let mut record = sample_record(0);
        record.fallback = true;
        insert_assessment(&conn, &record).unwrap();
        let got = get_assessment(&conn, &record.id).unwrap().unwrap();
        assert!(got.fallback);
    }
}
