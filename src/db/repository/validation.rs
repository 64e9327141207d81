//! Validation-case persistence.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::safety::workflow::{CaseStatus, ReviewOutcome, ValidationCase, ValidationStats};
use crate::triage::PriorityLevel;

pub fn insert_validation_case(
    conn: &Connection,
    case: &ValidationCase,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO validation_cases
             (id, assessment_id, priority_level, status, outcome, adjusted_level,
              reviewer, notes, opened_at, reviewed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            case.id.to_string(),
            case.assessment_id.to_string(),
            case.priority_level.as_str(),
            case.status.as_str(),
            case.outcome.as_ref().map(|o| o.as_str()),
            case.outcome
                .as_ref()
                .and_then(|o| o.adjusted_level())
                .map(|l| l.as_str()),
            case.reviewer,
            case.notes,
            case.opened_at.to_rfc3339(),
            case.reviewed_at.map(|t| t.to_rfc3339()),
        ],
    )?;
    Ok(())
}

pub fn get_validation_case(
    conn: &Connection,
    case_id: &Uuid,
) -> Result<Option<ValidationCase>, DatabaseError> {
    let raw = conn
        .query_row(
            "SELECT id, assessment_id, priority_level, status, outcome, adjusted_level,
                    reviewer, notes, opened_at, reviewed_at
             FROM validation_cases WHERE id = ?1",
            params![case_id.to_string()],
            read_row,
        )
        .optional()?;
    raw.map(into_case).transpose()
}

pub fn list_pending_cases(conn: &Connection) -> Result<Vec<ValidationCase>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, assessment_id, priority_level, status, outcome, adjusted_level,
                reviewer, notes, opened_at, reviewed_at
         FROM validation_cases WHERE status = 'pending' ORDER BY opened_at ASC",
    )?;
    let rows = stmt
        .query_map([], read_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(into_case).collect()
}

/// Mark a pending case reviewed. Errors with `NotFound` when no case has
/// the given id.
pub fn update_validation_review(
    conn: &Connection,
    case_id: &Uuid,
    outcome: &ReviewOutcome,
    reviewer: &str,
    notes: Option<&str>,
    reviewed_at: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE validation_cases
         SET status = 'reviewed', outcome = ?2, adjusted_level = ?3,
             reviewer = ?4, notes = ?5, reviewed_at = ?6
         WHERE id = ?1",
        params![
            case_id.to_string(),
            outcome.as_str(),
            outcome.adjusted_level().map(|l| l.as_str()),
            reviewer,
            notes,
            reviewed_at.to_rfc3339(),
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "validation_case".to_string(),
            id: case_id.to_string(),
        });
    }
    Ok(())
}

/// Aggregate counts by status and outcome in one pass.
pub fn validation_case_stats(conn: &Connection) -> Result<ValidationStats, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT status, outcome, COUNT(*) FROM validation_cases GROUP BY status, outcome",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stats = ValidationStats::default();
    for (status, outcome, count) in rows {
        let count = count.max(0) as u64;
        match status.as_str() {
            "pending" => stats.pending += count,
            "reviewed" => {
                stats.reviewed += count;
                match outcome.as_deref() {
                    Some("confirmed") => stats.confirmed += count,
                    Some("adjusted") => stats.adjusted += count,
                    Some("dismissed") => stats.dismissed += count,
                    _ => {}
                }
            }
            _ => {}
        }
    }
    Ok(stats)
}

struct RawCaseRow {
    id: String,
    assessment_id: String,
    priority_level: String,
    status: String,
    outcome: Option<String>,
    adjusted_level: Option<String>,
    reviewer: Option<String>,
    notes: Option<String>,
    opened_at: String,
    reviewed_at: Option<String>,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCaseRow> {
    Ok(RawCaseRow {
        id: row.get(0)?,
        assessment_id: row.get(1)?,
        priority_level: row.get(2)?,
        status: row.get(3)?,
        outcome: row.get(4)?,
        adjusted_level: row.get(5)?,
        reviewer: row.get(6)?,
        notes: row.get(7)?,
        opened_at: row.get(8)?,
        reviewed_at: row.get(9)?,
    })
}

fn invalid(field: &str, value: &str) -> DatabaseError {
    DatabaseError::InvalidStored {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn into_case(raw: RawCaseRow) -> Result<ValidationCase, DatabaseError> {
    let outcome = match raw.outcome.as_deref() {
        None => None,
        Some("confirmed") => Some(ReviewOutcome::Confirmed),
        Some("dismissed") => Some(ReviewOutcome::Dismissed),
        Some("adjusted") => {
            let level = raw
                .adjusted_level
                .as_deref()
                .and_then(PriorityLevel::parse)
                .ok_or_else(|| {
                    invalid("adjusted_level", raw.adjusted_level.as_deref().unwrap_or(""))
                })?;
            Some(ReviewOutcome::Adjusted(level))
        }
        Some(other) => return Err(invalid("outcome", other)),
    };

    Ok(ValidationCase {
        id: Uuid::parse_str(&raw.id).map_err(|_| invalid("id", &raw.id))?,
        assessment_id: Uuid::parse_str(&raw.assessment_id)
            .map_err(|_| invalid("assessment_id", &raw.assessment_id))?,
        priority_level: PriorityLevel::parse(&raw.priority_level)
            .ok_or_else(|| invalid("priority_level", &raw.priority_level))?,
        status: CaseStatus::parse(&raw.status).ok_or_else(|| invalid("status", &raw.status))?,
        outcome,
        reviewer: raw.reviewer,
        notes: raw.notes,
        opened_at: DateTime::parse_from_rfc3339(&raw.opened_at)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_default(),
        reviewed_at: raw.reviewed_at.as_deref().map(|t| {
            DateTime::parse_from_rfc3339(t)
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_default()
        }),
    })
}
