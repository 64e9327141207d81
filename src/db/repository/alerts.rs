use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::safety::{FlagSeverity, SafetyFlag};

/// A stored safety flag, tied to the assessment it fired on.
#[derive(Debug, Clone)]
pub struct SafetyAlertRecord {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub rule_id: String,
    pub severity: FlagSeverity,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Persist every flag fired for one assessment.
pub fn insert_safety_alerts(
    conn: &Connection,
    assessment_id: &Uuid,
    flags: &[SafetyFlag],
) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO safety_alerts (id, assessment_id, rule_id, severity, message, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    let now = Utc::now().to_rfc3339();
    for flag in flags {
        stmt.execute(params![
            Uuid::new_v4().to_string(),
            assessment_id.to_string(),
            flag.rule_id,
            flag.severity.as_str(),
            flag.message,
            now,
        ])?;
    }
    Ok(())
}

pub fn list_alerts_for_assessment(
    conn: &Connection,
    assessment_id: &Uuid,
) -> Result<Vec<SafetyAlertRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, assessment_id, rule_id, severity, message, created_at
         FROM safety_alerts WHERE assessment_id = ?1 ORDER BY rule_id ASC",
    )?;
    let rows = stmt
        .query_map(params![assessment_id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut alerts = Vec::new();
    for (id, assessment_id, rule_id, severity, message, created_at) in rows {
        alerts.push(SafetyAlertRecord {
            id: Uuid::parse_str(&id).map_err(|_| DatabaseError::InvalidStored {
                field: "safety_alerts.id".to_string(),
                value: id.clone(),
            })?,
            assessment_id: Uuid::parse_str(&assessment_id).map_err(|_| {
                DatabaseError::InvalidStored {
                    field: "safety_alerts.assessment_id".to_string(),
                    value: assessment_id.clone(),
                }
            })?,
            rule_id,
            severity: FlagSeverity::parse(&severity).ok_or_else(|| {
                DatabaseError::InvalidStored {
                    field: "safety_alerts.severity".to_string(),
                    value: severity.clone(),
                }
            })?,
            message,
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_default(),
        });
    }
    Ok(alerts)
}

pub fn count_safety_alerts(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM safety_alerts", [], |row| row.get(0))?;
    Ok(count)
}
