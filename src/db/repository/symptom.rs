use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_symptom_record(conn: &Connection, record: &SymptomRecord) -> Result<(), DatabaseError> {
    let i = &record.indicators;
    conn.execute(
        "INSERT INTO symptom_records (id, patient_id, wheezing, shortness_of_breath,
         chest_tightness, coughing, nighttime_symptoms, exercise, notes, severity, recorded_at_ms)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            record.id.to_string(),
            record.patient_id,
            i.wheezing,
            i.shortness_of_breath,
            i.chest_tightness,
            i.coughing,
            i.nighttime_symptoms,
            i.exercise,
            record.notes,
            record.severity.as_str(),
            record.recorded_at.timestamp_millis(),
        ],
    )?;
    Ok(())
}

/// Most recent record for a patient: greatest timestamp, later insert on ties.
pub fn get_latest_symptom_record(
    conn: &Connection,
    patient_id: &str,
) -> Result<Option<SymptomRecord>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, patient_id, wheezing, shortness_of_breath, chest_tightness, coughing,
             nighttime_symptoms, exercise, notes, severity, recorded_at_ms
             FROM symptom_records WHERE patient_id = ?1
             ORDER BY recorded_at_ms DESC, seq DESC LIMIT 1",
            params![patient_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    SymptomIndicators {
                        wheezing: row.get(2)?,
                        shortness_of_breath: row.get(3)?,
                        chest_tightness: row.get(4)?,
                        coughing: row.get(5)?,
                        nighttime_symptoms: row.get(6)?,
                        exercise: row.get(7)?,
                    },
                    row.get::<_, Option<String>>(8)?,
                    row.get::<_, String>(9)?,
                    row.get::<_, i64>(10)?,
                ))
            },
        )
        .optional()?;

    let Some((id, patient_id, indicators, notes, severity, recorded_at_ms)) = row else {
        return Ok(None);
    };

    let id = Uuid::parse_str(&id).map_err(|_| DatabaseError::InvalidValue {
        field: "symptom_records.id".into(),
        value: id.clone(),
    })?;
    let recorded_at = DateTime::<Utc>::from_timestamp_millis(recorded_at_ms).ok_or_else(|| {
        DatabaseError::InvalidValue {
            field: "symptom_records.recorded_at_ms".into(),
            value: recorded_at_ms.to_string(),
        }
    })?;

    Ok(Some(SymptomRecord {
        id,
        patient_id,
        indicators,
        notes,
        severity: SeverityLabel::from_str(&severity)?,
        recorded_at,
    }))
}
