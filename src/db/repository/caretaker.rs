use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_caretaker(conn: &Connection, caretaker: &Caretaker) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO caretakers (id, name, email) VALUES (?1, ?2, ?3)",
        params![caretaker.id.to_string(), caretaker.name, caretaker.email],
    )?;
    for patient_id in &caretaker.patient_ids {
        conn.execute(
            "INSERT OR IGNORE INTO caretaker_patients (caretaker_id, patient_id) VALUES (?1, ?2)",
            params![caretaker.id.to_string(), patient_id],
        )?;
    }
    Ok(())
}

/// All caretakers whose patient list contains `patient_id`, each with their
/// full patient list.
pub fn get_caretakers_for_patient(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<Caretaker>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name, c.email FROM caretakers c
         JOIN caretaker_patients cp ON cp.caretaker_id = c.id
         WHERE cp.patient_id = ?1
         ORDER BY c.name, c.id",
    )?;
    let rows = stmt
        .query_map(params![patient_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut links = conn.prepare(
        "SELECT patient_id FROM caretaker_patients WHERE caretaker_id = ?1 ORDER BY patient_id",
    )?;

    let mut caretakers = Vec::with_capacity(rows.len());
    for (id, name, email) in rows {
        let patient_ids = links
            .query_map(params![id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let id = Uuid::parse_str(&id).map_err(|_| DatabaseError::InvalidValue {
            field: "caretakers.id".into(),
            value: id.clone(),
        })?;
        caretakers.push(Caretaker {
            id,
            name,
            email,
            patient_ids,
        });
    }
    Ok(caretakers)
}
