use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (doctor_id, name, email) VALUES (?1, ?2, ?3)",
        params![doctor.doctor_id, doctor.name, doctor.email],
    )?;
    Ok(())
}

pub fn get_doctor(conn: &Connection, doctor_id: &str) -> Result<Option<Doctor>, DatabaseError> {
    let doctor = conn
        .query_row(
            "SELECT doctor_id, name, email FROM doctors WHERE doctor_id = ?1",
            params![doctor_id],
            |row| {
                Ok(Doctor {
                    doctor_id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(doctor)
}
