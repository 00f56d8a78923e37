use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

const PATIENT_COLUMNS: &str = "patient_id, name, age, gender, bmi, ethnicity, education_level,
     smoking, physical_activity, diet_quality, sleep_quality, pollution_exposure,
     pollen_exposure, dust_exposure, eczema, pet_allergy, family_history_asthma,
     history_of_allergies, hay_fever, gastroesophageal_reflux, exercise_induced,
     lung_function_fev1, lung_function_fvc, doctor_id, emergency_contact";

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO patients ({PATIENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                     ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)"
        ),
        params![
            patient.patient_id,
            patient.name,
            patient.age,
            match patient.gender {
                Gender::Unspecified => None,
                g => Some(g.as_str()),
            },
            patient.bmi,
            patient.ethnicity,
            patient.education_level,
            patient.smoking,
            patient.physical_activity,
            patient.diet_quality,
            patient.sleep_quality,
            patient.pollution_exposure,
            patient.pollen_exposure,
            patient.dust_exposure,
            patient.eczema,
            patient.pet_allergy,
            patient.family_history_asthma,
            patient.history_of_allergies,
            patient.hay_fever,
            patient.gastroesophageal_reflux,
            patient.exercise_induced,
            patient.lung_function_fev1,
            patient.lung_function_fvc,
            patient.doctor_id,
            patient.emergency_contact,
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, patient_id: &str) -> Result<Option<Patient>, DatabaseError> {
    let patient = conn
        .query_row(
            &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE patient_id = ?1"),
            params![patient_id],
            patient_from_row,
        )
        .optional()?;
    Ok(patient)
}

pub fn patient_exists(conn: &Connection, patient_id: &str) -> Result<bool, DatabaseError> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM patients WHERE patient_id = ?1)",
        params![patient_id],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(exists)
}

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    let gender: Option<String> = row.get(3)?;
    Ok(Patient {
        patient_id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        gender: Gender::parse(gender.as_deref()),
        bmi: row.get(4)?,
        ethnicity: row.get(5)?,
        education_level: row.get(6)?,
        smoking: row.get(7)?,
        physical_activity: row.get(8)?,
        diet_quality: row.get(9)?,
        sleep_quality: row.get(10)?,
        pollution_exposure: row.get(11)?,
        pollen_exposure: row.get(12)?,
        dust_exposure: row.get(13)?,
        eczema: row.get(14)?,
        pet_allergy: row.get(15)?,
        family_history_asthma: row.get(16)?,
        history_of_allergies: row.get(17)?,
        hay_fever: row.get(18)?,
        gastroesophageal_reflux: row.get(19)?,
        exercise_induced: row.get(20)?,
        lung_function_fev1: row.get(21)?,
        lung_function_fvc: row.get(22)?,
        doctor_id: row.get(23)?,
        emergency_contact: row.get(24)?,
    })
}
