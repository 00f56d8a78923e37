//! `RecordStore`: the persistence boundary seen by the prediction pipeline.
//!
//! The pipeline and the API need five reads and one append. `SqliteStore` holds a
//! single connection behind a mutex; every call is short and never held
//! across an `.await`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use super::{repository, DatabaseError};
use crate::models::{Caretaker, Doctor, Patient, SymptomRecord};

pub trait RecordStore: Send + Sync {
    fn find_patient(&self, patient_id: &str) -> Result<Option<Patient>, DatabaseError>;

    fn patient_exists(&self, patient_id: &str) -> Result<bool, DatabaseError>;

    /// Latest symptom record for the patient (greatest timestamp, later insert on ties).
    fn latest_symptom_record(
        &self,
        patient_id: &str,
    ) -> Result<Option<SymptomRecord>, DatabaseError>;

    fn find_doctor(&self, doctor_id: &str) -> Result<Option<Doctor>, DatabaseError>;

    fn caretakers_for_patient(&self, patient_id: &str) -> Result<Vec<Caretaker>, DatabaseError>;

    fn append_symptom_record(&self, record: &SymptomRecord) -> Result<(), DatabaseError>;
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(super::open_database(path)?))
    }

    pub fn in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(super::open_memory_database()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Direct connection access for seeding and maintenance.
    pub fn connection(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }
}

impl RecordStore for SqliteStore {
    fn find_patient(&self, patient_id: &str) -> Result<Option<Patient>, DatabaseError> {
        repository::get_patient(&*self.connection()?, patient_id)
    }

    fn patient_exists(&self, patient_id: &str) -> Result<bool, DatabaseError> {
        repository::patient_exists(&*self.connection()?, patient_id)
    }

    fn latest_symptom_record(
        &self,
        patient_id: &str,
    ) -> Result<Option<SymptomRecord>, DatabaseError> {
        repository::get_latest_symptom_record(&*self.connection()?, patient_id)
    }

    fn find_doctor(&self, doctor_id: &str) -> Result<Option<Doctor>, DatabaseError> {
        repository::get_doctor(&*self.connection()?, doctor_id)
    }

    fn caretakers_for_patient(&self, patient_id: &str) -> Result<Vec<Caretaker>, DatabaseError> {
        repository::get_caretakers_for_patient(&*self.connection()?, patient_id)
    }

    fn append_symptom_record(&self, record: &SymptomRecord) -> Result<(), DatabaseError> {
        repository::insert_symptom_record(&*self.connection()?, record)
    }
}
