use serde::{Deserialize, Serialize};

use super::enums::Gender;

/// Patient profile as maintained by doctors and the patient.
///
/// Everything clinical is optional: profiles are filled in over time and
/// the prediction path resolves gaps through `prediction::defaults`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub patient_id: String,
    pub name: String,
    pub age: Option<u32>,
    pub gender: Gender,
    pub bmi: Option<f64>,
    pub ethnicity: Option<i64>,
    pub education_level: Option<i64>,
    pub smoking: Option<bool>,
    pub physical_activity: Option<f64>,
    pub diet_quality: Option<f64>,
    pub sleep_quality: Option<f64>,
    pub pollution_exposure: Option<f64>,
    pub pollen_exposure: Option<f64>,
    pub dust_exposure: Option<f64>,
    pub eczema: Option<bool>,
    pub pet_allergy: Option<bool>,
    pub family_history_asthma: Option<bool>,
    pub history_of_allergies: Option<bool>,
    pub hay_fever: Option<bool>,
    pub gastroesophageal_reflux: Option<bool>,
    pub exercise_induced: Option<bool>,
    pub lung_function_fev1: Option<f64>,
    pub lung_function_fvc: Option<f64>,
    /// Assigned doctor, by doctor identifier.
    pub doctor_id: Option<String>,
    /// Free text; only used for notifications when it is a valid email.
    pub emergency_contact: Option<String>,
}
