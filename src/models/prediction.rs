use serde::{Deserialize, Serialize};

use super::enums::PredictionLabel;

/// Fixed-shape predictor input. Field names follow the predictor's column
/// names; every field is always populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PredictionFeatureVector {
    pub age: u32,
    pub gender: u8,
    pub ethnicity: i64,
    pub education_level: i64,
    #[serde(rename = "BMI")]
    pub bmi: f64,
    pub smoking: u8,
    pub physical_activity: f64,
    pub diet_quality: f64,
    pub sleep_quality: f64,
    pub pollution_exposure: f64,
    pub pollen_exposure: f64,
    pub dust_exposure: f64,
    pub pet_allergy: u8,
    pub family_history_asthma: u8,
    pub history_of_allergies: u8,
    pub eczema: u8,
    pub hay_fever: u8,
    pub gastroesophageal_reflux: u8,
    #[serde(rename = "LungFunctionFEV1")]
    pub lung_function_fev1: f64,
    #[serde(rename = "LungFunctionFVC")]
    pub lung_function_fvc: f64,
    pub wheezing: u8,
    pub shortness_of_breath: u8,
    pub chest_tightness: u8,
    pub coughing: u8,
    pub nighttime_symptoms: u8,
    pub exercise_induced: u8,
}

/// Validated predictor result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub label: PredictionLabel,
    /// Finite, within [0, 1].
    pub probability: f64,
}

impl PredictionOutcome {
    pub fn is_positive(&self) -> bool {
        self.label.is_positive()
    }
}
