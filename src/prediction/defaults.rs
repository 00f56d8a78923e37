//! Single source of truth for predictor feature defaults.
//!
//! The predictor must never see an undefined field. Whenever a profile value
//! is missing the assembler takes it from `FEATURE_DEFAULTS`.

/// Defaults applied when the patient profile leaves a field unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureDefaults {
    pub age: u32,
    pub bmi: f64,
    pub ethnicity: i64,
    pub education_level: i64,
    pub smoking: bool,
    pub physical_activity: f64,
    /// Neutral midpoint of the 0–10 scale.
    pub diet_quality: f64,
    /// Neutral midpoint of the 0–10 scale.
    pub sleep_quality: f64,
    pub pollution_exposure: f64,
    pub pollen_exposure: f64,
    pub dust_exposure: f64,
    pub eczema: bool,
    pub pet_allergy: bool,
    pub family_history_asthma: bool,
    pub history_of_allergies: bool,
    pub hay_fever: bool,
    pub gastroesophageal_reflux: bool,
    pub lung_function_fev1: f64,
    pub lung_function_fvc: f64,
}

pub const FEATURE_DEFAULTS: FeatureDefaults = FeatureDefaults {
    age: 0,
    bmi: 0.0,
    ethnicity: 0,
    education_level: 0,
    smoking: false,
    physical_activity: 0.0,
    diet_quality: 5.0,
    sleep_quality: 5.0,
    pollution_exposure: 0.0,
    pollen_exposure: 0.0,
    dust_exposure: 0.0,
    eczema: false,
    pet_allergy: false,
    family_history_asthma: false,
    history_of_allergies: false,
    hay_fever: false,
    gastroesophageal_reflux: false,
    lung_function_fev1: 0.0,
    lung_function_fvc: 0.0,
};

/// Boolean flag → predictor encoding.
pub fn flag(value: Option<bool>, default: bool) -> u8 {
    u8::from(value.unwrap_or(default))
}
