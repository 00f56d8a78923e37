//! Record Assembler: patient + latest symptom record → feature vector.

use crate::db::RecordStore;
use crate::models::{Patient, PredictionFeatureVector, SymptomRecord};

use super::defaults::{flag, FEATURE_DEFAULTS};
use super::PredictionError;

/// Everything later stages need from the store, read once.
#[derive(Debug, Clone)]
pub struct AssembledRecord {
    pub patient: Patient,
    pub symptoms: SymptomRecord,
    pub features: PredictionFeatureVector,
}

/// Read the patient and their latest symptom record and merge them.
///
/// A patient without any symptom record fails with `NoSymptomData`: the
/// predictor is never run on symptom defaults alone.
pub fn assemble(store: &dyn RecordStore, patient_id: &str) -> Result<AssembledRecord, PredictionError> {
    let patient = store
        .find_patient(patient_id)?
        .ok_or_else(|| PredictionError::PatientNotFound(patient_id.to_string()))?;

    let symptoms = store
        .latest_symptom_record(patient_id)?
        .ok_or_else(|| PredictionError::NoSymptomData(patient_id.to_string()))?;

    let features = build_feature_vector(&patient, &symptoms);
    tracing::debug!(
        patient_id,
        symptom_record = %symptoms.id,
        recorded_at = %symptoms.recorded_at,
        "Assembled prediction features"
    );

    Ok(AssembledRecord {
        patient,
        symptoms,
        features,
    })
}

/// Pure merge of a profile and one symptom record.
pub fn build_feature_vector(patient: &Patient, symptoms: &SymptomRecord) -> PredictionFeatureVector {
    let d = &FEATURE_DEFAULTS;
    let s = &symptoms.indicators;

    PredictionFeatureVector {
        age: patient.age.unwrap_or(d.age),
        gender: patient.gender.encode(),
        ethnicity: patient.ethnicity.unwrap_or(d.ethnicity),
        education_level: patient.education_level.unwrap_or(d.education_level),
        bmi: patient.bmi.unwrap_or(d.bmi),
        smoking: flag(patient.smoking, d.smoking),
        physical_activity: patient.physical_activity.unwrap_or(d.physical_activity),
        diet_quality: patient.diet_quality.unwrap_or(d.diet_quality),
        sleep_quality: patient.sleep_quality.unwrap_or(d.sleep_quality),
        pollution_exposure: patient.pollution_exposure.unwrap_or(d.pollution_exposure),
        pollen_exposure: patient.pollen_exposure.unwrap_or(d.pollen_exposure),
        dust_exposure: patient.dust_exposure.unwrap_or(d.dust_exposure),
        pet_allergy: flag(patient.pet_allergy, d.pet_allergy),
        family_history_asthma: flag(patient.family_history_asthma, d.family_history_asthma),
        history_of_allergies: flag(patient.history_of_allergies, d.history_of_allergies),
        eczema: flag(patient.eczema, d.eczema),
        hay_fever: flag(patient.hay_fever, d.hay_fever),
        gastroesophageal_reflux: flag(patient.gastroesophageal_reflux, d.gastroesophageal_reflux),
        lung_function_fev1: patient.lung_function_fev1.unwrap_or(d.lung_function_fev1),
        lung_function_fvc: patient.lung_function_fvc.unwrap_or(d.lung_function_fvc),
        wheezing: s.wheezing,
        shortness_of_breath: s.shortness_of_breath,
        chest_tightness: s.chest_tightness,
        coughing: s.coughing,
        nighttime_symptoms: s.nighttime_symptoms,
        exercise_induced: exercise_induced(patient, symptoms),
    }
}

/// The patient flag wins whenever it is recorded; the symptom record's
/// exercise indicator is only consulted when the profile is silent.
fn exercise_induced(patient: &Patient, symptoms: &SymptomRecord) -> u8 {
    match patient.exercise_induced {
        Some(flag) => u8::from(flag),
        None => u8::from(symptoms.indicators.exercise > 0),
    }
}
