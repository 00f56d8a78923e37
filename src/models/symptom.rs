use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::SeverityLabel;

/// The six indicators a patient reports on each submission.
/// 0 means absent; any positive value counts as present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomIndicators {
    #[serde(default)]
    pub wheezing: u8,
    #[serde(default)]
    pub shortness_of_breath: u8,
    #[serde(default)]
    pub chest_tightness: u8,
    #[serde(default)]
    pub coughing: u8,
    #[serde(default)]
    pub nighttime_symptoms: u8,
    #[serde(default)]
    pub exercise: u8,
}

impl SymptomIndicators {
    pub fn positive_count(&self) -> usize {
        [
            self.wheezing,
            self.shortness_of_breath,
            self.chest_tightness,
            self.coughing,
            self.nighttime_symptoms,
            self.exercise,
        ]
        .iter()
        .filter(|v| **v > 0)
        .count()
    }

    pub fn severity(&self) -> SeverityLabel {
        SeverityLabel::from_positive_count(self.positive_count())
    }
}

/// Immutable symptom snapshot owned by one patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomRecord {
    pub id: Uuid,
    pub patient_id: String,
    #[serde(flatten)]
    pub indicators: SymptomIndicators,
    pub notes: Option<String>,
    pub severity: SeverityLabel,
    pub recorded_at: DateTime<Utc>,
}

impl SymptomRecord {
    /// New record stamped now, severity derived from the indicators.
    pub fn new(patient_id: &str, indicators: SymptomIndicators, notes: Option<String>) -> Self {
        Self::at(patient_id, indicators, notes, Utc::now())
    }

    pub fn at(
        patient_id: &str,
        indicators: SymptomIndicators,
        notes: Option<String>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id: patient_id.to_string(),
            severity: indicators.severity(),
            indicators,
            notes,
            recorded_at,
        }
    }
}
