//! `POST /api/symptoms`: a patient logs a symptom record.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{SeverityLabel, SymptomIndicators, SymptomRecord};

const MAX_NOTES_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomSubmission {
    pub patient_id: String,
    #[serde(flatten)]
    pub indicators: SymptomIndicators,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomRecorded {
    pub id: Uuid,
    pub severity: SeverityLabel,
    pub recorded_at: DateTime<Utc>,
}

pub async fn record(
    State(ctx): State<ApiContext>,
    payload: Result<Json<SymptomSubmission>, JsonRejection>,
) -> Result<Json<SymptomRecorded>, ApiError> {
    let Json(submission) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let patient_id = submission.patient_id.trim();
    if patient_id.is_empty() {
        return Err(ApiError::BadRequest("patientId is required".into()));
    }
    let notes = submission
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    if notes.as_ref().is_some_and(|n| n.chars().count() > MAX_NOTES_CHARS) {
        return Err(ApiError::BadRequest(format!(
            "notes must be at most {MAX_NOTES_CHARS} characters"
        )));
    }

    if !ctx.store.patient_exists(patient_id)? {
        return Err(ApiError::NotFound {
            message: "Patient not found".into(),
            details: Some(patient_id.to_string()),
        });
    }

    let record = SymptomRecord::new(patient_id, submission.indicators, notes);
    ctx.store.append_symptom_record(&record)?;

    tracing::info!(
        patient_id,
        record_id = %record.id,
        severity = %record.severity,
        "Symptom record stored"
    );

    Ok(Json(SymptomRecorded {
        id: record.id,
        severity: record.severity,
        recorded_at: record.recorded_at,
    }))
}
