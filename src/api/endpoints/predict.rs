//! `POST /api/predict-asthma`: run the prediction pipeline for one patient.
//!
//! Notification outcomes are logged by the pipeline and never change the
//! response; only assembly, invocation and interpretation failures do.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::PredictionLabel;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    pub patient_id: String,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: PredictionLabel,
    pub probability: f64,
}

pub async fn predict_asthma(
    State(ctx): State<ApiContext>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let patient_id = request.patient_id.trim();
    if patient_id.is_empty() {
        return Err(ApiError::BadRequest("patientId is required".into()));
    }

    let run = ctx.pipeline.run(patient_id).await?;

    if let Some(report) = &run.notifications {
        tracing::debug!(
            patient_id,
            attempted = report.attempted(),
            sent = report.sent_count(),
            "Prediction response ready"
        );
    }

    Ok(Json(PredictResponse {
        prediction: run.outcome.label,
        probability: run.outcome.probability,
    }))
}
