//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DatabaseError;
use crate::prediction::PredictionError;

/// Error response body: `{ "error": ..., "details": ... }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        details: Option<String>,
    },
    #[error("Invalid request: {0}")]
    BadRequest(String),
    /// Server-side failure whose details are safe and useful to show.
    #[error("{message}")]
    Failed {
        message: String,
        details: Option<String>,
    },
    /// Server-side failure whose details stay in the logs.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::NotFound { message, details } => (StatusCode::NOT_FOUND, message, details),
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                "Invalid request".to_string(),
                Some(detail),
            ),
            ApiError::Failed { message, details } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, details)
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        (status, Json(ErrorBody { error, details })).into_response()
    }
}

impl From<PredictionError> for ApiError {
    fn from(err: PredictionError) -> Self {
        match err {
            PredictionError::PatientNotFound(id) => ApiError::NotFound {
                message: "Patient not found".into(),
                details: Some(id),
            },
            PredictionError::NoSymptomData(id) => ApiError::NotFound {
                message: "No symptom data found for patient".into(),
                details: Some(id),
            },
            PredictionError::PredictionTimeout { timeout_ms } => ApiError::Failed {
                message: "Prediction timed out".into(),
                details: Some(format!("no result within {timeout_ms}ms")),
            },
            PredictionError::PredictionProcessFailed { status, diagnostic } => ApiError::Failed {
                message: "Prediction process failed".into(),
                details: Some(format!("{status}: {diagnostic}")),
            },
            PredictionError::MalformedPredictionOutput { raw, reason } => ApiError::Failed {
                message: "Invalid prediction output".into(),
                details: Some(format!("{reason}: {raw:?}")),
            },
            PredictionError::Encoding(e) => ApiError::Internal(e),
            PredictionError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
