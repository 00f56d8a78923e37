//! Asthma-risk prediction pipeline.
//!
//! Record assembly → predictor invocation → output interpretation →
//! (positive findings only) notification fan-out. `orchestrator` sequences
//! the stages; every other module is usable on its own.

pub mod assembler;
pub mod defaults;
pub mod interpreter;
pub mod invoker;
pub mod notify;
pub mod orchestrator;

pub use assembler::*;
pub use interpreter::*;
pub use invoker::*;
pub use notify::*;
pub use orchestrator::*;

use thiserror::Error;

use crate::db::DatabaseError;

/// Fatal pipeline failures. Notification problems are never represented
/// here; see `notify::NotificationError`.
#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("No symptom data recorded for patient {0}")]
    NoSymptomData(String),

    #[error("Predictor did not respond within {timeout_ms}ms")]
    PredictionTimeout { timeout_ms: u128 },

    #[error("Predictor process failed ({status}): {diagnostic}")]
    PredictionProcessFailed { status: String, diagnostic: String },

    #[error("Malformed predictor output ({reason}): {raw:?}")]
    MalformedPredictionOutput { raw: String, reason: String },

    #[error("Feature encoding error: {0}")]
    Encoding(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl PredictionError {
    /// Short machine-readable kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PatientNotFound(_) => "patient_not_found",
            Self::NoSymptomData(_) => "no_symptom_data",
            Self::PredictionTimeout { .. } => "prediction_timeout",
            Self::PredictionProcessFailed { .. } => "prediction_process_failed",
            Self::MalformedPredictionOutput { .. } => "malformed_prediction_output",
            Self::Encoding(_) => "encoding",
            Self::Database(_) => "database",
        }
    }
}
