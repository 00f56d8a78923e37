//! Result Interpreter: raw predictor stdout → `PredictionOutcome`.
//!
//! Expected shape is one line `label,probability`. Anything else is
//! rejected; nothing is coerced.

use std::str::FromStr;

use crate::models::{PredictionLabel, PredictionOutcome};

use super::PredictionError;

pub fn interpret(raw: &str) -> Result<PredictionOutcome, PredictionError> {
    let malformed = |reason: String| PredictionError::MalformedPredictionOutput {
        raw: raw.to_string(),
        reason,
    };

    let line = raw.trim();
    if line.is_empty() {
        return Err(malformed("empty output".into()));
    }
    if line.lines().count() != 1 {
        return Err(malformed("expected a single line".into()));
    }

    let fields: Vec<&str> = line.split(',').collect();
    let [label, probability] = fields.as_slice() else {
        return Err(malformed(format!(
            "expected 2 comma-separated fields, got {}",
            fields.len()
        )));
    };

    let label = label.trim();
    let label = PredictionLabel::from_str(label)
        .map_err(|_| malformed(format!("unrecognised label {label:?}")))?;

    let probability: f64 = probability
        .trim()
        .parse()
        .map_err(|_| malformed("probability is not a number".into()))?;
    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        return Err(malformed(format!(
            "probability {probability} outside [0, 1]"
        )));
    }

    Ok(PredictionOutcome { label, probability })
}
