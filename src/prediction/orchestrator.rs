//! Pipeline Orchestrator.
//!
//! Idle → AssemblingRecord → Invoking → Interpreting → [Notifying] → Done.
//! Any failure before interpretation completes moves to Failed and is
//! returned to the caller. Notifying always ends in Done; failed deliveries
//! only produce a warning.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::db::RecordStore;
use crate::models::{FanOutReport, PredictionOutcome};

use super::assembler::assemble;
use super::interpreter::interpret;
use super::invoker::Predictor;
use super::notify::{Mailer, Notifier};
use super::PredictionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    AssemblingRecord,
    Invoking,
    Interpreting,
    Notifying,
    Done,
    Failed,
}

/// Logs stage transitions for one run.
struct StageTracker<'a> {
    patient_id: &'a str,
    stage: PipelineStage,
}

impl<'a> StageTracker<'a> {
    fn new(patient_id: &'a str) -> Self {
        Self {
            patient_id,
            stage: PipelineStage::Idle,
        }
    }

    fn enter(&mut self, next: PipelineStage) {
        tracing::debug!(
            patient_id = self.patient_id,
            from = ?self.stage,
            to = ?next,
            "Prediction stage"
        );
        self.stage = next;
    }

    fn fail(&mut self, err: PredictionError) -> PredictionError {
        tracing::warn!(
            patient_id = self.patient_id,
            stage = ?self.stage,
            kind = err.kind(),
            error = %err,
            "Prediction failed"
        );
        self.stage = PipelineStage::Failed;
        err
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub outcome: PredictionOutcome,
    /// The symptom record the features were built from.
    pub symptom_record_id: Uuid,
    /// Present only when the finding was positive.
    pub notifications: Option<FanOutReport>,
}

pub struct PredictionPipeline {
    store: Arc<dyn RecordStore>,
    predictor: Arc<dyn Predictor>,
    notifier: Notifier,
}

impl PredictionPipeline {
    pub fn new(
        store: Arc<dyn RecordStore>,
        predictor: Arc<dyn Predictor>,
        mailer: Arc<dyn Mailer>,
        notification_timeout: Duration,
    ) -> Self {
        Self {
            notifier: Notifier::new(store.clone(), mailer, notification_timeout),
            store,
            predictor,
        }
    }

    pub async fn run(&self, patient_id: &str) -> Result<PipelineRun, PredictionError> {
        let mut stage = StageTracker::new(patient_id);

        stage.enter(PipelineStage::AssemblingRecord);
        let assembled = assemble(self.store.as_ref(), patient_id).map_err(|e| stage.fail(e))?;

        stage.enter(PipelineStage::Invoking);
        let raw = self
            .predictor
            .predict(&assembled.features)
            .await
            .map_err(|e| stage.fail(e))?;

        stage.enter(PipelineStage::Interpreting);
        let outcome = interpret(&raw).map_err(|e| stage.fail(e))?;

        let notifications = if outcome.is_positive() {
            stage.enter(PipelineStage::Notifying);
            let report = self.notifier.notify(&assembled.patient, &outcome).await;
            if report.has_failures() {
                tracing::warn!(
                    patient_id,
                    attempted = report.attempted(),
                    sent = report.sent_count(),
                    "Some notifications failed"
                );
            }
            Some(report)
        } else {
            None
        };

        stage.enter(PipelineStage::Done);
        tracing::info!(
            patient_id,
            label = %outcome.label,
            probability = outcome.probability,
            symptom_record = %assembled.symptoms.id,
            notified = notifications.as_ref().map_or(0, FanOutReport::sent_count),
            "Prediction complete"
        );

        Ok(PipelineRun {
            outcome,
            symptom_record_id: assembled.symptoms.id,
            notifications,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::db::{insert_caretaker, insert_doctor, insert_patient, insert_symptom_record, SqliteStore};
    use crate::models::*;
    use crate::prediction::{MockPredictor, RecordingMailer};

    struct Harness {
        pipeline: PredictionPipeline,
        predictor: Arc<MockPredictor>,
        mailer: Arc<RecordingMailer>,
    }

    fn harness(store: SqliteStore, predictor: MockPredictor, mailer: RecordingMailer) -> Harness {
        let predictor = Arc::new(predictor);
        let mailer = Arc::new(mailer);
        Harness {
            pipeline: PredictionPipeline::new(
                Arc::new(store),
                predictor.clone(),
                mailer.clone(),
                Duration::from_secs(5),
            ),
            predictor,
            mailer,
        }
    }

    /// P1 (30, Male, doctor D1) with an older quiet record and a newer
    /// wheezing + coughing record.
    fn seeded_store(caretakers: &[&str]) -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        {
            let conn = store.connection().unwrap();
            insert_patient(
                &conn,
                &Patient {
                    patient_id: "P1".into(),
                    name: "Pat One".into(),
                    age: Some(30),
                    gender: Gender::Male,
                    doctor_id: Some("D1".into()),
                    ..Default::default()
                },
            )
            .unwrap();
            insert_doctor(
                &conn,
                &Doctor {
                    doctor_id: "D1".into(),
                    name: "Dr. One".into(),
                    email: "d1@clinic.test".into(),
                },
            )
            .unwrap();
            for email in caretakers {
                insert_caretaker(
                    &conn,
                    &Caretaker {
                        id: Uuid::new_v4(),
                        name: "Carer".into(),
                        email: (*email).into(),
                        patient_ids: vec!["P1".into()],
                    },
                )
                .unwrap();
            }

            let t1 = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
            let t2 = t1 + ChronoDuration::days(1);
            insert_symptom_record(
                &conn,
                &SymptomRecord::at("P1", SymptomIndicators::default(), None, t1),
            )
            .unwrap();
            insert_symptom_record(
                &conn,
                &SymptomRecord::at(
                    "P1",
                    SymptomIndicators {
                        wheezing: 1,
                        coughing: 1,
                        ..Default::default()
                    },
                    None,
                    t2,
                ),
            )
            .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn run_uses_latest_symptom_record() {
        let store = seeded_store(&[]);
        let latest = store.latest_symptom_record("P1").unwrap().unwrap();
        assert_eq!(latest.indicators.wheezing, 1);
        let h = harness(store, MockPredictor::new("No Asthma,0.2"), RecordingMailer::new());

        let run = h.pipeline.run("P1").await.unwrap();
        assert_eq!(run.symptom_record_id, latest.id);
    }

    #[tokio::test]
    async fn positive_finding_notifies_assigned_doctor() {
        let h = harness(
            seeded_store(&[]),
            MockPredictor::new("Asthma,0.91\n"),
            RecordingMailer::new(),
        );

        let run = h.pipeline.run("P1").await.unwrap();
        assert_eq!(run.outcome.label, PredictionLabel::Asthma);
        assert!((run.outcome.probability - 0.91).abs() < f64::EPSILON);

        let attempts = h.mailer.attempts();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].recipient, "d1@clinic.test");
        assert_eq!(run.notifications.unwrap().sent_count(), 1);
    }

    #[tokio::test]
    async fn negative_finding_sends_nothing() {
        let h = harness(
            seeded_store(&["a@home.test", "b@home.test"]),
            MockPredictor::new("No Asthma,0.12"),
            RecordingMailer::new(),
        );

        let run = h.pipeline.run("P1").await.unwrap();
        assert_eq!(run.outcome.label, PredictionLabel::NoAsthma);
        assert!(run.notifications.is_none());
        assert!(h.mailer.attempts().is_empty());
    }

    #[tokio::test]
    async fn partial_notification_failure_keeps_outcome() {
        let h = harness(
            seeded_store(&["a@home.test", "b@home.test"]),
            MockPredictor::new("Asthma,0.87"),
            RecordingMailer::new().failing_for("a@home.test"),
        );

        let run = h.pipeline.run("P1").await.unwrap();
        assert_eq!(run.outcome.label, PredictionLabel::Asthma);
        let report = run.notifications.unwrap();
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.sent_count(), 2);
    }

    #[tokio::test]
    async fn no_symptom_data_skips_predictor() {
        let store = SqliteStore::in_memory().unwrap();
        insert_patient(
            &store.connection().unwrap(),
            &Patient {
                patient_id: "P9".into(),
                name: "Quiet".into(),
                ..Default::default()
            },
        )
        .unwrap();
        let h = harness(store, MockPredictor::new("Asthma,0.9"), RecordingMailer::new());

        let err = h.pipeline.run("P9").await.unwrap_err();
        assert!(matches!(err, PredictionError::NoSymptomData(_)));
        assert_eq!(h.predictor.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_patient_skips_predictor() {
        let h = harness(
            SqliteStore::in_memory().unwrap(),
            MockPredictor::new("Asthma,0.9"),
            RecordingMailer::new(),
        );

        let err = h.pipeline.run("nobody").await.unwrap_err();
        assert!(matches!(err, PredictionError::PatientNotFound(_)));
        assert_eq!(h.predictor.calls(), 0);
    }

    #[tokio::test]
    async fn malformed_output_sends_nothing() {
        for raw in ["Asthma,NaN", "Asthma,1.5", "Asthma,"] {
            let h = harness(seeded_store(&[]), MockPredictor::new(raw), RecordingMailer::new());
            let err = h.pipeline.run("P1").await.unwrap_err();
            assert!(
                matches!(err, PredictionError::MalformedPredictionOutput { .. }),
                "{raw} gave {err:?}"
            );
            assert!(h.mailer.attempts().is_empty());
        }
    }

    #[tokio::test]
    async fn predictor_failures_are_fatal() {
        let h = harness(seeded_store(&[]), MockPredictor::timing_out(), RecordingMailer::new());
        assert!(matches!(
            h.pipeline.run("P1").await.unwrap_err(),
            PredictionError::PredictionTimeout { .. }
        ));

        let h = harness(
            seeded_store(&[]),
            MockPredictor::failing("Traceback: model.pkl missing"),
            RecordingMailer::new(),
        );
        match h.pipeline.run("P1").await.unwrap_err() {
            PredictionError::PredictionProcessFailed { diagnostic, .. } => {
                assert!(diagnostic.contains("model.pkl"))
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(h.mailer.attempts().is_empty());
    }

    #[test]
    fn stage_serializes_snake_case() {
        let json = serde_json::to_string(&PipelineStage::AssemblingRecord).unwrap();
        assert_eq!(json, "\"assembling_record\"");
    }
}
