//! Prediction Invoker: hands the feature vector to the predictor.
//!
//! `Predictor` is the capability boundary. `ProcessPredictor` runs an
//! external script with the vector as a single JSON argument, capturing
//! stdout and stderr separately under a hard timeout.

use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::{Child, Command};

use crate::config::AppConfig;
use crate::models::PredictionFeatureVector;

use super::PredictionError;

#[async_trait]
pub trait Predictor: Send + Sync {
    /// Run the predictor and return its raw primary output.
    async fn predict(&self, features: &PredictionFeatureVector) -> Result<String, PredictionError>;
}

/// Out-of-process predictor: `program [args...] <features-json>`.
pub struct ProcessPredictor {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ProcessPredictor {
    pub fn new(program: &str, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            args,
            timeout,
        }
    }

    /// `python3 predict_asthma.py` style invocation from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.predictor_program,
            vec![config.predictor_script.to_string_lossy().into_owned()],
            config.predictor_timeout,
        )
    }

    fn spawn(&self, payload: &str) -> std::io::Result<Child> {
        Command::new(&self.program)
            .args(&self.args)
            .arg(payload)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
    }

    /// Spawn, retrying once when the process could not be started at all.
    /// Failures after the process has started are never retried.
    fn spawn_with_retry(&self, payload: &str) -> Result<Child, PredictionError> {
        match self.spawn(payload) {
            Ok(child) => Ok(child),
            Err(first) => {
                tracing::warn!(
                    program = %self.program,
                    error = %first,
                    "Predictor failed to start, retrying once"
                );
                self.spawn(payload)
                    .map_err(|e| PredictionError::PredictionProcessFailed {
                        status: "not started".into(),
                        diagnostic: e.to_string(),
                    })
            }
        }
    }
}

#[async_trait]
impl Predictor for ProcessPredictor {
    async fn predict(&self, features: &PredictionFeatureVector) -> Result<String, PredictionError> {
        let payload =
            serde_json::to_string(features).map_err(|e| PredictionError::Encoding(e.to_string()))?;

        let started = Instant::now();
        let child = self.spawn_with_retry(&payload)?;

        // On timeout the wait future is dropped, which drops the child and
        // kills it (kill_on_drop).
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(PredictionError::PredictionProcessFailed {
                    status: "wait failed".into(),
                    diagnostic: e.to_string(),
                })
            }
            Err(_) => {
                tracing::warn!(
                    program = %self.program,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Predictor timed out, process killed"
                );
                return Err(PredictionError::PredictionTimeout {
                    timeout_ms: self.timeout.as_millis(),
                });
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            tracing::error!(
                program = %self.program,
                status = %output.status,
                elapsed_ms,
                diagnostic = %stderr,
                "Predictor exited abnormally"
            );
            let diagnostic = if stderr.is_empty() {
                "(no diagnostic output)".to_string()
            } else {
                stderr
            };
            return Err(PredictionError::PredictionProcessFailed {
                status: output.status.to_string(),
                diagnostic,
            });
        }

        if !stderr.is_empty() {
            tracing::warn!(
                program = %self.program,
                diagnostic = %stderr,
                "Predictor succeeded with diagnostic output"
            );
        }
        tracing::info!(program = %self.program, elapsed_ms, "Predictor finished");

        Ok(stdout)
    }
}

/// Mock predictor for testing: returns a configured output and counts calls.
pub struct MockPredictor {
    response: Result<String, MockFailure>,
    calls: AtomicUsize,
}

#[derive(Debug, Clone)]
enum MockFailure {
    Timeout,
    Process(String),
}

impl MockPredictor {
    pub fn new(output: &str) -> Self {
        Self {
            response: Ok(output.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn timing_out() -> Self {
        Self {
            response: Err(MockFailure::Timeout),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(diagnostic: &str) -> Self {
        Self {
            response: Err(MockFailure::Process(diagnostic.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Predictor for MockPredictor {
    async fn predict(&self, _features: &PredictionFeatureVector) -> Result<String, PredictionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(output) => Ok(output.clone()),
            Err(MockFailure::Timeout) => Err(PredictionError::PredictionTimeout { timeout_ms: 0 }),
            Err(MockFailure::Process(diagnostic)) => Err(PredictionError::PredictionProcessFailed {
                status: "exit status: 1".into(),
                diagnostic: diagnostic.clone(),
            }),
        }
    }
}
