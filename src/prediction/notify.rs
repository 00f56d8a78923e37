//! Notification Fan-Out for positive findings.
//!
//! Targets are resolved from the patient's references (doctor, caretakers,
//! emergency contact), then every message is dispatched concurrently and
//! joined. Each dispatch has its own timeout; one failure never cancels the
//! others and never fails the pipeline.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::config::AppConfig;
use crate::db::RecordStore;
use crate::models::*;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub fn is_valid_email(candidate: &str) -> bool {
    EMAIL_PATTERN.is_match(candidate.trim())
}

/// Per-target delivery failure. Collected into the fan-out report, never
/// propagated as a pipeline error.
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Mail relay is not reachable at {0}")]
    RelayConnection(String),

    #[error("Mail relay returned error (status {status}): {body}")]
    RelayError { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Delivery timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u128 },
}

// ═══════════════════════════════════════════════════════════
// Transports
// ═══════════════════════════════════════════════════════════

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError>;
}

/// JSON-over-HTTP mail relay: POSTs `{from, recipient, subject, text, html}`.
pub struct HttpMailRelay {
    endpoint: String,
    token: Option<String>,
    from: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    from: &'a str,
    #[serde(flatten)]
    message: &'a EmailMessage,
}

impl HttpMailRelay {
    pub fn new(endpoint: &str, token: Option<String>, from: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
            from: from.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailRelay {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        let body = RelayRequest {
            from: &self.from,
            message,
        };
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                NotificationError::RelayConnection(self.endpoint.clone())
            } else {
                NotificationError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::RelayError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Development transport: logs the message instead of sending it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        tracing::info!(
            recipient = %message.recipient,
            subject = %message.subject,
            "Mail relay not configured; notification logged only"
        );
        Ok(())
    }
}

/// Build the transport described by configuration.
pub fn mailer_from_config(config: &AppConfig) -> Arc<dyn Mailer> {
    match &config.mail_relay_url {
        Some(url) => Arc::new(HttpMailRelay::new(
            url,
            config.mail_relay_token.clone(),
            &config.mail_sender,
        )),
        None => Arc::new(LogMailer),
    }
}

/// Mock mailer for testing: records every message, fails for chosen
/// recipients, optionally waits before answering.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    failing: HashSet<String>,
    delay: Option<Duration>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, recipient: &str) -> Self {
        self.failing.insert(recipient.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every message handed to the mailer, including failed ones.
    pub fn attempts(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(&message.recipient) {
            return Err(NotificationError::RelayConnection("mock relay".into()));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Fan-out
// ═══════════════════════════════════════════════════════════

pub struct Notifier {
    store: Arc<dyn RecordStore>,
    mailer: Arc<dyn Mailer>,
    timeout: Duration,
}

impl Notifier {
    pub fn new(store: Arc<dyn RecordStore>, mailer: Arc<dyn Mailer>, timeout: Duration) -> Self {
        Self {
            store,
            mailer,
            timeout,
        }
    }

    /// Resolve everyone who should hear about a positive finding.
    ///
    /// Missing references and lookup failures shrink the target list; they
    /// are logged, never returned. Addresses are deduplicated
    /// case-insensitively, first role wins.
    pub fn resolve_targets(&self, patient: &Patient) -> Vec<NotificationTarget> {
        let mut targets = Vec::new();
        let patient_id = patient.patient_id.as_str();

        if let Some(doctor_id) = patient.doctor_id.as_deref().filter(|id| !id.trim().is_empty()) {
            match self.store.find_doctor(doctor_id) {
                Ok(Some(doctor)) => targets.push(NotificationTarget {
                    role: RecipientRole::Doctor,
                    name: doctor.name,
                    email: doctor.email,
                }),
                Ok(None) => {
                    tracing::warn!(patient_id, doctor_id, "Assigned doctor not found");
                }
                Err(e) => {
                    tracing::warn!(patient_id, doctor_id, error = %e, "Doctor lookup failed");
                }
            }
        }

        match self.store.caretakers_for_patient(patient_id) {
            Ok(caretakers) => targets.extend(caretakers.into_iter().map(|c| NotificationTarget {
                role: RecipientRole::Caretaker,
                name: c.name,
                email: c.email,
            })),
            Err(e) => {
                tracing::warn!(patient_id, error = %e, "Caretaker lookup failed");
            }
        }

        if let Some(contact) = patient.emergency_contact.as_deref() {
            targets.push(NotificationTarget {
                role: RecipientRole::EmergencyContact,
                name: "Emergency contact".into(),
                email: contact.to_string(),
            });
        }

        let mut seen = HashSet::new();
        targets
            .into_iter()
            .filter_map(|mut t| {
                if !is_valid_email(&t.email) {
                    tracing::debug!(patient_id, role = %t.role, "Contact is not an email address, skipped");
                    return None;
                }
                t.email = t.email.trim().to_string();
                seen.insert(t.email.to_ascii_lowercase()).then_some(t)
            })
            .collect()
    }

    /// Notify every resolved target concurrently and report per target.
    pub async fn notify(&self, patient: &Patient, outcome: &PredictionOutcome) -> FanOutReport {
        let targets = self.resolve_targets(patient);
        if targets.is_empty() {
            tracing::warn!(
                patient_id = %patient.patient_id,
                "Positive finding but no notification targets resolved"
            );
            return FanOutReport::default();
        }

        let dispatches = targets.into_iter().map(|target| {
            let message = compose_message(&target, patient, outcome);
            async move {
                let status = match self.dispatch(&message).await {
                    Ok(()) => {
                        tracing::info!(
                            patient_id = %patient.patient_id,
                            role = %target.role,
                            recipient = %target.email,
                            "Notification sent"
                        );
                        DeliveryStatus::Sent
                    }
                    Err(e) => {
                        tracing::warn!(
                            patient_id = %patient.patient_id,
                            role = %target.role,
                            recipient = %target.email,
                            error = %e,
                            "Notification failed"
                        );
                        DeliveryStatus::Failed {
                            reason: e.to_string(),
                        }
                    }
                };
                Delivery { target, status }
            }
        });

        FanOutReport {
            deliveries: join_all(dispatches).await,
        }
    }

    async fn dispatch(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        match tokio::time::timeout(self.timeout, self.mailer.send(message)).await {
            Ok(result) => result,
            Err(_) => Err(NotificationError::Timeout {
                timeout_ms: self.timeout.as_millis(),
            }),
        }
    }
}

pub fn compose_message(
    target: &NotificationTarget,
    patient: &Patient,
    outcome: &PredictionOutcome,
) -> EmailMessage {
    let percent = format!("{:.0}%", outcome.probability * 100.0);
    let subject = format!("Asthma risk alert for {}", patient.name);
    let text = format!(
        "Hello {},\n\nA recent asthma screening for {} (patient {}) returned \"{}\" \
         with a probability of {}.\nPlease review the patient's latest symptom log and follow up.\n",
        target.name, patient.name, patient.patient_id, outcome.label, percent
    );
    let html = format!(
        "<p>Hello {},</p><p>A recent asthma screening for <strong>{}</strong> (patient {}) \
         returned <strong>{}</strong> with a probability of <strong>{}</strong>.</p>\
         <p>Please review the patient's latest symptom log and follow up.</p>",
        escape_html(&target.name),
        escape_html(&patient.name),
        escape_html(&patient.patient_id),
        outcome.label,
        percent
    );

    EmailMessage {
        recipient: target.email.clone(),
        subject,
        text,
        html,
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
