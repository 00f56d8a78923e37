use serde::Serialize;

use super::enums::RecipientRole;

/// A resolved recipient. Computed per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationTarget {
    pub role: RecipientRole,
    pub name: String,
    pub email: String,
}

/// Payload handed to the email transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub recipient: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    pub target: NotificationTarget,
    pub status: DeliveryStatus,
}

/// Per-target outcome of one notification fan-out.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FanOutReport {
    pub deliveries: Vec<Delivery>,
}

impl FanOutReport {
    pub fn attempted(&self) -> usize {
        self.deliveries.len()
    }

    pub fn sent_count(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|d| d.status == DeliveryStatus::Sent)
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries
            .iter()
            .filter(|d| matches!(d.status, DeliveryStatus::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}
