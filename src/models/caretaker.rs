use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A caretaker and the patients they look after.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caretaker {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub patient_ids: Vec<String>,
}
