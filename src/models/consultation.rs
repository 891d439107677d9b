use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub doctor_name: String,
    pub local: String,
    pub description: String,
    pub is_completed: bool,
    pub user_id: Uuid,
    pub deleted_at: Option<DateTime<Utc>>,
}
