use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub dose: String,
    pub amount: i32,
    pub unit: String,
    pub continuous_use: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub user_id: Uuid,
    pub deleted_at: Option<DateTime<Utc>>,
}
