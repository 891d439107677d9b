use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{EntityKind, EventLogAction};

/// One immutable row of the audit trail. `snapshot` is the JSON
/// serialization of the entity as it looked when the event was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    pub id: Uuid,
    pub action: EventLogAction,
    pub entity_kind: EntityKind,
    pub entity_id: Uuid,
    pub user_id: Uuid,
    pub snapshot: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
