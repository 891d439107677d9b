//! Event log — append-only audit trail over the tracked entities.
//!
//! Every create/update/delete of a medication, consultation or exam
//! records one event carrying the action, the owner, and a JSON
//! snapshot of the entity at mutation time. Events are written in the
//! same transaction as the primary row, so neither can land without
//! the other.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::lifecycle::TrackedRecord;
use crate::models::enums::EventLogAction;
use crate::models::{EventLog, Page, PageRequest, User};

/// Append one event for `record`. Callers pass the transaction the
/// primary write runs in.
pub fn record<R: TrackedRecord>(
    conn: &Connection,
    action: EventLogAction,
    owner: &User,
    record: &R,
) -> Result<EventLog, DatabaseError> {
    let snapshot = serde_json::to_value(record)
        .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
    let event = EventLog {
        id: Uuid::new_v4(),
        action,
        entity_kind: R::KIND,
        entity_id: record.id(),
        user_id: owner.id,
        snapshot,
        created_at: Utc::now(),
    };
    repository::event_log::insert_event(conn, &event)?;
    Ok(event)
}

/// The caller's event history, newest first.
pub fn history(
    conn: &Connection,
    owner: &User,
    page: PageRequest,
) -> Result<Page<EventLog>, DatabaseError> {
    repository::event_log::page_events_for_user(conn, &owner.id, page)
}

/// Wire shape of one history entry. The stored snapshot stays internal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLogResponse {
    pub id: Uuid,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<EventLog> for EventLogResponse {
    fn from(event: EventLog) -> Self {
        Self {
            id: event.id,
            action: event.action.as_str().into(),
            entity_type: event.entity_kind.as_str().into(),
            entity_id: event.entity_id,
            created_at: event.created_at,
        }
    }
}
