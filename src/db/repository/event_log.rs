use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::repository::{parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::{EntityKind, EventLogAction};
use crate::models::*;

/// Append one event. Rows in this table are never updated or deleted.
pub fn insert_event(conn: &Connection, event: &EventLog) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO event_log (id, action, entity_kind, entity_id, user_id, snapshot, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.id.to_string(),
            event.action.as_str(),
            event.entity_kind.as_str(),
            event.entity_id.to_string(),
            event.user_id.to_string(),
            event.snapshot.to_string(),
            event.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// One page of the owner's events, newest first.
pub fn page_events_for_user(
    conn: &Connection,
    user_id: &Uuid,
    page: PageRequest,
) -> Result<Page<EventLog>, DatabaseError> {
    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM event_log WHERE user_id = ?1",
        params![user_id.to_string()],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT id, action, entity_kind, entity_id, user_id, snapshot, created_at
         FROM event_log WHERE user_id = ?1
         ORDER BY created_at DESC, rowid DESC LIMIT ?2 OFFSET ?3",
    )?;

    let rows = stmt.query_map(
        params![user_id.to_string(), page.limit(), page.offset()],
        event_row_from_rusqlite,
    )?;

    let mut events = Vec::new();
    for row in rows {
        events.push(event_from_row(row?)?);
    }
    Ok(Page::new(events, total as u64, page))
}

/// Events recorded against a single entity, oldest first.
/// Used by tests and by support tooling to replay an entity's history.
pub fn events_for_entity(
    conn: &Connection,
    entity_id: &Uuid,
) -> Result<Vec<EventLog>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, action, entity_kind, entity_id, user_id, snapshot, created_at
         FROM event_log WHERE entity_id = ?1 ORDER BY created_at, rowid",
    )?;

    let rows = stmt.query_map(params![entity_id.to_string()], event_row_from_rusqlite)?;

    let mut events = Vec::new();
    for row in rows {
        events.push(event_from_row(row?)?);
    }
    Ok(events)
}

// Internal row type for EventLog mapping
struct EventRow {
    id: String,
    action: String,
    entity_kind: String,
    entity_id: String,
    user_id: String,
    snapshot: String,
    created_at: String,
}

fn event_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<EventRow, rusqlite::Error> {
    Ok(EventRow {
        id: row.get(0)?,
        action: row.get(1)?,
        entity_kind: row.get(2)?,
        entity_id: row.get(3)?,
        user_id: row.get(4)?,
        snapshot: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn event_from_row(row: EventRow) -> Result<EventLog, DatabaseError> {
    Ok(EventLog {
        id: parse_uuid(&row.id)?,
        action: EventLogAction::from_str(&row.action)?,
        entity_kind: EntityKind::from_str(&row.entity_kind)?,
        entity_id: parse_uuid(&row.entity_id)?,
        user_id: parse_uuid(&row.user_id)?,
        snapshot: serde_json::from_str(&row.snapshot)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?,
        created_at: parse_timestamp(&row.created_at)?,
    })
}
