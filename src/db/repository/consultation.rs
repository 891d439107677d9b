use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::repository::{parse_optional_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::*;

const COLUMNS: &str =
    "id, date, doctor_name, local, description, is_completed, user_id, deleted_at";

pub fn insert_consultation(
    conn: &Connection,
    consultation: &Consultation,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO consultations (id, date, doctor_name, local, description, is_completed,
         user_id, deleted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            consultation.id.to_string(),
            consultation.date.to_rfc3339(),
            consultation.doctor_name,
            consultation.local,
            consultation.description,
            consultation.is_completed as i32,
            consultation.user_id.to_string(),
            consultation.deleted_at.map(|d| d.to_rfc3339()),
        ],
    )?;
    Ok(())
}

/// Overwrite the domain fields of an existing row. Ownership, completion
/// and deletion state are managed by dedicated functions.
pub fn update_consultation(
    conn: &Connection,
    consultation: &Consultation,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE consultations SET date = ?2, doctor_name = ?3, local = ?4, description = ?5
         WHERE id = ?1",
        params![
            consultation.id.to_string(),
            consultation.date.to_rfc3339(),
            consultation.doctor_name,
            consultation.local,
            consultation.description,
        ],
    )?;
    Ok(())
}

/// Look up a single row scoped to its owner and not soft-deleted.
pub fn find_owned_consultation(
    conn: &Connection,
    id: &Uuid,
    user_id: &Uuid,
) -> Result<Option<Consultation>, DatabaseError> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {COLUMNS} FROM consultations
                 WHERE id = ?1 AND user_id = ?2 AND deleted_at IS NULL"
            ),
            params![id.to_string(), user_id.to_string()],
            consultation_row_from_rusqlite,
        )
        .optional()?;
    row.map(consultation_from_row).transpose()
}

pub fn soft_delete_consultation(
    conn: &Connection,
    id: &Uuid,
    deleted_at: &DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE consultations SET deleted_at = ?2 WHERE id = ?1",
        params![id.to_string(), deleted_at.to_rfc3339()],
    )?;
    Ok(())
}

pub fn set_consultation_completed(
    conn: &Connection,
    id: &Uuid,
    completed: bool,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE consultations SET is_completed = ?2 WHERE id = ?1",
        params![id.to_string(), completed as i32],
    )?;
    Ok(())
}

/// One page of the owner's rows with the given completion state,
/// soft-deleted rows excluded, earliest appointment first.
pub fn page_owned_consultations(
    conn: &Connection,
    user_id: &Uuid,
    completed: bool,
    page: PageRequest,
) -> Result<Page<Consultation>, DatabaseError> {
    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM consultations
         WHERE user_id = ?1 AND deleted_at IS NULL AND is_completed = ?2",
        params![user_id.to_string(), completed as i32],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM consultations
         WHERE user_id = ?1 AND deleted_at IS NULL AND is_completed = ?2
         ORDER BY date, id LIMIT ?3 OFFSET ?4"
    ))?;

    let rows = stmt.query_map(
        params![
            user_id.to_string(),
            completed as i32,
            page.limit(),
            page.offset()
        ],
        consultation_row_from_rusqlite,
    )?;

    let mut consultations = Vec::new();
    for row in rows {
        consultations.push(consultation_from_row(row?)?);
    }
    Ok(Page::new(consultations, total as u64, page))
}

// Internal row type for Consultation mapping
struct ConsultationRow {
    id: String,
    date: String,
    doctor_name: String,
    local: String,
    description: String,
    is_completed: i32,
    user_id: String,
    deleted_at: Option<String>,
}

fn consultation_row_from_rusqlite(
    row: &rusqlite::Row<'_>,
) -> Result<ConsultationRow, rusqlite::Error> {
    Ok(ConsultationRow {
        id: row.get(0)?,
        date: row.get(1)?,
        doctor_name: row.get(2)?,
        local: row.get(3)?,
        description: row.get(4)?,
        is_completed: row.get(5)?,
        user_id: row.get(6)?,
        deleted_at: row.get(7)?,
    })
}

fn consultation_from_row(row: ConsultationRow) -> Result<Consultation, DatabaseError> {
    Ok(Consultation {
        id: parse_uuid(&row.id)?,
        date: parse_timestamp(&row.date)?,
        doctor_name: row.doctor_name,
        local: row.local,
        description: row.description,
        is_completed: row.is_completed != 0,
        user_id: parse_uuid(&row.user_id)?,
        deleted_at: parse_optional_timestamp(row.deleted_at)?,
    })
}
