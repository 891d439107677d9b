use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::repository::{parse_optional_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::*;

const COLUMNS: &str = "id, name, dose, amount, unit, continuous_use, start_date, end_date,
         is_completed, user_id, deleted_at";

pub fn insert_medication(conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medications (id, name, dose, amount, unit, continuous_use, start_date,
         end_date, is_completed, user_id, deleted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            med.id.to_string(),
            med.name,
            med.dose,
            med.amount,
            med.unit,
            med.continuous_use as i32,
            med.start_date.to_rfc3339(),
            med.end_date.map(|d| d.to_rfc3339()),
            med.is_completed as i32,
            med.user_id.to_string(),
            med.deleted_at.map(|d| d.to_rfc3339()),
        ],
    )?;
    Ok(())
}

/// Overwrite the domain fields of an existing row. Ownership, completion
/// and deletion state are managed by dedicated functions.
pub fn update_medication(conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE medications SET name = ?2, dose = ?3, amount = ?4, unit = ?5,
         continuous_use = ?6, start_date = ?7, end_date = ?8
         WHERE id = ?1",
        params![
            med.id.to_string(),
            med.name,
            med.dose,
            med.amount,
            med.unit,
            med.continuous_use as i32,
            med.start_date.to_rfc3339(),
            med.end_date.map(|d| d.to_rfc3339()),
        ],
    )?;
    Ok(())
}

/// Look up a single row scoped to its owner and not soft-deleted.
pub fn find_owned_medication(
    conn: &Connection,
    id: &Uuid,
    user_id: &Uuid,
) -> Result<Option<Medication>, DatabaseError> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {COLUMNS} FROM medications
                 WHERE id = ?1 AND user_id = ?2 AND deleted_at IS NULL"
            ),
            params![id.to_string(), user_id.to_string()],
            medication_row_from_rusqlite,
        )
        .optional()?;
    row.map(medication_from_row).transpose()
}

pub fn soft_delete_medication(
    conn: &Connection,
    id: &Uuid,
    deleted_at: &DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE medications SET deleted_at = ?2 WHERE id = ?1",
        params![id.to_string(), deleted_at.to_rfc3339()],
    )?;
    Ok(())
}

pub fn set_medication_completed(
    conn: &Connection,
    id: &Uuid,
    completed: bool,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE medications SET is_completed = ?2 WHERE id = ?1",
        params![id.to_string(), completed as i32],
    )?;
    Ok(())
}

/// One page of the owner's rows with the given completion state,
/// soft-deleted rows excluded, oldest start date first.
pub fn page_owned_medications(
    conn: &Connection,
    user_id: &Uuid,
    completed: bool,
    page: PageRequest,
) -> Result<Page<Medication>, DatabaseError> {
    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM medications
         WHERE user_id = ?1 AND deleted_at IS NULL AND is_completed = ?2",
        params![user_id.to_string(), completed as i32],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM medications
         WHERE user_id = ?1 AND deleted_at IS NULL AND is_completed = ?2
         ORDER BY start_date, id LIMIT ?3 OFFSET ?4"
    ))?;

    let rows = stmt.query_map(
        params![
            user_id.to_string(),
            completed as i32,
            page.limit(),
            page.offset()
        ],
        medication_row_from_rusqlite,
    )?;

    let mut meds = Vec::new();
    for row in rows {
        meds.push(medication_from_row(row?)?);
    }
    Ok(Page::new(meds, total as u64, page))
}

// Internal row type for Medication mapping
struct MedicationRow {
    id: String,
    name: String,
    dose: String,
    amount: i32,
    unit: String,
    continuous_use: i32,
    start_date: String,
    end_date: Option<String>,
    is_completed: i32,
    user_id: String,
    deleted_at: Option<String>,
}

fn medication_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<MedicationRow, rusqlite::Error> {
    Ok(MedicationRow {
        id: row.get(0)?,
        name: row.get(1)?,
        dose: row.get(2)?,
        amount: row.get(3)?,
        unit: row.get(4)?,
        continuous_use: row.get(5)?,
        start_date: row.get(6)?,
        end_date: row.get(7)?,
        is_completed: row.get(8)?,
        user_id: row.get(9)?,
        deleted_at: row.get(10)?,
    })
}

fn medication_from_row(row: MedicationRow) -> Result<Medication, DatabaseError> {
    Ok(Medication {
        id: parse_uuid(&row.id)?,
        name: row.name,
        dose: row.dose,
        amount: row.amount,
        unit: row.unit,
        continuous_use: row.continuous_use != 0,
        start_date: parse_timestamp(&row.start_date)?,
        end_date: parse_optional_timestamp(row.end_date)?,
        is_completed: row.is_completed != 0,
        user_id: parse_uuid(&row.user_id)?,
        deleted_at: parse_optional_timestamp(row.deleted_at)?,
    })
}
