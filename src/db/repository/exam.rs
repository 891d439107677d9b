use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::repository::{parse_optional_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::*;

const COLUMNS: &str = "id, date, name, local, description, is_completed, user_id, deleted_at";

pub fn insert_exam(conn: &Connection, exam: &Exam) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO exams (id, date, name, local, description, is_completed, user_id, deleted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            exam.id.to_string(),
            exam.date.to_rfc3339(),
            exam.name,
            exam.local,
            exam.description,
            exam.is_completed as i32,
            exam.user_id.to_string(),
            exam.deleted_at.map(|d| d.to_rfc3339()),
        ],
    )?;
    Ok(())
}

/// Overwrite the domain fields of an existing row. Ownership, completion
/// and deletion state are managed by dedicated functions.
pub fn update_exam(conn: &Connection, exam: &Exam) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE exams SET date = ?2, name = ?3, local = ?4, description = ?5
         WHERE id = ?1",
        params![
            exam.id.to_string(),
            exam.date.to_rfc3339(),
            exam.name,
            exam.local,
            exam.description,
        ],
    )?;
    Ok(())
}

/// Look up a single row scoped to its owner and not soft-deleted.
pub fn find_owned_exam(
    conn: &Connection,
    id: &Uuid,
    user_id: &Uuid,
) -> Result<Option<Exam>, DatabaseError> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {COLUMNS} FROM exams
                 WHERE id = ?1 AND user_id = ?2 AND deleted_at IS NULL"
            ),
            params![id.to_string(), user_id.to_string()],
            exam_row_from_rusqlite,
        )
        .optional()?;
    row.map(exam_from_row).transpose()
}

/// Duplicate check for create: does the owner already have a non-deleted
/// exam with this exact name and date?
pub fn exam_exists_with_name_and_date(
    conn: &Connection,
    user_id: &Uuid,
    name: &str,
    date: &DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM exams
         WHERE user_id = ?1 AND name = ?2 AND date = ?3 AND deleted_at IS NULL",
        params![user_id.to_string(), name, date.to_rfc3339()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn soft_delete_exam(
    conn: &Connection,
    id: &Uuid,
    deleted_at: &DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE exams SET deleted_at = ?2 WHERE id = ?1",
        params![id.to_string(), deleted_at.to_rfc3339()],
    )?;
    Ok(())
}

pub fn set_exam_completed(
    conn: &Connection,
    id: &Uuid,
    completed: bool,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE exams SET is_completed = ?2 WHERE id = ?1",
        params![id.to_string(), completed as i32],
    )?;
    Ok(())
}

/// One page of the owner's rows with the given completion state,
/// soft-deleted rows excluded, earliest exam first.
pub fn page_owned_exams(
    conn: &Connection,
    user_id: &Uuid,
    completed: bool,
    page: PageRequest,
) -> Result<Page<Exam>, DatabaseError> {
    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM exams
         WHERE user_id = ?1 AND deleted_at IS NULL AND is_completed = ?2",
        params![user_id.to_string(), completed as i32],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM exams
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
        exam_row_from_rusqlite,
    )?;

    let mut exams = Vec::new();
    for row in rows {
        exams.push(exam_from_row(row?)?);
    }
    Ok(Page::new(exams, total as u64, page))
}

// Internal row type for Exam mapping
struct ExamRow {
    id: String,
    date: String,
    name: String,
    local: String,
    description: Option<String>,
    is_completed: i32,
    user_id: String,
    deleted_at: Option<String>,
}

fn exam_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<ExamRow, rusqlite::Error> {
    Ok(ExamRow {
        id: row.get(0)?,
        date: row.get(1)?,
        name: row.get(2)?,
        local: row.get(3)?,
        description: row.get(4)?,
        is_completed: row.get(5)?,
        user_id: row.get(6)?,
        deleted_at: row.get(7)?,
    })
}

fn exam_from_row(row: ExamRow) -> Result<Exam, DatabaseError> {
    Ok(Exam {
        id: parse_uuid(&row.id)?,
        date: parse_timestamp(&row.date)?,
        name: row.name,
        local: row.local,
        description: row.description,
        is_completed: row.is_completed != 0,
        user_id: parse_uuid(&row.user_id)?,
        deleted_at: parse_optional_timestamp(row.deleted_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::user::insert_user;
    use crate::models::User;

    fn seed_user(conn: &Connection) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            email: format!("{}@example.com", Uuid::new_v4()),
        };
        insert_user(conn, &user, &user.id.to_string()).unwrap();
        user
    }

    fn sample(user: &User) -> Exam {
        Exam {
            id: Uuid::new_v4(),
            date: Utc::now(),
            name: "Blood panel".into(),
            local: "Lab Central".into(),
            description: Some("fasting".into()),
            is_completed: false,
            user_id: user.id,
            deleted_at: None,
        }
    }

    #[test]
    fn insert_and_find_round_trip() {
        let conn = open_memory_database().unwrap();
        let user = seed_user(&conn);
        let exam = sample(&user);
        insert_exam(&conn, &exam).unwrap();

        let found = find_owned_exam(&conn, &exam.id, &user.id).unwrap().unwrap();
        assert_eq!(found.name, "Blood panel");
        assert_eq!(found.description.as_deref(), Some("fasting"));
    }

    #[test]
    fn duplicate_check_sees_same_name_and_date() {
        let conn = open_memory_database().unwrap();
        let user = seed_user(&conn);
        let exam = sample(&user);
        insert_exam(&conn, &exam).unwrap();

        assert!(
            exam_exists_with_name_and_date(&conn, &user.id, &exam.name, &exam.date).unwrap()
        );
        assert!(
            !exam_exists_with_name_and_date(&conn, &user.id, "Other", &exam.date).unwrap()
        );
    }

    #[test]
    fn duplicate_check_ignores_soft_deleted_and_other_owners() {
        let conn = open_memory_database().unwrap();
        let owner = seed_user(&conn);
        let other = seed_user(&conn);
        let exam = sample(&owner);
        insert_exam(&conn, &exam).unwrap();

        // Another user can register the same name+date
        assert!(
            !exam_exists_with_name_and_date(&conn, &other.id, &exam.name, &exam.date).unwrap()
        );

        // Soft deletion frees the slot for the owner
        soft_delete_exam(&conn, &exam.id, &Utc::now()).unwrap();
        assert!(
            !exam_exists_with_name_and_date(&conn, &owner.id, &exam.name, &exam.date).unwrap()
        );
    }

    #[test]
    fn soft_delete_keeps_the_row() {
        let conn = open_memory_database().unwrap();
        let user = seed_user(&conn);
        let exam = sample(&user);
        insert_exam(&conn, &exam).unwrap();
        soft_delete_exam(&conn, &exam.id, &Utc::now()).unwrap();

        assert!(find_owned_exam(&conn, &exam.id, &user.id).unwrap().is_none());
        let raw: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM exams WHERE id = ?1",
                params![exam.id.to_string()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(raw, 1);
    }
}
