//! Exam service — wire DTOs plus the store that binds the generic
//! audited lifecycle to the exams table.
//!
//! Exams carry stricter create rules than the other entities: date,
//! name and local are all required, and an owner cannot register two
//! non-deleted exams with the same name and date.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repository::exam as repo;
use crate::lifecycle::{LifecycleError, RecordStore, TrackedRecord};
use crate::models::enums::EntityKind;
use crate::models::{Exam, Page, PageRequest, User};

/// Create/update payload. Fields are optional at the wire level so a
/// missing one is reported as a validation failure, not a parse error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamRequest {
    pub date: Option<DateTime<Utc>>,
    pub name: Option<String>,
    pub local: Option<String>,
    pub description: Option<String>,
}

/// Public shape of an exam. Ownership and deletion state stay
/// server-side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResponse {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub name: String,
    pub local: String,
    pub description: Option<String>,
    pub is_completed: bool,
}

impl From<Exam> for ExamResponse {
    fn from(exam: Exam) -> Self {
        Self {
            id: exam.id,
            date: exam.date,
            name: exam.name,
            local: exam.local,
            description: exam.description,
            is_completed: exam.is_completed,
        }
    }
}

impl TrackedRecord for Exam {
    const KIND: EntityKind = EntityKind::Exam;

    fn id(&self) -> Uuid {
        self.id
    }

    fn is_completed(&self) -> bool {
        self.is_completed
    }
}

fn missing_fields() -> LifecycleError {
    LifecycleError::Validation("All fields must be provided.".into())
}

pub struct ExamStore;

impl RecordStore for ExamStore {
    type Record = Exam;
    type CreateInput = ExamRequest;
    type UpdateInput = ExamRequest;

    fn validate_create(
        conn: &Connection,
        owner: &User,
        input: &ExamRequest,
    ) -> Result<(), LifecycleError> {
        let (Some(date), Some(name), Some(_)) = (&input.date, &input.name, &input.local) else {
            return Err(missing_fields());
        };
        if repo::exam_exists_with_name_and_date(conn, &owner.id, name, date)? {
            return Err(LifecycleError::Validation(
                "An exam with the same name and date already exists.".into(),
            ));
        }
        Ok(())
    }

    fn insert(conn: &Connection, owner: &User, input: ExamRequest) -> Result<Exam, LifecycleError> {
        let exam = Exam {
            id: Uuid::new_v4(),
            date: input.date.ok_or_else(missing_fields)?,
            name: input.name.ok_or_else(missing_fields)?,
            local: input.local.ok_or_else(missing_fields)?,
            description: input.description,
            is_completed: false,
            user_id: owner.id,
            deleted_at: None,
        };
        repo::insert_exam(conn, &exam)?;
        Ok(exam)
    }

    fn find_owned(
        conn: &Connection,
        id: &Uuid,
        owner: &User,
    ) -> Result<Option<Exam>, LifecycleError> {
        Ok(repo::find_owned_exam(conn, id, &owner.id)?)
    }

    fn apply_update(
        conn: &Connection,
        mut current: Exam,
        input: ExamRequest,
    ) -> Result<Exam, LifecycleError> {
        current.date = input.date.ok_or_else(missing_fields)?;
        current.name = input.name.ok_or_else(missing_fields)?;
        current.local = input.local.ok_or_else(missing_fields)?;
        current.description = input.description;
        repo::update_exam(conn, &current)?;
        Ok(current)
    }

    fn mark_deleted(
        conn: &Connection,
        id: &Uuid,
        deleted_at: &DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        Ok(repo::soft_delete_exam(conn, id, deleted_at)?)
    }

    fn set_completed(
        conn: &Connection,
        id: &Uuid,
        completed: bool,
    ) -> Result<(), LifecycleError> {
        Ok(repo::set_exam_completed(conn, id, completed)?)
    }

    fn page_owned(
        conn: &Connection,
        owner: &User,
        completed: bool,
        page: PageRequest,
    ) -> Result<Page<Exam>, LifecycleError> {
        Ok(repo::page_owned_exams(conn, &owner.id, completed, page)?)
    }
}
