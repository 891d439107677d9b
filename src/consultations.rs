//! Consultation service — wire DTOs plus the store that binds the
//! generic audited lifecycle to the consultations table.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repository::consultation as repo;
use crate::lifecycle::{LifecycleError, RecordStore, TrackedRecord};
use crate::models::enums::EntityKind;
use crate::models::{Consultation, Page, PageRequest, User};

/// Create/update payload. The same shape serves both operations,
/// mirroring the PUT-overwrites-everything contract.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRequest {
    pub date: DateTime<Utc>,
    pub doctor_name: String,
    pub local: String,
    pub description: String,
}

/// Public shape of a consultation. Ownership and deletion state stay
/// server-side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationResponse {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub doctor_name: String,
    pub local: String,
    pub description: String,
    pub is_completed: bool,
}

impl From<Consultation> for ConsultationResponse {
    fn from(consultation: Consultation) -> Self {
        Self {
            id: consultation.id,
            date: consultation.date,
            doctor_name: consultation.doctor_name,
            local: consultation.local,
            description: consultation.description,
            is_completed: consultation.is_completed,
        }
    }
}

impl TrackedRecord for Consultation {
    const KIND: EntityKind = EntityKind::Consultation;

    fn id(&self) -> Uuid {
        self.id
    }

    fn is_completed(&self) -> bool {
        self.is_completed
    }
}

pub struct ConsultationStore;

impl RecordStore for ConsultationStore {
    type Record = Consultation;
    type CreateInput = ConsultationRequest;
    type UpdateInput = ConsultationRequest;

    fn insert(
        conn: &Connection,
        owner: &User,
        input: ConsultationRequest,
    ) -> Result<Consultation, LifecycleError> {
        let consultation = Consultation {
            id: Uuid::new_v4(),
            date: input.date,
            doctor_name: input.doctor_name,
            local: input.local,
            description: input.description,
            is_completed: false,
            user_id: owner.id,
            deleted_at: None,
        };
        repo::insert_consultation(conn, &consultation)?;
        Ok(consultation)
    }

    fn find_owned(
        conn: &Connection,
        id: &Uuid,
        owner: &User,
    ) -> Result<Option<Consultation>, LifecycleError> {
        Ok(repo::find_owned_consultation(conn, id, &owner.id)?)
    }

    fn apply_update(
        conn: &Connection,
        mut current: Consultation,
        input: ConsultationRequest,
    ) -> Result<Consultation, LifecycleError> {
        current.date = input.date;
        current.doctor_name = input.doctor_name;
        current.local = input.local;
        current.description = input.description;
        repo::update_consultation(conn, &current)?;
        Ok(current)
    }

    fn mark_deleted(
        conn: &Connection,
        id: &Uuid,
        deleted_at: &DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        Ok(repo::soft_delete_consultation(conn, id, deleted_at)?)
    }

    fn set_completed(
        conn: &Connection,
        id: &Uuid,
        completed: bool,
    ) -> Result<(), LifecycleError> {
        Ok(repo::set_consultation_completed(conn, id, completed)?)
    }

    fn page_owned(
        conn: &Connection,
        owner: &User,
        completed: bool,
        page: PageRequest,
    ) -> Result<Page<Consultation>, LifecycleError> {
        Ok(repo::page_owned_consultations(
            conn, &owner.id, completed, page,
        )?)
    }
}
