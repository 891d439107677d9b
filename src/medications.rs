//! Medication service — wire DTOs plus the store that binds the
//! generic audited lifecycle to the medications table.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repository::medication as repo;
use crate::lifecycle::{LifecycleError, RecordStore, TrackedRecord};
use crate::models::enums::EntityKind;
use crate::models::{Medication, Page, PageRequest, User};

/// Create/update payload. The same shape serves both operations,
/// mirroring the PUT-overwrites-everything contract.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRequest {
    pub name: String,
    pub dose: String,
    pub amount: i32,
    pub unit: String,
    #[serde(default)]
    pub continuous_use: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Public shape of a medication. Ownership and deletion state stay
/// server-side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationResponse {
    pub id: Uuid,
    pub name: String,
    pub dose: String,
    pub amount: i32,
    pub unit: String,
    pub continuous_use: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
}

impl From<Medication> for MedicationResponse {
    fn from(med: Medication) -> Self {
        Self {
            id: med.id,
            name: med.name,
            dose: med.dose,
            amount: med.amount,
            unit: med.unit,
            continuous_use: med.continuous_use,
            start_date: med.start_date,
            end_date: med.end_date,
            is_completed: med.is_completed,
        }
    }
}

impl TrackedRecord for Medication {
    const KIND: EntityKind = EntityKind::Medication;

    fn id(&self) -> Uuid {
        self.id
    }

    fn is_completed(&self) -> bool {
        self.is_completed
    }
}

pub struct MedicationStore;

impl RecordStore for MedicationStore {
    type Record = Medication;
    type CreateInput = MedicationRequest;
    type UpdateInput = MedicationRequest;

    fn insert(
        conn: &Connection,
        owner: &User,
        input: MedicationRequest,
    ) -> Result<Medication, LifecycleError> {
        let med = Medication {
            id: Uuid::new_v4(),
            name: input.name,
            dose: input.dose,
            amount: input.amount,
            unit: input.unit,
            continuous_use: input.continuous_use,
            start_date: input.start_date,
            end_date: input.end_date,
            is_completed: false,
            user_id: owner.id,
            deleted_at: None,
        };
        repo::insert_medication(conn, &med)?;
        Ok(med)
    }

    fn find_owned(
        conn: &Connection,
        id: &Uuid,
        owner: &User,
    ) -> Result<Option<Medication>, LifecycleError> {
        Ok(repo::find_owned_medication(conn, id, &owner.id)?)
    }

    fn apply_update(
        conn: &Connection,
        mut current: Medication,
        input: MedicationRequest,
    ) -> Result<Medication, LifecycleError> {
        current.name = input.name;
        current.dose = input.dose;
        current.amount = input.amount;
        current.unit = input.unit;
        current.continuous_use = input.continuous_use;
        current.start_date = input.start_date;
        current.end_date = input.end_date;
        repo::update_medication(conn, &current)?;
        Ok(current)
    }

    fn mark_deleted(
        conn: &Connection,
        id: &Uuid,
        deleted_at: &DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        Ok(repo::soft_delete_medication(conn, id, deleted_at)?)
    }

    fn set_completed(
        conn: &Connection,
        id: &Uuid,
        completed: bool,
    ) -> Result<(), LifecycleError> {
        Ok(repo::set_medication_completed(conn, id, completed)?)
    }

    fn page_owned(
        conn: &Connection,
        owner: &User,
        completed: bool,
        page: PageRequest,
    ) -> Result<Page<Medication>, LifecycleError> {
        Ok(repo::page_owned_medications(conn, &owner.id, completed, page)?)
    }
}
