//! Audited, owner-scoped entity lifecycle.
//!
//! One generic implementation of list / create / update / soft-delete /
//! toggle-complete, shared by every tracked entity. Entities plug in
//! through two seams:
//!
//! - [`TrackedRecord`] — what the lifecycle needs to know about a row
//!   (kind, id, completion flag) to audit and report it;
//! - [`RecordStore`] — the table operations, implemented per entity on
//!   top of `db::repository`, plus an optional create-validation hook.
//!
//! Every mutation runs in a single SQLite transaction covering the
//! primary write and its event-log row; a failure in either leaves
//! both unapplied. Lookups are always scoped to the owner and to rows
//! without a deletion timestamp, and a miss is reported as
//! [`LifecycleError::NotFound`] regardless of whether the row is
//! absent, soft-deleted, or owned by someone else.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::event_log;
use crate::models::enums::{EntityKind, EventLogAction};
use crate::models::{Page, PageRequest, User};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Invalid ID.")]
    InvalidIdentifier,

    #[error("{0}")]
    Validation(String),

    #[error("{} not found.", .0.label())]
    NotFound(EntityKind),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// What the generic lifecycle needs from a tracked row.
pub trait TrackedRecord: Serialize {
    const KIND: EntityKind;

    fn id(&self) -> Uuid;
    fn is_completed(&self) -> bool;
}

/// Table operations for one entity. Implementations delegate to the
/// repository functions for their table; they never write the event
/// log themselves.
pub trait RecordStore {
    type Record: TrackedRecord;
    type CreateInput;
    type UpdateInput;

    /// Create-time validation hook. Runs inside the create transaction,
    /// before the insert. Default: nothing to check.
    fn validate_create(
        _conn: &Connection,
        _owner: &User,
        _input: &Self::CreateInput,
    ) -> Result<(), LifecycleError> {
        Ok(())
    }

    fn insert(
        conn: &Connection,
        owner: &User,
        input: Self::CreateInput,
    ) -> Result<Self::Record, LifecycleError>;

    /// Owner-scoped lookup; soft-deleted rows are never returned.
    fn find_owned(
        conn: &Connection,
        id: &Uuid,
        owner: &User,
    ) -> Result<Option<Self::Record>, LifecycleError>;

    /// Overwrite domain fields from the request. Ownership and the
    /// completion flag are not touched here.
    fn apply_update(
        conn: &Connection,
        current: Self::Record,
        input: Self::UpdateInput,
    ) -> Result<Self::Record, LifecycleError>;

    fn mark_deleted(
        conn: &Connection,
        id: &Uuid,
        deleted_at: &DateTime<Utc>,
    ) -> Result<(), LifecycleError>;

    fn set_completed(conn: &Connection, id: &Uuid, completed: bool)
        -> Result<(), LifecycleError>;

    fn page_owned(
        conn: &Connection,
        owner: &User,
        completed: bool,
        page: PageRequest,
    ) -> Result<Page<Self::Record>, LifecycleError>;
}

fn parse_id(raw: &str) -> Result<Uuid, LifecycleError> {
    Uuid::parse_str(raw).map_err(|_| LifecycleError::InvalidIdentifier)
}

fn not_found<S: RecordStore>() -> LifecycleError {
    LifecycleError::NotFound(<S::Record as TrackedRecord>::KIND)
}

/// The owner's rows with the given completion state, one page at a time.
pub fn list<S: RecordStore>(
    conn: &Connection,
    owner: &User,
    completed: bool,
    page: PageRequest,
) -> Result<Page<S::Record>, LifecycleError> {
    S::page_owned(conn, owner, completed, page)
}

/// Validate, insert with the caller as owner, and record a `created`
/// event — all in one transaction.
pub fn create<S: RecordStore>(
    conn: &mut Connection,
    owner: &User,
    input: S::CreateInput,
) -> Result<S::Record, LifecycleError> {
    let tx = conn.transaction().map_err(DatabaseError::from)?;
    S::validate_create(&tx, owner, &input)?;
    let record = S::insert(&tx, owner, input)?;
    event_log::record(&tx, EventLogAction::Created, owner, &record)?;
    tx.commit().map_err(DatabaseError::from)?;
    Ok(record)
}

/// Overwrite an owned row's domain fields and record an `updated` event.
pub fn update<S: RecordStore>(
    conn: &mut Connection,
    owner: &User,
    raw_id: &str,
    input: S::UpdateInput,
) -> Result<S::Record, LifecycleError> {
    let id = parse_id(raw_id)?;
    let tx = conn.transaction().map_err(DatabaseError::from)?;
    let current = S::find_owned(&tx, &id, owner)?.ok_or_else(not_found::<S>)?;
    let updated = S::apply_update(&tx, current, input)?;
    event_log::record(&tx, EventLogAction::Updated, owner, &updated)?;
    tx.commit().map_err(DatabaseError::from)?;
    Ok(updated)
}

/// Stamp an owned row's deletion timestamp and record a `deleted`
/// event. The row stays in the table; every lookup filters it out
/// from here on.
pub fn soft_delete<S: RecordStore>(
    conn: &mut Connection,
    owner: &User,
    raw_id: &str,
) -> Result<(), LifecycleError> {
    let id = parse_id(raw_id)?;
    let tx = conn.transaction().map_err(DatabaseError::from)?;
    let current = S::find_owned(&tx, &id, owner)?.ok_or_else(not_found::<S>)?;
    S::mark_deleted(&tx, &id, &Utc::now())?;
    event_log::record(&tx, EventLogAction::Deleted, owner, &current)?;
    tx.commit().map_err(DatabaseError::from)?;
    Ok(())
}

/// Flip an owned row's completion flag and record an `updated` event.
/// Applying this twice restores the original state.
pub fn toggle_complete<S: RecordStore>(
    conn: &mut Connection,
    owner: &User,
    raw_id: &str,
) -> Result<S::Record, LifecycleError> {
    let id = parse_id(raw_id)?;
    let tx = conn.transaction().map_err(DatabaseError::from)?;
    let current = S::find_owned(&tx, &id, owner)?.ok_or_else(not_found::<S>)?;
    S::set_completed(&tx, &id, !current.is_completed())?;
    // Re-read so the audit snapshot reflects the flipped flag.
    let updated = S::find_owned(&tx, &id, owner)?.ok_or_else(not_found::<S>)?;
    event_log::record(&tx, EventLogAction::Updated, owner, &updated)?;
    tx.commit().map_err(DatabaseError::from)?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consultations::{ConsultationRequest, ConsultationStore};
    use crate::db::repository::event_log::events_for_entity;
    use crate::db::repository::user::insert_user;
    use crate::db::open_memory_database;
    use crate::exams::{ExamRequest, ExamStore};
    use crate::medications::{MedicationRequest, MedicationStore};

    fn seed_user(conn: &Connection, name: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.into(),
            email: format!("{}@example.com", Uuid::new_v4()),
        };
        insert_user(conn, &user, &user.id.to_string()).unwrap();
        user
    }

    fn consultation_request() -> ConsultationRequest {
        ConsultationRequest {
            date: "2024-06-01T10:00:00Z".parse().unwrap(),
            doctor_name: "Dr. A".into(),
            local: "Clinic".into(),
            description: "checkup".into(),
        }
    }

    fn exam_request(name: &str) -> ExamRequest {
        ExamRequest {
            date: Some("2024-07-15T08:30:00Z".parse().unwrap()),
            name: Some(name.into()),
            local: Some("Lab Central".into()),
            description: None,
        }
    }

    fn medication_request() -> MedicationRequest {
        MedicationRequest {
            name: "Amoxicillin".into(),
            dose: "500 mg".into(),
            amount: 21,
            unit: "capsule".into(),
            continuous_use: false,
            start_date: "2024-06-01T08:00:00Z".parse().unwrap(),
            end_date: None,
        }
    }

    #[test]
    fn create_then_list_returns_the_record() {
        let mut conn = open_memory_database().unwrap();
        let user = seed_user(&conn, "Ana");

        let created =
            create::<ConsultationStore>(&mut conn, &user, consultation_request()).unwrap();
        assert!(!created.is_completed);

        let page =
            list::<ConsultationStore>(&conn, &user, false, PageRequest::default()).unwrap();
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.items[0].id, created.id);
        assert_eq!(page.items[0].doctor_name, "Dr. A");
        assert_eq!(page.items[0].local, "Clinic");
        assert_eq!(page.items[0].description, "checkup");
    }

    #[test]
    fn list_is_isolated_per_owner() {
        let mut conn = open_memory_database().unwrap();
        let ana = seed_user(&conn, "Ana");
        let bob = seed_user(&conn, "Bob");

        create::<ConsultationStore>(&mut conn, &ana, consultation_request()).unwrap();

        let mine = list::<ConsultationStore>(&conn, &ana, false, PageRequest::default()).unwrap();
        assert_eq!(mine.total_elements, 1);
        let theirs =
            list::<ConsultationStore>(&conn, &bob, false, PageRequest::default()).unwrap();
        assert_eq!(theirs.total_elements, 0);
    }

    #[test]
    fn every_mutation_writes_exactly_one_event() {
        let mut conn = open_memory_database().unwrap();
        let user = seed_user(&conn, "Ana");

        let created =
            create::<ConsultationStore>(&mut conn, &user, consultation_request()).unwrap();
        let id = created.id.to_string();

        update::<ConsultationStore>(&mut conn, &user, &id, consultation_request()).unwrap();
        toggle_complete::<ConsultationStore>(&mut conn, &user, &id).unwrap();
        soft_delete::<ConsultationStore>(&mut conn, &user, &id).unwrap();

        let events = events_for_entity(&conn, &created.id).unwrap();
        let actions: Vec<_> = events.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                EventLogAction::Created,
                EventLogAction::Updated,
                EventLogAction::Updated,
                EventLogAction::Deleted,
            ]
        );
        assert!(events.iter().all(|e| e.user_id == user.id));
        assert!(events
            .iter()
            .all(|e| e.entity_kind == EntityKind::Consultation));
    }

    #[test]
    fn toggle_complete_is_an_involution() {
        let mut conn = open_memory_database().unwrap();
        let user = seed_user(&conn, "Ana");
        let created =
            create::<ConsultationStore>(&mut conn, &user, consultation_request()).unwrap();
        let id = created.id.to_string();

        let once = toggle_complete::<ConsultationStore>(&mut conn, &user, &id).unwrap();
        assert!(once.is_completed);
        let twice = toggle_complete::<ConsultationStore>(&mut conn, &user, &id).unwrap();
        assert!(!twice.is_completed);
    }

    #[test]
    fn deleted_records_behave_as_missing() {
        let mut conn = open_memory_database().unwrap();
        let user = seed_user(&conn, "Ana");
        let created =
            create::<ConsultationStore>(&mut conn, &user, consultation_request()).unwrap();
        let id = created.id.to_string();

        soft_delete::<ConsultationStore>(&mut conn, &user, &id).unwrap();

        let err =
            update::<ConsultationStore>(&mut conn, &user, &id, consultation_request())
                .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(_)));
        let err = toggle_complete::<ConsultationStore>(&mut conn, &user, &id).unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(_)));
        let err = soft_delete::<ConsultationStore>(&mut conn, &user, &id).unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(_)));

        let page =
            list::<ConsultationStore>(&conn, &user, false, PageRequest::default()).unwrap();
        assert_eq!(page.total_elements, 0);
    }

    #[test]
    fn update_by_another_user_mutates_and_audits_nothing() {
        let mut conn = open_memory_database().unwrap();
        let ana = seed_user(&conn, "Ana");
        let bob = seed_user(&conn, "Bob");
        let created =
            create::<ConsultationStore>(&mut conn, &ana, consultation_request()).unwrap();
        let id = created.id.to_string();

        let mut tampered = consultation_request();
        tampered.doctor_name = "Dr. Mallory".into();
        let err = update::<ConsultationStore>(&mut conn, &bob, &id, tampered).unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(_)));

        // Row unchanged, and only the original create event exists.
        let found = crate::db::repository::consultation::find_owned_consultation(
            &conn, &created.id, &ana.id,
        )
        .unwrap()
        .unwrap();
        assert_eq!(found.doctor_name, "Dr. A");
        let events = events_for_entity(&conn, &created.id).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, EventLogAction::Created);
    }

    #[test]
    fn malformed_id_is_rejected_before_touching_the_db() {
        let mut conn = open_memory_database().unwrap();
        let user = seed_user(&conn, "Ana");

        let err = soft_delete::<ConsultationStore>(&mut conn, &user, "not-a-uuid").unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidIdentifier));
    }

    #[test]
    fn exam_create_requires_all_fields() {
        let mut conn = open_memory_database().unwrap();
        let user = seed_user(&conn, "Ana");

        let mut incomplete = exam_request("Blood panel");
        incomplete.local = None;
        let err = create::<ExamStore>(&mut conn, &user, incomplete).unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));

        // Nothing was persisted
        let page = list::<ExamStore>(&conn, &user, false, PageRequest::default()).unwrap();
        assert_eq!(page.total_elements, 0);
    }

    #[test]
    fn duplicate_exam_writes_nothing() {
        let mut conn = open_memory_database().unwrap();
        let user = seed_user(&conn, "Ana");

        let first = create::<ExamStore>(&mut conn, &user, exam_request("Blood panel")).unwrap();
        let err =
            create::<ExamStore>(&mut conn, &user, exam_request("Blood panel")).unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));

        let page = list::<ExamStore>(&conn, &user, false, PageRequest::default()).unwrap();
        assert_eq!(page.total_elements, 1);
        // Only the first create was audited
        let events = events_for_entity(&conn, &first.id).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn deleting_an_exam_frees_its_name_and_date() {
        let mut conn = open_memory_database().unwrap();
        let user = seed_user(&conn, "Ana");

        let first = create::<ExamStore>(&mut conn, &user, exam_request("Blood panel")).unwrap();
        soft_delete::<ExamStore>(&mut conn, &user, &first.id.to_string()).unwrap();
        assert!(create::<ExamStore>(&mut conn, &user, exam_request("Blood panel")).is_ok());
    }

    #[test]
    fn medication_lifecycle_matches_the_shared_shape() {
        let mut conn = open_memory_database().unwrap();
        let user = seed_user(&conn, "Ana");

        let created =
            create::<MedicationStore>(&mut conn, &user, medication_request()).unwrap();
        let id = created.id.to_string();

        let mut renamed = medication_request();
        renamed.name = "Ibuprofen".into();
        let updated = update::<MedicationStore>(&mut conn, &user, &id, renamed).unwrap();
        assert_eq!(updated.name, "Ibuprofen");

        toggle_complete::<MedicationStore>(&mut conn, &user, &id).unwrap();
        let done = list::<MedicationStore>(&conn, &user, true, PageRequest::default()).unwrap();
        assert_eq!(done.total_elements, 1);

        soft_delete::<MedicationStore>(&mut conn, &user, &id).unwrap();
        let events = events_for_entity(&conn, &created.id).unwrap();
        assert_eq!(events.len(), 4);
    }

    // The end-to-end walk from the product scenario: register a
    // consultation, see it listed, delete it, see an empty list.
    #[test]
    fn consultation_register_list_delete_walkthrough() {
        let mut conn = open_memory_database().unwrap();
        let user = seed_user(&conn, "Ana");

        create::<ConsultationStore>(&mut conn, &user, consultation_request()).unwrap();

        let page = list::<ConsultationStore>(&conn, &user, false, PageRequest::new(0, 9)).unwrap();
        assert_eq!(page.items.len(), 1);
        let entry = &page.items[0];
        assert_eq!(entry.date, "2024-06-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(entry.doctor_name, "Dr. A");
        assert_eq!(entry.local, "Clinic");
        assert_eq!(entry.description, "checkup");
        assert!(!entry.is_completed);

        soft_delete::<ConsultationStore>(&mut conn, &user, &entry.id.to_string()).unwrap();
        let page =
            list::<ConsultationStore>(&conn, &user, false, PageRequest::new(0, 9)).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_elements, 0);
    }
}
