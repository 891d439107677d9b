pub mod consultation;
pub mod event_log;
pub mod exam;
pub mod medication;
pub mod user;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::DatabaseError;

/// Parse a TEXT uuid column.
pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

/// Parse an RFC 3339 TEXT timestamp column.
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

pub(crate) fn parse_optional_timestamp(
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    value.as_deref().map(parse_timestamp).transpose()
}
