//! API error types, mapped onto the uniform response envelope.
//!
//! The service layer reports domain failures as `LifecycleError`; only
//! this boundary decides the transport status. Internal details are
//! logged, never sent to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::api::types::reply;
use crate::db::DatabaseError;
use crate::lifecycle::LifecycleError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required.".to_string(),
            ),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred.".to_string(),
                )
            }
        };
        reply::<()>(status, &message, None)
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::InvalidIdentifier => ApiError::BadRequest(err.to_string()),
            LifecycleError::Validation(message) => ApiError::BadRequest(message),
            // One policy for absent, soft-deleted and foreign-owned rows:
            // a plain 404, no existence leak.
            LifecycleError::NotFound(_) => ApiError::NotFound(err.to_string()),
            LifecycleError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
