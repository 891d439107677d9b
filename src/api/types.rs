//! Shared types for the HTTP layer: the request context, the uniform
//! response envelope, and bearer-token helpers.

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::{self, DatabaseError};
use crate::models::{Page, PageRequest, DEFAULT_PAGE_SIZE};

// ═══════════════════════════════════════════════════════════
// API context — shared state for the router
// ═══════════════════════════════════════════════════════════

/// Handle to the service database. Requests open a fresh connection
/// each; SQLite serializes writers at the file level.
#[derive(Debug)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn open(&self) -> Result<Connection, DatabaseError> {
        db::open_database(&self.path)
    }
}

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub db: Arc<Database>,
}

impl ApiContext {
    pub fn new(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }
}

// ═══════════════════════════════════════════════════════════
// Response envelope
// ═══════════════════════════════════════════════════════════

/// Uniform response body: `{status, message, data?}`. The `status`
/// field always repeats the HTTP status actually sent.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// List variant: `{status, message, data, totalPages, totalElements}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T: Serialize> {
    pub status: u16,
    pub message: String,
    pub data: Vec<T>,
    pub total_pages: u64,
    pub total_elements: u64,
}

/// Build a single-entity (or message-only) response.
pub fn reply<T: Serialize>(status: StatusCode, message: &str, data: Option<T>) -> Response {
    let body = Envelope {
        status: status.as_u16(),
        message: message.to_string(),
        data,
    };
    (status, Json(body)).into_response()
}

/// Build a paginated list response.
pub fn paged_reply<T: Serialize>(status: StatusCode, message: &str, page: Page<T>) -> Response {
    let body = PageEnvelope {
        status: status.as_u16(),
        message: message.to_string(),
        data: page.items,
        total_pages: page.total_pages,
        total_elements: page.total_elements,
    };
    (status, Json(body)).into_response()
}

// ═══════════════════════════════════════════════════════════
// Query parameters
// ═══════════════════════════════════════════════════════════

/// Pagination + completion-filter query string shared by the list
/// endpoints: `?page=0&size=9&completed=false`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: u32,
    pub size: Option<u32>,
    #[serde(default)]
    pub completed: bool,
}

impl ListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.size.unwrap_or(DEFAULT_PAGE_SIZE))
    }
}

// ═══════════════════════════════════════════════════════════
// Bearer tokens
// ═══════════════════════════════════════════════════════════

/// Hash a bearer token string using SHA-256, base64-encoded for
/// storage in `users.token_hash`.
pub fn hash_token(token: &str) -> String {
    use base64::Engine;
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_and_token_sensitive() {
        let token = generate_token();
        assert_eq!(hash_token(&token), hash_token(&token));
        assert_ne!(hash_token(&token), hash_token("other"));
    }

    #[test]
    fn generated_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn list_query_defaults() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();
        let page = query.page_request();
        assert_eq!(page.page, 0);
        assert_eq!(page.size, DEFAULT_PAGE_SIZE);
        assert!(!query.completed);
    }

    #[test]
    fn envelope_omits_missing_data() {
        let body = Envelope::<()> {
            status: 404,
            message: "Exam not found.".into(),
            data: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["status"], 404);
    }
}
