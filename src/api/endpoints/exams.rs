//! Exam endpoints: paginated list, create (with required-field and
//! duplicate validation), update, soft-delete, and the completion
//! toggle.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{paged_reply, reply, ApiContext, ListQuery};
use crate::exams::{ExamRequest, ExamResponse, ExamStore};
use crate::lifecycle;
use crate::models::User;

/// `GET /exam` — the caller's exams, one page at a time.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let conn = ctx.db.open()?;
    let page = lifecycle::list::<ExamStore>(&conn, &user, query.completed, query.page_request())?;
    Ok(paged_reply(
        StatusCode::ACCEPTED,
        "Displaying exams.",
        page.map(ExamResponse::from),
    ))
}

/// `POST /exam` — register an exam for the caller.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Json(body): Json<ExamRequest>,
) -> Result<Response, ApiError> {
    let mut conn = ctx.db.open()?;
    let exam = lifecycle::create::<ExamStore>(&mut conn, &user, body)?;
    Ok(reply(
        StatusCode::CREATED,
        "Exam registered successfully.",
        Some(ExamResponse::from(exam)),
    ))
}

/// `PUT /exam/:id` — overwrite an exam's fields.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    Json(body): Json<ExamRequest>,
) -> Result<Response, ApiError> {
    let mut conn = ctx.db.open()?;
    let exam = lifecycle::update::<ExamStore>(&mut conn, &user, &id, body)?;
    Ok(reply(
        StatusCode::ACCEPTED,
        "Exam updated successfully.",
        Some(ExamResponse::from(exam)),
    ))
}

/// `DELETE /exam/:id` — soft-delete an exam.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let mut conn = ctx.db.open()?;
    lifecycle::soft_delete::<ExamStore>(&mut conn, &user, &id)?;
    Ok(reply::<()>(
        StatusCode::ACCEPTED,
        "Exam removed successfully.",
        None,
    ))
}

/// `PATCH /exam/:id/complete` — flip the completion flag.
pub async fn toggle_complete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let mut conn = ctx.db.open()?;
    lifecycle::toggle_complete::<ExamStore>(&mut conn, &user, &id)?;
    Ok(reply::<()>(
        StatusCode::ACCEPTED,
        "Exam status updated successfully.",
        None,
    ))
}
