//! Consultation endpoints: paginated list, create, update, soft-delete,
//! and the completion toggle.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{paged_reply, reply, ApiContext, ListQuery};
use crate::consultations::{ConsultationRequest, ConsultationResponse, ConsultationStore};
use crate::lifecycle;
use crate::models::User;

/// `GET /consultation` — the caller's consultations, one page at a time.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let conn = ctx.db.open()?;
    let page = lifecycle::list::<ConsultationStore>(
        &conn,
        &user,
        query.completed,
        query.page_request(),
    )?;
    Ok(paged_reply(
        StatusCode::ACCEPTED,
        "Displaying consultations.",
        page.map(ConsultationResponse::from),
    ))
}

/// `POST /consultation` — schedule a consultation for the caller.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Json(body): Json<ConsultationRequest>,
) -> Result<Response, ApiError> {
    let mut conn = ctx.db.open()?;
    let consultation = lifecycle::create::<ConsultationStore>(&mut conn, &user, body)?;
    Ok(reply(
        StatusCode::CREATED,
        "Consultation scheduled successfully.",
        Some(ConsultationResponse::from(consultation)),
    ))
}

/// `PUT /consultation/:id` — overwrite a consultation's fields.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    Json(body): Json<ConsultationRequest>,
) -> Result<Response, ApiError> {
    let mut conn = ctx.db.open()?;
    let consultation = lifecycle::update::<ConsultationStore>(&mut conn, &user, &id, body)?;
    Ok(reply(
        StatusCode::ACCEPTED,
        "Consultation updated successfully.",
        Some(ConsultationResponse::from(consultation)),
    ))
}

/// `DELETE /consultation/:id` — soft-delete a consultation.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let mut conn = ctx.db.open()?;
    lifecycle::soft_delete::<ConsultationStore>(&mut conn, &user, &id)?;
    Ok(reply::<()>(
        StatusCode::ACCEPTED,
        "Consultation removed successfully.",
        None,
    ))
}

/// `PATCH /consultation/:id/complete` — flip the completion flag.
pub async fn toggle_complete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let mut conn = ctx.db.open()?;
    lifecycle::toggle_complete::<ConsultationStore>(&mut conn, &user, &id)?;
    Ok(reply::<()>(
        StatusCode::ACCEPTED,
        "Consultation status updated successfully.",
        None,
    ))
}
