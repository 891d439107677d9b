//! Medication endpoints: paginated list, create, update, soft-delete,
//! and the completion toggle.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{paged_reply, reply, ApiContext, ListQuery};
use crate::lifecycle;
use crate::medications::{MedicationRequest, MedicationResponse, MedicationStore};
use crate::models::User;

/// `GET /medication` — the caller's medications, one page at a time.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let conn = ctx.db.open()?;
    let page =
        lifecycle::list::<MedicationStore>(&conn, &user, query.completed, query.page_request())?;
    Ok(paged_reply(
        StatusCode::ACCEPTED,
        "Displaying medications.",
        page.map(MedicationResponse::from),
    ))
}

/// `POST /medication` — register a medication for the caller.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Json(body): Json<MedicationRequest>,
) -> Result<Response, ApiError> {
    let mut conn = ctx.db.open()?;
    let med = lifecycle::create::<MedicationStore>(&mut conn, &user, body)?;
    Ok(reply(
        StatusCode::CREATED,
        "Medication registered successfully.",
        Some(MedicationResponse::from(med)),
    ))
}

/// `PUT /medication/:id` — overwrite a medication's fields.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    Json(body): Json<MedicationRequest>,
) -> Result<Response, ApiError> {
    let mut conn = ctx.db.open()?;
    let med = lifecycle::update::<MedicationStore>(&mut conn, &user, &id, body)?;
    Ok(reply(
        StatusCode::ACCEPTED,
        "Medication updated successfully.",
        Some(MedicationResponse::from(med)),
    ))
}

/// `DELETE /medication/:id` — soft-delete a medication.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let mut conn = ctx.db.open()?;
    lifecycle::soft_delete::<MedicationStore>(&mut conn, &user, &id)?;
    Ok(reply::<()>(
        StatusCode::ACCEPTED,
        "Medication removed successfully.",
        None,
    ))
}

/// `PATCH /medication/:id/complete` — flip the completion flag.
pub async fn toggle_complete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let mut conn = ctx.db.open()?;
    lifecycle::toggle_complete::<MedicationStore>(&mut conn, &user, &id)?;
    Ok(reply::<()>(
        StatusCode::ACCEPTED,
        "Medication status updated successfully.",
        None,
    ))
}
