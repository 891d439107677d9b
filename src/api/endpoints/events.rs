//! Event history endpoint — the caller's audit trail, newest first.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Extension;

use crate::api::error::ApiError;
use crate::api::types::{paged_reply, ApiContext, ListQuery};
use crate::event_log::{self, EventLogResponse};
use crate::models::User;

/// `GET /events` — paginated event history for the caller.
/// The `completed` query parameter is ignored here; events have no
/// completion state.
pub async fn history(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let conn = ctx.db.open()?;
    let page = event_log::history(&conn, &user, query.page_request())?;
    Ok(paged_reply(
        StatusCode::ACCEPTED,
        "Displaying event history.",
        page.map(EventLogResponse::from),
    ))
}
