//! API router.
//!
//! All entity routes require bearer token authentication; `/health` is
//! open. Middleware uses `Extension<ApiContext>` (injected as the
//! outermost layer) while endpoint handlers use `State<ApiContext>`
//! (provided via `with_state`).
//!
//! NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).

use axum::routing::{get, patch, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the full router with middleware stack.
pub fn api_router(ctx: ApiContext) -> Router {
    let protected = Router::new()
        .route(
            "/medication",
            get(endpoints::medications::list).post(endpoints::medications::create),
        )
        .route(
            "/medication/:id",
            put(endpoints::medications::update).delete(endpoints::medications::remove),
        )
        .route(
            "/medication/:id/complete",
            patch(endpoints::medications::toggle_complete),
        )
        .route(
            "/consultation",
            get(endpoints::consultations::list).post(endpoints::consultations::create),
        )
        .route(
            "/consultation/:id",
            put(endpoints::consultations::update).delete(endpoints::consultations::remove),
        )
        .route(
            "/consultation/:id/complete",
            patch(endpoints::consultations::toggle_complete),
        )
        .route(
            "/exam",
            get(endpoints::exams::list).post(endpoints::exams::create),
        )
        .route(
            "/exam/:id",
            put(endpoints::exams::update).delete(endpoints::exams::remove),
        )
        .route(
            "/exam/:id/complete",
            patch(endpoints::exams::toggle_complete),
        )
        .route("/events", get(endpoints::events::history))
        .with_state(ctx.clone())
        // Middleware stack (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx));

    let unprotected = Router::new().route("/health", get(endpoints::health::check));

    Router::new()
        .merge(protected)
        .merge(unprotected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
