//! API router.
//!
//! Returns a composable `Router` with every route nested under `/api/v1`.
//!
//! Middleware stack on protected routes (outermost → innermost):
//! Extension(ApiContext) → Auth validator → Audit logger → Handler

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(ctx: ApiContext) -> Router {
    let body_limit = ctx.max_upload_bytes;

    let protected = Router::new()
        .route("/t12", post(endpoints::documents::parse_t12))
        .route("/rent", post(endpoints::documents::parse_rent_roll))
        .route("/deal", post(endpoints::deals::evaluate))
        .with_state(ctx.clone())
        // Middleware stack (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx));

    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .layer(axum::middleware::from_fn(middleware::audit::log_access));

    Router::new()
        .nest("/api/v1", protected.merge(unprotected))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
}
