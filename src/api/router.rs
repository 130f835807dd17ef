//! HTTP router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::endpoints;
use super::middleware;
use super::types::ApiContext;
use crate::core_state::CoreState;

/// Build the CareFlow API router.
///
/// Middleware reads `Extension<ApiContext>` (injected outside the audit layer).
pub fn careflow_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);
    let body_limit = ctx.core.settings.max_upload_bytes;

    // Signature is checked on the raw body before the handler parses it.
    // `route_layer` keeps the check off the merged 404/405 fallbacks.
    let webhook = Router::new()
        .route("/postcall", post(endpoints::voice::postcall))
        .with_state(ctx.clone())
        .route_layer(axum::middleware::from_fn(
            middleware::signature::require_signature,
        ));

    Router::new()
        .route("/", get(endpoints::health::root))
        .route("/health", get(endpoints::health::check))
        .route("/upload-pdf", post(endpoints::documents::upload))
        .route("/ingest-pdf/:filename", post(endpoints::documents::ingest))
        .route(
            "/initialize-events/:filename",
            post(endpoints::documents::initialize_events),
        )
        .route("/clear-db", post(endpoints::documents::clear_db))
        .route("/get-events", get(endpoints::events::list))
        .route("/update-event-status", post(endpoints::events::update_status))
        .route("/call-logs", get(endpoints::events::call_logs))
        .route("/oncall", post(endpoints::voice::oncall))
        .route("/query", get(endpoints::voice::query))
        .route("/query/", get(endpoints::voice::query))
        .with_state(ctx.clone())
        .merge(webhook)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::Extension(ctx))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
