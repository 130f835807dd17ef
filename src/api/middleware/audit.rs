//! Audit logging middleware.
//!
//! Logs every API request with method, path and response status.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::ApiContext;

/// Log API access for the audit trail.
/// Reads `ApiContext` from request extensions.
pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let ctx = req.extensions().get::<ApiContext>().cloned();

    let response = next.run(req).await;

    if let Some(ctx) = ctx {
        ctx.core
            .log_access(&format!("{method} {path}"), response.status().as_u16());
    }
    response
}
