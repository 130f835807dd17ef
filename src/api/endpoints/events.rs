//! Event tracking and call-log endpoints.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{CallLog, Event, EventStatus};

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub id: String,
    pub status: String,
}

#[derive(Serialize)]
pub struct UpdateStatusResponse {
    pub id: Uuid,
    pub status: EventStatus,
}

#[derive(Deserialize)]
pub struct CallLogQuery {
    pub patient_id: Option<String>,
}

/// `GET /get-events`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Event>>, ApiError> {
    let core = ctx.core.clone();
    let events = tokio::task::spawn_blocking(move || core.events.list_events()).await??;
    Ok(Json(events))
}

/// `POST /update-event-status`: manual status change from the dashboard.
///
/// Rejects unknown statuses and statuses the event's type does not allow.
pub async fn update_status(
    State(ctx): State<ApiContext>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, ApiError> {
    let id = Uuid::parse_str(request.id.trim())
        .map_err(|_| ApiError::BadRequest(format!("Invalid event id: {}", request.id)))?;
    let status: EventStatus = request
        .status
        .trim()
        .to_lowercase()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid status: {}", request.status)))?;

    let core = ctx.core.clone();
    tokio::task::spawn_blocking(move || -> Result<(), ApiError> {
        let event = core
            .events
            .get_event(&id)?
            .ok_or_else(|| ApiError::NotFound(format!("Event {id} not found")))?;
        if !status.is_valid_for(event.event_type) {
            return Err(ApiError::BadRequest(format!(
                "Status '{status}' is not valid for {} events",
                event.event_type
            )));
        }
        core.events.update_status(&id, status)?;
        Ok(())
    })
    .await??;

    tracing::info!(event_id = %id, status = %status, "Event status updated");
    Ok(Json(UpdateStatusResponse { id, status }))
}

/// `GET /call-logs?patient_id=`: newest first.
pub async fn call_logs(
    State(ctx): State<ApiContext>,
    Query(query): Query<CallLogQuery>,
) -> Result<Json<Vec<CallLog>>, ApiError> {
    let core = ctx.core.clone();
    let patient_id = query.patient_id.filter(|p| !p.trim().is_empty());
    let logs = tokio::task::spawn_blocking(move || {
        core.call_logs.list_call_logs(patient_id.as_deref())
    })
    .await??;
    Ok(Json(logs))
}
