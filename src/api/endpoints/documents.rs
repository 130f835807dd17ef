//! Care-plan document endpoints: upload, chunk ingestion, event
//! initialization and the bulk clear.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::storage::ingest_document_chunks;
use crate::pipeline::structuring::initialize_events_from_pdf;
use crate::uploads::{is_pdf_filename, save_uploaded_pdf, UploadError};

/// Multipart field carrying the PDF.
const FILE_FIELD: &str = "file";

#[derive(Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct IngestResponse {
    pub filename: String,
    pub chunks_stored: usize,
}

#[derive(Serialize)]
pub struct InitializeEventsResponse {
    pub events_inserted: usize,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// `POST /upload-pdf`: store a care-plan PDF for later processing.
///
/// The extension is checked as soon as the field header arrives, before the
/// body is read or anything is written.
pub async fn upload(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if !is_pdf_filename(&filename) {
            return Err(UploadError::NotPdf.into());
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Could not read upload: {e}")))?;

        let upload_dir = ctx.core.settings.upload_dir.clone();
        let stored = tokio::task::spawn_blocking(move || {
            save_uploaded_pdf(&upload_dir, &filename, &bytes)
        })
        .await??;

        return Ok(Json(UploadResponse {
            filename: stored,
            message: "Upload successful!",
        }));
    }

    Err(ApiError::BadRequest(format!(
        "Missing multipart field '{FILE_FIELD}'"
    )))
}

/// `POST /ingest-pdf/:filename`: chunk an uploaded PDF for Q&A.
pub async fn ingest(
    State(ctx): State<ApiContext>,
    Path(filename): Path<String>,
) -> Result<Json<IngestResponse>, ApiError> {
    let path = ctx.core.upload_path(&filename)?;
    let core = ctx.core.clone();
    let name = filename.clone();

    let chunks_stored = tokio::task::spawn_blocking(move || {
        ingest_document_chunks(&path, &name, core.loader.as_ref(), core.documents.as_ref())
    })
    .await??;

    Ok(Json(IngestResponse {
        filename,
        chunks_stored,
    }))
}

/// `POST /initialize-events/:filename`: extract care-plan events from an
/// uploaded PDF and store them as pending.
pub async fn initialize_events(
    State(ctx): State<ApiContext>,
    Path(filename): Path<String>,
) -> Result<Json<InitializeEventsResponse>, ApiError> {
    let path = ctx.core.upload_path(&filename)?;
    let core = ctx.core.clone();

    let events_inserted = tokio::task::spawn_blocking(move || {
        let extractor = core.event_extractor();
        initialize_events_from_pdf(&path, core.loader.as_ref(), &extractor, core.events.as_ref())
    })
    .await??;

    tracing::info!(filename, events_inserted, "Initialized events from care plan");
    Ok(Json(InitializeEventsResponse { events_inserted }))
}

/// `POST /clear-db`: remove all events and document chunks.
pub async fn clear_db(State(ctx): State<ApiContext>) -> Result<Json<MessageResponse>, ApiError> {
    let core = ctx.core.clone();
    tokio::task::spawn_blocking(move || -> Result<(), ApiError> {
        core.events.clear_all()?;
        core.documents.clear_chunks()?;
        Ok(())
    })
    .await??;

    tracing::warn!("Cleared events and document chunks");
    Ok(Json(MessageResponse {
        message: "Database cleared successfully",
    }))
}
