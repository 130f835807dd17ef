//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use super::middleware::signature::SignatureError;
use crate::db::DatabaseError;
use crate::pipeline::extraction::DocumentError;
use crate::pipeline::PipelineError;
use crate::uploads::UploadError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid webhook signature")]
    InvalidSignature,
    #[error("Webhook secret not configured")]
    WebhookNotConfigured,
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                detail.clone(),
            ),
            ApiError::NotFound(detail) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                detail.clone(),
            ),
            ApiError::InvalidSignature => (
                StatusCode::UNAUTHORIZED,
                "INVALID_SIGNATURE",
                "Invalid webhook signature".to_string(),
            ),
            ApiError::WebhookNotConfigured => {
                tracing::error!("Webhook delivery rejected: ELEVENLABS_WEBHOOK_SECRET is not set");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "WEBHOOK_NOT_CONFIGURED",
                    "Webhook secret is not configured".to_string(),
                )
            }
            ApiError::ExtractionFailed(detail) => {
                tracing::error!(detail, "LLM extraction failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXTRACTION_FAILED",
                    "The language model request failed".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{entity_type} {id} not found"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Extraction(e) => ApiError::ExtractionFailed(e.to_string()),
            PipelineError::MalformedModelOutput(preview) => {
                ApiError::BadRequest(format!("Model output could not be parsed: {preview}"))
            }
            PipelineError::NoEventsExtracted => {
                ApiError::BadRequest("No events extracted from the document.".into())
            }
            PipelineError::NoContent => ApiError::BadRequest("No content extracted from PDF.".into()),
            PipelineError::NotFound(path) => {
                tracing::debug!(path, "Uploaded file missing");
                ApiError::NotFound("Uploaded PDF file not found".into())
            }
            PipelineError::Store(e) => ApiError::from(e),
            PipelineError::Document(DocumentError::PdfParsing(e)) => {
                ApiError::BadRequest(format!("Could not read PDF: {e}"))
            }
            PipelineError::Document(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Io(e) => ApiError::Internal(e.to_string()),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<SignatureError> for ApiError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::SecretNotConfigured => ApiError::WebhookNotConfigured,
            other => {
                tracing::warn!(reason = %other, "Rejected webhook delivery");
                ApiError::InvalidSignature
            }
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("worker task failed: {err}"))
    }
}
