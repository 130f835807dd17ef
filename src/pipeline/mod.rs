pub mod extraction;
pub mod llm;
pub mod postcall;
pub mod rag;
pub mod recovery;
pub mod storage;
pub mod structuring;

use thiserror::Error;

use crate::db::DatabaseError;
use extraction::DocumentError;
use llm::LlmError;

/// Failures of the ingestion and Q&A pipelines. Post-call processing
/// folds these into a degraded report instead of returning them.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] LlmError),

    #[error("Model output is not valid JSON of the expected shape: {0}")]
    MalformedModelOutput(String),

    #[error("No events could be extracted from the document")]
    NoEventsExtracted,

    #[error("Document contains no extractable text")]
    NoContent,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] DatabaseError),

    #[error("Document error: {0}")]
    Document(DocumentError),
}

impl From<DocumentError> for PipelineError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotFound(path) => Self::NotFound(path.display().to_string()),
            other => Self::Document(other),
        }
    }
}
