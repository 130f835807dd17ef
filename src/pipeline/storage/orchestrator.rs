use std::path::Path;

use super::chunker::CarePlanChunker;
use crate::db::DocumentStore;
use crate::models::NewDocumentChunk;
use crate::pipeline::extraction::DocumentLoader;
use crate::pipeline::PipelineError;

/// Load a stored PDF, chunk each page and persist the chunks for Q&A.
/// Returns the number of chunks stored.
pub fn ingest_document_chunks(
    path: &Path,
    filename: &str,
    loader: &dyn DocumentLoader,
    store: &dyn DocumentStore,
) -> Result<usize, PipelineError> {
    let pages = loader.load(path)?;
    if pages.is_empty() {
        return Err(PipelineError::NoContent);
    }

    let chunker = CarePlanChunker::new();
    let mut rows = Vec::new();
    for page in &pages {
        for chunk in chunker.chunk(&page.text) {
            rows.push(NewDocumentChunk {
                filename: filename.to_string(),
                page_label: Some(page.page_label.clone()),
                chunk_index: rows.len() as i64,
                content: chunk.content,
            });
        }
    }
    if rows.is_empty() {
        return Err(PipelineError::NoContent);
    }

    let stored = store.insert_chunks(&rows)?;
    tracing::info!(filename, pages = pages.len(), chunks = stored, "Ingested document chunks");
    Ok(stored)
}
