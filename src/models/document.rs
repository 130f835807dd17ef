use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A retrievable slice of an ingested care-plan document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: Uuid,
    pub filename: String,
    pub page_label: Option<String>,
    pub chunk_index: i64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocumentChunk {
    pub filename: String,
    pub page_label: Option<String>,
    pub chunk_index: i64,
    pub content: String,
}

impl NewDocumentChunk {
    pub fn into_chunk(self, id: Uuid) -> DocumentChunk {
        DocumentChunk {
            id,
            filename: self.filename,
            page_label: self.page_label,
            chunk_index: self.chunk_index,
            content: self.content,
        }
    }
}
