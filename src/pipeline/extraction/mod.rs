pub mod pdf;

pub use pdf::*;

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document not found: {0}")]
    NotFound(PathBuf),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),
}

/// Text of one page, with a human-readable label ("Page 3").
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPage {
    pub text: String,
    pub page_label: String,
}

/// Turns a stored document into page texts. Pages without text are skipped.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Vec<DocumentPage>, DocumentError>;
}

/// Full document text, pages separated by a blank line.
pub fn join_pages(pages: &[DocumentPage]) -> String {
    pages
        .iter()
        .map(|page| page.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_pages_uses_blank_line_separator() {
        let pages = vec![
            DocumentPage {
                text: "Day 1".into(),
                page_label: "Page 1".into(),
            },
            DocumentPage {
                text: "Day 2".into(),
                page_label: "Page 2".into(),
            },
        ];
        assert_eq!(join_pages(&pages), "Day 1\n\nDay 2");
        assert_eq!(join_pages(&[]), "");
    }
}
