//! Storage of uploaded care-plan PDFs.
//!
//! Uploads are written flat into the configured upload directory under
//! their sanitized file name. Later pipeline requests refer to them by
//! that name only.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Only PDF files are allowed.")]
    NotPdf,

    #[error("Invalid file name: {0}")]
    InvalidFilename(String),

    #[error("Uploaded file is empty")]
    Empty,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// File-name component of a client-supplied name. Rejects empty names,
/// directory parts and hidden files.
pub fn sanitize_filename(raw: &str) -> Result<String, UploadError> {
    let trimmed = raw.trim();
    let name = Path::new(trimmed)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| UploadError::InvalidFilename(raw.to_string()))?;

    if name != trimmed || name.starts_with('.') || name.contains('\\') {
        return Err(UploadError::InvalidFilename(raw.to_string()));
    }
    Ok(name.to_string())
}

/// Case-insensitive `.pdf` extension check.
pub fn is_pdf_filename(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Validate and write an uploaded PDF. Returns the stored file name.
pub fn save_uploaded_pdf(upload_dir: &Path, filename: &str, bytes: &[u8]) -> Result<String, UploadError> {
    if !is_pdf_filename(filename) {
        return Err(UploadError::NotPdf);
    }
    let name = sanitize_filename(filename)?;
    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }

    std::fs::create_dir_all(upload_dir)?;
    let path = upload_dir.join(&name);
    std::fs::write(&path, bytes)?;
    tracing::info!(filename = %name, bytes = bytes.len(), "Stored uploaded PDF");
    Ok(name)
}

/// Path of a previously uploaded file. Existence is checked by the loader.
pub fn resolve_upload_path(upload_dir: &Path, filename: &str) -> Result<PathBuf, UploadError> {
    let name = sanitize_filename(filename)?;
    Ok(upload_dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_extension_is_case_insensitive() {
        assert!(is_pdf_filename("plan.pdf"));
        assert!(is_pdf_filename("PLAN.PDF"));
        assert!(!is_pdf_filename("plan.txt"));
        assert!(!is_pdf_filename("pdf"));
        assert!(!is_pdf_filename("plan.pdf.exe"));
    }

    #[test]
    fn traversal_names_are_rejected() {
        for bad in ["../etc/passwd.pdf", "a/b.pdf", "", "..", ".hidden.pdf", "a\\b.pdf"] {
            assert!(
                matches!(sanitize_filename(bad), Err(UploadError::InvalidFilename(_))),
                "accepted {bad:?}"
            );
        }
        assert_eq!(sanitize_filename(" care plan.pdf ").unwrap(), "care plan.pdf");
    }

    #[test]
    fn save_creates_directory_and_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().join("uploaded_pdfs");

        let name = save_uploaded_pdf(&upload_dir, "plan.pdf", b"%PDF-1.4").unwrap();
        assert_eq!(name, "plan.pdf");
        assert_eq!(std::fs::read(upload_dir.join("plan.pdf")).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn non_pdf_is_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().join("uploads");

        let result = save_uploaded_pdf(&upload_dir, "notes.txt", b"hello");
        assert!(matches!(result, Err(UploadError::NotPdf)));
        assert!(!upload_dir.exists());
    }

    #[test]
    fn empty_upload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = save_uploaded_pdf(dir.path(), "plan.pdf", b"");
        assert!(matches!(result, Err(UploadError::Empty)));
    }

    #[test]
    fn resolve_joins_sanitized_name() {
        let dir = Path::new("/srv/uploads");
        assert_eq!(
            resolve_upload_path(dir, "plan.pdf").unwrap(),
            PathBuf::from("/srv/uploads/plan.pdf")
        );
        assert!(resolve_upload_path(dir, "../plan.pdf").is_err());
    }
}
