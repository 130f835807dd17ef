use std::path::Path;

use super::{DocumentError, DocumentLoader, DocumentPage};

/// PDF loader using the pdf-extract crate.
/// Handles digital PDFs with embedded text layers.
pub struct PdfDocumentLoader;

impl PdfDocumentLoader {
    pub fn pages_from_bytes(&self, pdf_bytes: &[u8]) -> Result<Vec<DocumentPage>, DocumentError> {
        let page_texts = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| DocumentError::PdfParsing(e.to_string()))?;

        Ok(page_texts
            .into_iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(i, text)| DocumentPage {
                text: text.trim().to_string(),
                page_label: format!("Page {}", i + 1),
            })
            .collect())
    }
}

impl DocumentLoader for PdfDocumentLoader {
    fn load(&self, path: &Path) -> Result<Vec<DocumentPage>, DocumentError> {
        if !path.is_file() {
            return Err(DocumentError::NotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        let pages = self.pages_from_bytes(&bytes)?;
        tracing::debug!(path = %path.display(), pages = pages.len(), "Loaded PDF text");
        Ok(pages)
    }
}

/// Builds a real PDF with one text line per page, for tests.
#[cfg(test)]
pub(crate) fn make_test_pdf(pages: &[&str]) -> Vec<u8> {
    use lopdf::dictionary;
    use lopdf::{Document, Object, Stream};

    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = format!("BT /F1 12 Tf 72 700 Td ({text}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}
