//! Text extraction for uploaded job descriptions and CVs.
//!
//! PDFs are read straight from the in-memory buffer, page by page, and the page
//! texts are joined with newlines in document order. No OCR, no layout analysis.

use std::panic::{self, AssertUnwindSafe};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Picks the document kind from the upload's file extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)?;

        match extension.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "txt" => Some(DocumentKind::PlainText),
            _ => None,
        }
    }
}

pub fn extract_text(bytes: &[u8], kind: DocumentKind) -> Result<String, AppError> {
    match kind {
        DocumentKind::Pdf => extract_pdf_text(bytes),
        DocumentKind::PlainText => decode_text(bytes),
    }
}

fn extract_pdf_text(bytes: &[u8]) -> Result<String, AppError> {
    // pdf-extract panics on some malformed documents instead of returning an error.
    let pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }))
    .map_err(|_| AppError::InputFormat("The PDF could not be parsed".to_string()))?
    .map_err(|e| AppError::InputFormat(format!("Unable to read PDF: {e}")))?;

    Ok(pages.join("\n"))
}

fn decode_text(bytes: &[u8]) -> Result<String, AppError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| AppError::InputFormat(format!("Text file is not valid UTF-8: {e}")))
}
