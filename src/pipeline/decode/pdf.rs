use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use super::DecodeError;

/// Text-layer access to a PDF document.
pub trait PdfExtractor {
    /// Extract the text of every page, in page order.
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, DecodeError>;

    /// Number of pages in the document. Fails for unreadable or encrypted files.
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, DecodeError>;
}

/// PDF extractor backed by pdf-extract for text and lopdf for structure.
/// Only digital PDFs with an embedded text layer produce text.
pub struct PdfTextExtractor;

impl PdfExtractor for PdfTextExtractor {
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, DecodeError> {
        // pdf-extract panics on some malformed streams instead of returning an error.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
        }));

        match outcome {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(e)) => Err(DecodeError::Pdf(e.to_string())),
            Err(_) => Err(DecodeError::Pdf("decoder aborted on malformed content".into())),
        }
    }

    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, DecodeError> {
        let doc = lopdf::Document::load_mem(pdf_bytes)
            .map_err(|e| DecodeError::Pdf(e.to_string()))?;
        if doc.is_encrypted() {
            return Err(DecodeError::Pdf("document is encrypted".into()));
        }
        Ok(doc.get_pages().len())
    }
}

/// Read a PDF file and return its text, pages separated by a blank line.
pub fn read_text(path: &Path) -> Result<String, DecodeError> {
    let bytes = std::fs::read(path)?;
    let pages = PdfTextExtractor.page_texts(&bytes)?;
    tracing::debug!(pages = pages.len(), bytes = bytes.len(), "PDF text extracted");
    Ok(pages
        .iter()
        .map(|p| p.trim_end())
        .collect::<Vec<_>>()
        .join("\n\n"))
}
