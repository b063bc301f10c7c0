//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document as PdfDocument;
use tracing::{debug, trace, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;
use crate::text::Document;

/// PDF text extractor using lopdf, with pdf-extract as a fallback.
pub struct PdfExtractor {
    document: Option<PdfDocument>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Load a PDF and extract its pages in one step.
    pub fn document_from_bytes(data: &[u8]) -> Result<Document> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        extractor.extract_document()
    }

    fn loaded(&self) -> Result<&PdfDocument> {
        self.document
            .as_ref()
            .ok_or(PdfError::Parse("No document loaded".to_string()))
    }

    /// Whole-document text from pdf-extract, split on its page breaks.
    fn fallback_document(&self) -> Result<Document> {
        let text = self.extract_text()?;
        let document = Document::from_text(&text);
        debug!(
            "pdf-extract fallback produced {} pages, {} lines",
            document.pages.len(),
            document.line_count()
        );
        Ok(document)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = PdfDocument::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self.loaded()?;
        if page == 0 || !doc.get_pages().contains_key(&page) {
            return Err(PdfError::InvalidPage(page));
        }
        doc.extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_document(&self) -> Result<Document> {
        let page_count = self.page_count();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        let mut pages = Vec::with_capacity(page_count as usize);
        for page in 1..=page_count {
            let text = match self.extract_page_text(page) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Page {} text extraction failed: {}", page, e);
                    String::new()
                }
            };
            trace!("Page {}: {} chars", page, text.len());
            pages.push(text);
        }

        let document = Document::from_pages(pages);
        if document.pages.iter().all(|p| p.is_blank()) {
            warn!("No text from per-page extraction, falling back to pdf-extract");
            return self.fallback_document();
        }

        debug!(
            "Extracted {} pages, {} lines",
            document.pages.len(),
            document.line_count()
        );
        Ok(document)
    }
}
