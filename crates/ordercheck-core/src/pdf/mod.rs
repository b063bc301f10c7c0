//! PDF page text extraction.
//!
//! The parsers work on [`Document`](crate::text::Document) values; this
//! module is the collaborator that produces them from PDF bytes.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;
use crate::text::Document;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text sources.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF, pages separated by form feeds.
    fn extract_text(&self) -> Result<String>;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;

    /// Extract the per-page lines of the PDF.
    fn extract_document(&self) -> Result<Document>;
}
