//! Error types for the ordercheck-core library.
//!
//! Data-quality problems in the parsed text (unparseable tokens, quantities
//! without an order anchor, a missing invoice number) are never errors; the
//! parsers skip or count them. Errors only come from configuration, PDF
//! decoding and the history/review stores.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the ordercheck library.
#[derive(Error, Debug)]
pub enum OrderCheckError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An argument outside the documented input shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// History or review store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Report rendering error.
    #[error("report error: {0}")]
    Report(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to the history and review stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store directory could not be created or read.
    #[error("cannot access store directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing an entry failed.
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An entry with the same name already exists.
    #[error("entry already exists: {0}")]
    Exists(String),

    /// The requested entry does not exist.
    #[error("entry not found: {0}")]
    NotFound(String),
}

/// Result type for the ordercheck library.
pub type Result<T> = std::result::Result<T, OrderCheckError>;
