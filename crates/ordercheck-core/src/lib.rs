//! Core library for order confirmation and invoice reconciliation.
//!
//! This crate provides:
//! - Line and page handling for text extracted from PDF documents
//! - Confirmation and invoice parsers producing per-order quantities
//! - Reconciliation of confirmed against invoiced quantities
//! - Attribute anomaly detection for order documents
//! - Report rendering (CSV, text, JSON) and history/review stores
//! - PDF page text extraction

pub mod error;
pub mod text;
pub mod models;
pub mod extract;
pub mod confirmation;
pub mod invoice;
pub mod reconcile;
pub mod anomaly;
pub mod report;
pub mod store;
pub mod pdf;

pub use error::{OrderCheckError, PdfError, Result, StoreError};
pub use text::{Document, Page};
pub use models::config::OrderCheckConfig;
pub use models::order::{
    Anomaly, AttributeBlock, OrderMap, OrderNumber, Reconciliation, ReconciliationRow, Review,
    Verdict,
};
pub use extract::{OrderExtractor, QuantityBound};
pub use confirmation::ConfirmationParser;
pub use invoice::{InvoiceExtraction, InvoiceLayout, InvoiceParser};
pub use reconcile::{reconcile, reconcile_documents};
pub use anomaly::AnomalyDetector;
pub use report::{ComparisonReport, ReportFormat};
pub use store::{HistoryKey, HistorySink, ReviewSink};
pub use pdf::{PdfExtractor, PdfProcessor};
