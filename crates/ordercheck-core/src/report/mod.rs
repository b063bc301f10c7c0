//! Report rendering for comparison results.
//!
//! A [`ComparisonReport`] projects a [`Reconciliation`] into a four-column
//! table (`Order number`, `Confirmed qty`, `Invoiced qty`, `Match`) and
//! renders it as CSV, aligned text, JSON or PDF.

pub mod anomalies;
mod pdf;

use serde::{Deserialize, Serialize};

use crate::error::{OrderCheckError, Result};
use crate::models::config::ReportConfig;
use crate::models::order::{Reconciliation, ReconciliationRow};

pub use anomalies::{anomalies_to_json, anomalies_to_text};

/// Column headers of the comparison table.
pub const COLUMNS: [&str; 4] = ["Order number", "Confirmed qty", "Invoiced qty", "Match"];

/// Output format of a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Csv,
    Json,
    Pdf,
}

impl ReportFormat {
    /// File extension used when the report is saved.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Pdf => "pdf",
        }
    }

    /// Format for a file extension, if known.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" | "text" => Some(Self::Text),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct JsonRow<'a> {
    order_number: &'a str,
    confirmed_qty: u64,
    invoiced_qty: u64,
    matches: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    title: &'a str,
    invoice_id: &'a str,
    confirmation_id: &'a str,
    orders: usize,
    mismatches: usize,
    rows: Vec<JsonRow<'a>>,
}

/// A reconciliation ready to be rendered.
#[derive(Debug, Clone)]
pub struct ComparisonReport<'a> {
    config: &'a ReportConfig,
    reconciliation: &'a Reconciliation,
    invoice_id: String,
    confirmation_id: String,
}

impl<'a> ComparisonReport<'a> {
    pub fn new(config: &'a ReportConfig, reconciliation: &'a Reconciliation) -> Self {
        Self {
            config,
            reconciliation,
            invoice_id: String::new(),
            confirmation_id: String::new(),
        }
    }

    /// Name the compared documents in the report header.
    pub fn with_sources(mut self, invoice_id: impl Into<String>, confirmation_id: impl Into<String>) -> Self {
        self.invoice_id = invoice_id.into();
        self.confirmation_id = confirmation_id.into();
        self
    }

    fn match_label(&self, row: &ReconciliationRow) -> &str {
        if row.matches {
            &self.config.match_label
        } else {
            &self.config.mismatch_label
        }
    }

    /// Table cells in column order, one vector per row.
    pub fn cells(&self) -> Vec<[String; 4]> {
        self.reconciliation
            .iter()
            .map(|row| {
                [
                    row.order_number.to_string(),
                    row.confirmed_qty.to_string(),
                    row.invoiced_qty.to_string(),
                    self.match_label(row).to_string(),
                ]
            })
            .collect()
    }

    /// Header line naming the compared documents, if any.
    fn sources_line(&self) -> Option<String> {
        if self.invoice_id.is_empty() && self.confirmation_id.is_empty() {
            return None;
        }
        Some(format!(
            "Invoice: {}  Confirmation: {}",
            self.invoice_id, self.confirmation_id
        ))
    }

    fn summary_line(&self) -> String {
        format!(
            "{} orders, {} mismatches",
            self.reconciliation.len(),
            self.reconciliation.mismatches().count()
        )
    }

    /// Render in the requested format.
    pub fn render(&self, format: ReportFormat) -> Result<Vec<u8>> {
        match format {
            ReportFormat::Text => Ok(self.to_text().into_bytes()),
            ReportFormat::Csv => self.to_csv().map(String::into_bytes),
            ReportFormat::Json => self.to_json().map(String::into_bytes),
            ReportFormat::Pdf => self.to_pdf(),
        }
    }

    /// CSV with a header row.
    pub fn to_csv(&self) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(COLUMNS).map_err(csv_error)?;
        for cells in self.cells() {
            wtr.write_record(&cells).map_err(csv_error)?;
        }

        let bytes = wtr
            .into_inner()
            .map_err(|e| OrderCheckError::Report(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| OrderCheckError::Report(e.to_string()))
    }

    /// Aligned plain-text table with a title and a summary line.
    pub fn to_text(&self) -> String {
        let rows = self.cells();
        let mut widths = COLUMNS.map(|c| c.chars().count());
        for cells in &rows {
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut output = String::new();
        output.push_str(&self.config.title);
        output.push('\n');
        if let Some(sources) = self.sources_line() {
            output.push_str(&sources);
            output.push('\n');
        }
        output.push('\n');

        output.push_str(&text_row(&COLUMNS.map(String::from), &widths));
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        output.push_str(&rule.join("  "));
        output.push('\n');
        for cells in &rows {
            output.push_str(&text_row(cells, &widths));
        }

        output.push('\n');
        output.push_str(&self.summary_line());
        output.push('\n');
        output
    }

    /// JSON document with the rows and a summary.
    pub fn to_json(&self) -> Result<String> {
        let report = JsonReport {
            title: &self.config.title,
            invoice_id: &self.invoice_id,
            confirmation_id: &self.confirmation_id,
            orders: self.reconciliation.len(),
            mismatches: self.reconciliation.mismatches().count(),
            rows: self
                .reconciliation
                .iter()
                .map(|row| JsonRow {
                    order_number: row.order_number.as_str(),
                    confirmed_qty: row.confirmed_qty,
                    invoiced_qty: row.invoiced_qty,
                    matches: row.matches,
                })
                .collect(),
        };
        serde_json::to_string_pretty(&report).map_err(|e| OrderCheckError::Report(e.to_string()))
    }

    /// One-document PDF with the title, the table and the summary.
    pub fn to_pdf(&self) -> Result<Vec<u8>> {
        pdf::PdfTable {
            title: &self.config.title,
            subtitle: self.sources_line(),
            rows: self.cells(),
            summary: self.summary_line(),
        }
        .render()
    }
}

fn text_row(cells: &[String; 4], widths: &[usize; 4]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, &width))| {
            // Quantity columns are right-aligned.
            if i == 1 || i == 2 {
                format!("{cell:>width$}")
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

fn csv_error(e: csv::Error) -> OrderCheckError {
    OrderCheckError::Report(e.to_string())
}
