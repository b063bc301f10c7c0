//! Compare command - reconcile a confirmation against an invoice.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, ValueEnum};
use console::style;
use tracing::{debug, info};

use ordercheck_core::confirmation::ConfirmationParser;
use ordercheck_core::invoice::InvoiceParser;
use ordercheck_core::models::config::{ConfirmationStrategy, InvoiceStrategy};
use ordercheck_core::reconcile::reconcile;
use ordercheck_core::report::{ComparisonReport, ReportFormat};
use ordercheck_core::store::{DirHistorySink, HistoryKey, HistorySink};

use super::{file_stem, load_config, load_document, write_output};

/// Arguments for the compare command.
#[derive(Args)]
pub struct CompareArgs {
    /// Confirmation document (PDF or text)
    #[arg(required = true)]
    confirmation: PathBuf,

    /// Invoice document (PDF or text)
    #[arg(required = true)]
    invoice: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Confirmation parsing strategy (overrides config)
    #[arg(long, value_enum)]
    confirmation_strategy: Option<ConfirmationArg>,

    /// Invoice parsing strategy (overrides config)
    #[arg(long, value_enum)]
    invoice_strategy: Option<InvoiceArg>,

    /// Keep the current invoice order open across page breaks
    #[arg(long)]
    carry_pages: bool,

    /// Save the report to the history directory
    #[arg(long)]
    save: bool,

    /// Exit with an error when any order mismatches
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    Text,
    /// CSV output
    Csv,
    /// JSON output
    Json,
    /// PDF document (needs --output or --save)
    Pdf,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Csv => ReportFormat::Csv,
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Pdf => ReportFormat::Pdf,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ConfirmationArg {
    /// Order number at a fixed column, quantity last
    Positional,
    /// Every 7-digit token is an order number
    TokenScan,
    /// Positional rows plus re-order marker lines
    Marker,
}

impl From<ConfirmationArg> for ConfirmationStrategy {
    fn from(arg: ConfirmationArg) -> Self {
        match arg {
            ConfirmationArg::Positional => ConfirmationStrategy::Positional,
            ConfirmationArg::TokenScan => ConfirmationStrategy::TokenScan,
            ConfirmationArg::Marker => ConfirmationStrategy::Marker,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum InvoiceArg {
    /// Detect the layout from the document
    Auto,
    /// `Order:` lines close the block above them
    ReverseAnchor,
    /// `Ordernr/Order no` lines open the block below them
    ForwardBlock,
}

impl From<InvoiceArg> for InvoiceStrategy {
    fn from(arg: InvoiceArg) -> Self {
        match arg {
            InvoiceArg::Auto => InvoiceStrategy::Auto,
            InvoiceArg::ReverseAnchor => InvoiceStrategy::ReverseAnchor,
            InvoiceArg::ForwardBlock => InvoiceStrategy::ForwardBlock,
        }
    }
}

pub fn run(args: CompareArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let format = ReportFormat::from(args.format);
    if format == ReportFormat::Pdf && args.output.is_none() && !args.save {
        anyhow::bail!("PDF reports are not printed to the terminal; use --output or --save");
    }
    let config = load_config(config_path)?;

    let mut confirmation_parser = ConfirmationParser::new(&config.confirmation)?;
    if let Some(strategy) = args.confirmation_strategy {
        confirmation_parser = confirmation_parser.with_strategy(strategy.into());
    }

    let mut invoice_parser = InvoiceParser::new(&config.invoice)?;
    if let Some(strategy) = args.invoice_strategy {
        invoice_parser = invoice_parser.with_strategy(strategy.into());
    }
    if args.carry_pages {
        invoice_parser = invoice_parser.with_page_carry(true);
    }

    let confirmation = load_document(&args.confirmation)?;
    let invoice = load_document(&args.invoice)?;

    let confirmed = confirmation_parser.parse(&confirmation);
    let extraction = invoice_parser.parse(&invoice);
    if extraction.unanchored > 0 {
        info!(
            "{} invoice quantities had no order anchor and were skipped",
            extraction.unanchored
        );
    }

    let reconciliation = reconcile(&confirmed, &extraction.orders);
    let invoice_id = extraction.invoice_id_or_placeholder().to_string();
    let confirmation_id = file_stem(&args.confirmation);

    let report = ComparisonReport::new(&config.report, &reconciliation)
        .with_sources(invoice_id.as_str(), confirmation_id.as_str());
    let rendered = report.render(format)?;

    if args.output.is_some() || format != ReportFormat::Pdf {
        write_output(args.output.as_deref(), &rendered)?;
    }

    if args.save {
        let mut sink = DirHistorySink::new(&config.storage.history_dir);
        let key = HistoryKey::now(invoice_id.as_str(), confirmation_id.as_str());
        let path = sink.save(&key, &rendered, format.extension())?;
        eprintln!(
            "{} Saved report to {}",
            style("✓").green(),
            path.display()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    let mismatches = reconciliation.mismatches().count();
    if args.strict && mismatches > 0 {
        anyhow::bail!(
            "{} of {} orders do not match",
            mismatches,
            reconciliation.len()
        );
    }

    Ok(())
}
