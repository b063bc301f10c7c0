//! Inspect command - list attribute anomalies of an order document.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use console::style;

use ordercheck_core::anomaly::AnomalyDetector;
use ordercheck_core::models::config::OrderCheckConfig;
use ordercheck_core::report::{anomalies_to_json, anomalies_to_text};

use super::{load_config, load_document, write_output};

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Order document (PDF or text)
    #[arg(required = true)]
    input: PathBuf,

    /// Also compare pattern keywords (grids, muntins)
    #[arg(long)]
    patterns: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: AnomalyFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum AnomalyFormat {
    /// Numbered list
    Text,
    /// JSON output
    Json,
}

/// Build the anomaly detector, optionally widened to pattern keywords.
pub fn detector(config: &OrderCheckConfig, patterns: bool) -> anyhow::Result<AnomalyDetector> {
    let mut anomaly_config = config.anomaly.clone();
    if patterns {
        anomaly_config.include_patterns = true;
    }
    Ok(AnomalyDetector::new(&anomaly_config)?)
}

pub fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let detector = detector(&config, args.patterns)?;

    let document = load_document(&args.input)?;
    let blocks = detector.blocks(document.lines());
    let anomalies = detector.detect_document(&document);

    let rendered = match args.format {
        AnomalyFormat::Text => anomalies_to_text(&anomalies),
        AnomalyFormat::Json => anomalies_to_json(&anomalies)?,
    };
    write_output(args.output.as_deref(), rendered.as_bytes())?;

    if let AnomalyFormat::Text = args.format {
        if let Some(baseline) = detector.baseline(&blocks) {
            println!();
            println!(
                "{} {} rows, majority value {:?} ({} of {} distinct)",
                style("ℹ").blue(),
                blocks.len(),
                baseline.value,
                baseline.count,
                baseline.distinct
            );
        }
    }

    Ok(())
}
