//! Review command - record verdicts for detected anomalies.

use std::io::BufRead;
use std::path::PathBuf;

use clap::Args;
use console::{style, Term};

use ordercheck_core::models::order::{Anomaly, Review, Verdict};
use ordercheck_core::store::{DirReviewSink, ReviewSink};

use super::inspect::detector;
use super::{file_stem, load_config, load_document};

/// Arguments for the review command.
#[derive(Args)]
pub struct ReviewArgs {
    /// Order document (PDF or text)
    #[arg(required = true)]
    input: PathBuf,

    /// Also compare pattern keywords (grids, muntins)
    #[arg(long)]
    patterns: bool,

    /// Verdict per anomaly in listed order ("ok" or "not-ok"); prompts when omitted
    #[arg(long = "verdict", value_name = "VERDICT")]
    verdicts: Vec<String>,

    /// Apply one verdict to every anomaly
    #[arg(long, conflicts_with = "verdicts")]
    all: Option<String>,

    /// Name of the review session (default: input file name)
    #[arg(long)]
    order_ref: Option<String>,
}

fn parse_verdict(input: &str) -> anyhow::Result<Verdict> {
    Verdict::parse(input).ok_or_else(|| {
        anyhow::anyhow!("Invalid verdict '{}', expected 'ok' or 'not-ok'", input)
    })
}

fn prompt_verdict(term: &Term, index: usize, total: usize, anomaly: &Anomaly) -> anyhow::Result<Verdict> {
    term.write_line(&format!(
        "{} [{}/{}] {}: {} (expected: {})",
        style("?").yellow(),
        index + 1,
        total,
        style(&anomaly.block_header).bold(),
        anomaly.observed_value,
        anomaly.expected_value
    ))?;
    for line in &anomaly.detail_lines {
        term.write_line(&format!("    {}", line))?;
    }

    loop {
        term.write_str("Status [ok/not ok]: ")?;
        let Some(answer) = read_answer(term)? else {
            anyhow::bail!("No verdict given for {}", anomaly.block_header);
        };
        match Verdict::parse(&answer) {
            Some(verdict) => return Ok(verdict),
            None => term.write_line(&format!("{} Please answer 'ok' or 'not ok'", style("!").red()))?,
        }
    }
}

/// Next answer line, or `None` once piped input is exhausted.
fn read_answer(term: &Term) -> anyhow::Result<Option<String>> {
    if term.is_term() {
        return Ok(Some(term.read_line()?));
    }

    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

pub fn run(args: ReviewArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let detector = detector(&config, args.patterns)?;

    let document = load_document(&args.input)?;
    let anomalies = detector.detect_document(&document);

    if anomalies.is_empty() {
        println!("{} No anomalies found, nothing to review.", style("ℹ").blue());
        return Ok(());
    }

    let verdicts: Vec<Verdict> = if let Some(all) = &args.all {
        vec![parse_verdict(all)?; anomalies.len()]
    } else if !args.verdicts.is_empty() {
        if args.verdicts.len() != anomalies.len() {
            anyhow::bail!(
                "Got {} verdicts for {} anomalies",
                args.verdicts.len(),
                anomalies.len()
            );
        }
        args.verdicts
            .iter()
            .map(|v| parse_verdict(v))
            .collect::<anyhow::Result<_>>()?
    } else {
        let term = Term::stdout();
        anomalies
            .iter()
            .enumerate()
            .map(|(i, anomaly)| prompt_verdict(&term, i, anomalies.len(), anomaly))
            .collect::<anyhow::Result<_>>()?
    };

    let reviews: Vec<Review> = anomalies
        .into_iter()
        .zip(verdicts)
        .map(|(anomaly, verdict)| Review { anomaly, verdict })
        .collect();

    for review in &reviews {
        println!("  {}", review.to_line());
    }

    let order_ref = args.order_ref.unwrap_or_else(|| file_stem(&args.input));
    let mut sink = DirReviewSink::new(&config.storage.review_dir);
    let path = sink.save(&order_ref, &reviews)?;

    println!(
        "{} Saved {} reviews to {}",
        style("✓").green(),
        reviews.len(),
        path.display()
    );

    Ok(())
}
