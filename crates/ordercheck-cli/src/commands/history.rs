//! History command - browse saved comparison reports.

use std::io::Write;

use clap::{Args, Subcommand};
use console::style;
use glob::Pattern;

use ordercheck_core::pdf::PdfExtractor;
use ordercheck_core::report::ReportFormat;
use ordercheck_core::store::{DirHistorySink, HistorySink};

use super::load_config;

/// Arguments for the history command.
#[derive(Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    command: HistoryCommand,
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List saved reports, newest first
    List {
        /// Only show names matching a glob pattern (e.g. "2024-*")
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Print a saved report
    Show {
        /// Report file name as shown by `list`
        name: String,
    },
}

pub fn run(args: HistoryArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let sink = DirHistorySink::new(&config.storage.history_dir);

    match args.command {
        HistoryCommand::List { filter } => {
            let pattern = filter.as_deref().map(Pattern::new).transpose()?;
            let names = filtered(sink.list()?, pattern.as_ref());

            if names.is_empty() {
                println!(
                    "{} No saved reports in {}",
                    style("ℹ").blue(),
                    sink.dir().display()
                );
            }
            for name in names {
                println!("{}", name);
            }
            Ok(())
        }
        HistoryCommand::Show { name } => {
            let data = sink.load(&name)?;
            if ReportFormat::from_extension(extension(&name)) == Some(ReportFormat::Pdf) {
                let document = PdfExtractor::document_from_bytes(&data)?;
                for line in document.lines() {
                    println!("{}", line);
                }
            } else {
                std::io::stdout().write_all(&data)?;
            }
            Ok(())
        }
    }
}

fn extension(name: &str) -> &str {
    name.rsplit_once('.').map_or("", |(_, ext)| ext)
}

/// Names matching an optional glob pattern.
pub fn filtered(names: Vec<String>, pattern: Option<&Pattern>) -> Vec<String> {
    match pattern {
        Some(p) => names.into_iter().filter(|n| p.matches(n)).collect(),
        None => names,
    }
}
