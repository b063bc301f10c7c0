//! CLI application for confirmation vs invoice order reconciliation.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{compare, config, history, inspect, review, reviews};

/// Order check - compare order confirmations against invoices
#[derive(Parser)]
#[command(name = "ordercheck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a confirmation against an invoice
    Compare(compare::CompareArgs),

    /// List attribute anomalies in an order document
    Inspect(inspect::InspectArgs),

    /// Record verdicts for the anomalies of an order document
    Review(review::ReviewArgs),

    /// Browse saved comparison reports
    History(history::HistoryArgs),

    /// Browse saved review sessions
    Reviews(reviews::ReviewsArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Compare(args) => compare::run(args, config_path),
        Commands::Inspect(args) => inspect::run(args, config_path),
        Commands::Review(args) => review::run(args, config_path),
        Commands::History(args) => history::run(args, config_path),
        Commands::Reviews(args) => reviews::run(args, config_path),
        Commands::Config(args) => config::run(args, config_path),
    }
}
