//! Reviews command - browse saved review sessions.

use clap::{Args, Subcommand};
use console::style;
use glob::Pattern;

use ordercheck_core::store::{DirReviewSink, ReviewSink};

use super::history::filtered;
use super::load_config;

/// Arguments for the reviews command.
#[derive(Args)]
pub struct ReviewsArgs {
    #[command(subcommand)]
    command: ReviewsCommand,
}

#[derive(Subcommand)]
enum ReviewsCommand {
    /// List saved review sessions, newest first
    List {
        /// Only show names matching a glob pattern
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Print a saved review session
    Show {
        /// Session file name as shown by `list`
        name: String,
    },
}

pub fn run(args: ReviewsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let sink = DirReviewSink::new(&config.storage.review_dir);

    match args.command {
        ReviewsCommand::List { filter } => {
            let pattern = filter.as_deref().map(Pattern::new).transpose()?;
            let names = filtered(sink.list()?, pattern.as_ref());

            if names.is_empty() {
                println!(
                    "{} No saved reviews in {}",
                    style("ℹ").blue(),
                    sink.dir().display()
                );
            }
            for name in names {
                println!("{}", name);
            }
        }
        ReviewsCommand::Show { name } => {
            let text = sink.load(&name)?;
            println!("{}", name);
            println!("{}", "-".repeat(name.chars().count()));
            print!("{}", text);
        }
    }

    Ok(())
}
