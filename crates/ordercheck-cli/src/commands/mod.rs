//! Subcommands and the helpers they share.

pub mod compare;
pub mod config;
pub mod history;
pub mod inspect;
pub mod review;
pub mod reviews;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use ordercheck_core::models::config::OrderCheckConfig;
use ordercheck_core::pdf::PdfExtractor;
use ordercheck_core::text::Document;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ordercheck")
        .join("config.json")
}

/// The configuration file in effect: `--config` if given, else the default.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load configuration.
///
/// An explicit `--config` file must exist; the default file is optional.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<OrderCheckConfig> {
    if let Some(path) = config_path {
        let path = Path::new(path);
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        return Ok(OrderCheckConfig::from_file(path)?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(OrderCheckConfig::from_file(&default_path)?)
    } else {
        Ok(OrderCheckConfig::default())
    }
}

/// Read a document from a PDF or a plain text file.
///
/// Text files use form feeds as page breaks.
pub fn load_document(path: &Path) -> anyhow::Result<Document> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    info!("Reading {}", path.display());
    let document = match extension.as_str() {
        "pdf" => {
            let data = fs::read(path)?;
            PdfExtractor::document_from_bytes(&data)?
        }
        "txt" | "text" | "" => Document::from_text(&fs::read_to_string(path)?),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    };

    debug!(
        "{}: {} pages, {} lines",
        path.display(),
        document.pages.len(),
        document.line_count()
    );
    Ok(document)
}

/// File name without extension, used to name saved results.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// Print to a file or stdout.
pub fn write_output(output: Option<&Path>, content: &[u8]) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            println!(
                "{} Output written to {}",
                console::style("✓").green(),
                path.display()
            );
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content)?;
            if !content.ends_with(b"\n") {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}
