//! Persistence of comparison reports and anomaly reviews.
//!
//! Stores are collaborators of the core: the parsers and the reconciler never
//! touch them. Every store takes its location as a constructor argument.

mod history;
mod reviews;

pub use history::{DirHistorySink, HistoryKey, HistorySink, MemoryHistorySink};
pub use reviews::{render_reviews, DirReviewSink, MemoryReviewSink, ReviewSink};

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::{Result, StoreError};

/// Timestamp suffix format of stored entry names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Make an identifier safe to use as part of a file name.
pub fn sanitize_component(id: &str) -> String {
    let cleaned: String = id
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Timestamp encoded at the end of an entry name, if any.
fn entry_timestamp(name: &str) -> Option<NaiveDateTime> {
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    let (_, suffix) = stem.rsplit_once('-')?;
    NaiveDateTime::parse_from_str(suffix, TIMESTAMP_FORMAT).ok()
}

/// Sort entry names newest first, falling back to reverse name order.
fn sort_newest_first(names: &mut [String]) {
    names.sort_by(|a, b| {
        entry_timestamp(b)
            .cmp(&entry_timestamp(a))
            .then_with(|| b.cmp(a))
    });
}

/// Write a new entry into `dir`, creating the directory when missing.
///
/// Fails with [`StoreError::Exists`] if the entry is already there; an
/// existing file is never truncated.
fn create_entry(dir: &Path, name: &str, contents: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|source| StoreError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(name);
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(StoreError::Exists(name.to_string()).into());
        }
        Err(source) => return Err(StoreError::Write { path, source }.into()),
    };
    file.write_all(contents)
        .map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

/// File names in `dir`, newest first. A missing directory lists as empty.
fn list_entries(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        debug!("Store directory {} does not exist yet", dir.display());
        return Ok(Vec::new());
    }

    let to_error = |source: std::io::Error| StoreError::Directory {
        path: dir.to_path_buf(),
        source,
    };
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(to_error)? {
        let entry = entry.map_err(to_error)?;
        if entry.path().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    sort_newest_first(&mut names);
    Ok(names)
}
