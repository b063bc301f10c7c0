//! Comparison report history.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{create_entry, list_entries, sanitize_component, sort_newest_first, TIMESTAMP_FORMAT};
use crate::error::{Result, StoreError};

/// Name of a saved comparison: `{invoice_id}-{confirmation_id}-{YYYYmmddHHMMSS}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryKey {
    pub invoice_id: String,
    pub confirmation_id: String,
    pub timestamp: NaiveDateTime,
}

impl HistoryKey {
    pub fn new(
        invoice_id: impl Into<String>,
        confirmation_id: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            invoice_id: invoice_id.into(),
            confirmation_id: confirmation_id.into(),
            timestamp,
        }
    }

    /// Key stamped with the current local time.
    pub fn now(invoice_id: impl Into<String>, confirmation_id: impl Into<String>) -> Self {
        Self::new(invoice_id, confirmation_id, Local::now().naive_local())
    }
}

impl fmt::Display for HistoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            sanitize_component(&self.invoice_id),
            sanitize_component(&self.confirmation_id),
            self.timestamp.format(TIMESTAMP_FORMAT)
        )
    }
}

/// Destination for rendered comparison reports.
pub trait HistorySink {
    /// Store a report under `{key}.{extension}` and return its location.
    fn save(&mut self, key: &HistoryKey, report: &[u8], extension: &str) -> Result<PathBuf>;

    /// Entry names, newest first.
    fn list(&self) -> Result<Vec<String>>;

    /// Contents of a stored entry.
    fn load(&self, name: &str) -> Result<Vec<u8>>;
}

fn entry_name(key: &HistoryKey, extension: &str) -> String {
    format!("{}.{}", key, extension.trim_start_matches('.'))
}

/// History kept as files in one directory.
#[derive(Debug, Clone)]
pub struct DirHistorySink {
    dir: PathBuf,
}

impl DirHistorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, name: &str) -> Result<PathBuf> {
        if name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(StoreError::NotFound(name.to_string()).into());
        }
        Ok(self.dir.join(name))
    }
}

impl HistorySink for DirHistorySink {
    fn save(&mut self, key: &HistoryKey, report: &[u8], extension: &str) -> Result<PathBuf> {
        let path = create_entry(&self.dir, &entry_name(key, extension), report)?;
        info!("Saved report to {}", path.display());
        Ok(path)
    }

    fn list(&self) -> Result<Vec<String>> {
        list_entries(&self.dir)
    }

    fn load(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.entry_path(name)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(name.to_string()).into());
        }
        Ok(fs::read(path)?)
    }
}

/// History held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistorySink {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryHistorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HistorySink for MemoryHistorySink {
    fn save(&mut self, key: &HistoryKey, report: &[u8], extension: &str) -> Result<PathBuf> {
        let name = entry_name(key, extension);
        if self.entries.contains_key(&name) {
            return Err(StoreError::Exists(name).into());
        }
        self.entries.insert(name.clone(), report.to_vec());
        Ok(PathBuf::from(name))
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        sort_newest_first(&mut names);
        Ok(names)
    }

    fn load(&self, name: &str) -> Result<Vec<u8>> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()).into())
    }
}
