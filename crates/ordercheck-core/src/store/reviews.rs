//! Saved anomaly review sessions.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::info;

use super::{create_entry, list_entries, sanitize_component, sort_newest_first, TIMESTAMP_FORMAT};
use crate::error::{Result, StoreError};
use crate::models::order::Review;

/// One line per review: `header – observed – expected: baseline – status: verdict`.
pub fn render_reviews(reviews: &[Review]) -> String {
    reviews
        .iter()
        .map(|r| format!("{}\n", r.to_line()))
        .collect()
}

fn session_name(order_ref: &str, timestamp: NaiveDateTime) -> String {
    format!(
        "{}-{}.txt",
        sanitize_component(order_ref),
        timestamp.format(TIMESTAMP_FORMAT)
    )
}

/// Destination for reviewer verdicts.
pub trait ReviewSink {
    /// Store a review session for an order document at the given time.
    fn save_at(&mut self, order_ref: &str, reviews: &[Review], timestamp: NaiveDateTime) -> Result<PathBuf>;

    /// Store a review session stamped with the current local time.
    fn save(&mut self, order_ref: &str, reviews: &[Review]) -> Result<PathBuf> {
        self.save_at(order_ref, reviews, Local::now().naive_local())
    }

    /// Session names, newest first.
    fn list(&self) -> Result<Vec<String>>;

    /// Text of a stored session.
    fn load(&self, name: &str) -> Result<String>;
}

/// Review sessions kept as UTF-8 files in one directory.
#[derive(Debug, Clone)]
pub struct DirReviewSink {
    dir: PathBuf,
}

impl DirReviewSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReviewSink for DirReviewSink {
    fn save_at(&mut self, order_ref: &str, reviews: &[Review], timestamp: NaiveDateTime) -> Result<PathBuf> {
        let name = session_name(order_ref, timestamp);
        let path = create_entry(&self.dir, &name, render_reviews(reviews).as_bytes())?;
        info!("Saved {} reviews to {}", reviews.len(), path.display());
        Ok(path)
    }

    fn list(&self) -> Result<Vec<String>> {
        list_entries(&self.dir)
    }

    fn load(&self, name: &str) -> Result<String> {
        if name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(StoreError::NotFound(name.to_string()).into());
        }
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(StoreError::NotFound(name.to_string()).into());
        }
        Ok(fs::read_to_string(path)?)
    }
}

/// Review sessions held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryReviewSink {
    sessions: BTreeMap<String, Vec<Review>>,
}

impl MemoryReviewSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reviews of a stored session.
    pub fn reviews(&self, name: &str) -> Option<&[Review]> {
        self.sessions.get(name).map(Vec::as_slice)
    }
}

impl ReviewSink for MemoryReviewSink {
    fn save_at(&mut self, order_ref: &str, reviews: &[Review], timestamp: NaiveDateTime) -> Result<PathBuf> {
        let name = session_name(order_ref, timestamp);
        if self.sessions.contains_key(&name) {
            return Err(StoreError::Exists(name).into());
        }
        self.sessions.insert(name.clone(), reviews.to_vec());
        Ok(PathBuf::from(name))
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.sessions.keys().cloned().collect();
        sort_newest_first(&mut names);
        Ok(names)
    }

    fn load(&self, name: &str) -> Result<String> {
        self.sessions
            .get(name)
            .map(|reviews| render_reviews(reviews))
            .ok_or_else(|| StoreError::NotFound(name.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::{Anomaly, Verdict};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn review(header: &str, observed: &str, verdict: Verdict) -> Review {
        Review {
            anomaly: Anomaly {
                block_header: header.to_string(),
                detail_lines: vec![],
                observed_value: observed.to_string(),
                expected_value: "vit".to_string(),
            },
            verdict,
        }
    }

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_render_reviews() {
        let text = render_reviews(&[
            review("Row 3", "röd", Verdict::NotOk),
            review("Row 7", "svart", Verdict::Ok),
        ]);
        assert_eq!(
            text,
            "Row 3 – röd – expected: vit – status: not OK\n\
             Row 7 – svart – expected: vit – status: OK\n"
        );
    }

    #[test]
    fn test_dir_sink_writes_session_file() {
        let temp = TempDir::new().unwrap();
        let mut sink = DirReviewSink::new(temp.path().join("reviews"));

        let path = sink
            .save_at("order 881.pdf", &[review("Row 3", "röd", Verdict::NotOk)], at(9))
            .unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "order_881.pdf-20240517090000.txt"
        );

        sink.save_at("order 881.pdf", &[], at(10)).unwrap();
        let names = sink.list().unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names[0], "order_881.pdf-20240517100000.txt");
        assert_eq!(
            sink.load(&names[1]).unwrap(),
            "Row 3 – röd – expected: vit – status: not OK\n"
        );
        assert_eq!(sink.load(&names[0]).unwrap(), "");
    }

    #[test]
    fn test_dir_sink_keeps_existing_session() {
        let temp = TempDir::new().unwrap();
        let mut sink = DirReviewSink::new(temp.path());
        let reviews = [review("Row 3", "röd", Verdict::NotOk)];

        let path = sink.save_at("order", &reviews, at(9)).unwrap();
        let err = sink.save_at("order", &[], at(9)).unwrap_err();
        assert!(matches!(
            err,
            crate::error::OrderCheckError::Store(StoreError::Exists(_))
        ));
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "Row 3 – röd – expected: vit – status: not OK\n"
        );
    }

    #[test]
    fn test_dir_sink_list_ignores_subdirectories() {
        let temp = TempDir::new().unwrap();
        let mut sink = DirReviewSink::new(temp.path());
        fs::create_dir(temp.path().join("archive")).unwrap();
        sink.save_at("order", &[], at(9)).unwrap();

        assert_eq!(sink.list().unwrap(), vec!["order-20240517090000.txt"]);
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemoryReviewSink::new();
        let reviews = vec![review("Row 1", "blå", Verdict::Ok)];
        let path = sink.save_at("A", &reviews, at(8)).unwrap();
        let name = path.to_string_lossy().into_owned();

        assert_eq!(sink.list().unwrap(), vec![name.clone()]);
        assert_eq!(sink.reviews(&name), Some(reviews.as_slice()));
        assert!(sink.save_at("A", &reviews, at(8)).is_err());
        assert!(sink.load("missing").is_err());
    }
}
