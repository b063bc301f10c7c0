//! Attribute consistency checks for order documents.
//!
//! An order document repeats per-row attributes such as the glass color. The
//! most frequent attribute value in the document is taken as the expected
//! value, and every attribute line that differs from it is reported.

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::{OrderCheckError, Result};
use crate::models::config::AnomalyConfig;
use crate::models::order::{Anomaly, AttributeBlock};
use crate::text::{collapse_whitespace, Document};

/// The majority attribute value of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Baseline {
    /// Value as first written in the document.
    pub value: String,
    /// Number of attribute lines carrying the value.
    pub count: usize,
    /// Number of distinct attribute values in the document.
    pub distinct: usize,
}

struct Tally {
    key: String,
    value: String,
    count: usize,
}

/// Detector for minority attribute values.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    row_marker: Regex,
    attribute: Regex,
}

impl AnomalyDetector {
    /// Create a detector from configuration.
    pub fn new(config: &AnomalyConfig) -> Result<Self> {
        let row_marker = Regex::new(&format!(
            r"(?i)^\s*(?:{})\.?\s*\d+\b",
            alternation(&config.row_labels, "anomaly.row_labels")?
        ))
        .map_err(|e| OrderCheckError::Config(format!("invalid row label: {e}")))?;

        let mut keywords = config.colors.clone();
        if config.include_patterns {
            keywords.extend(config.patterns.iter().cloned());
        }
        let attribute = Regex::new(&format!(
            r"(?i)\b(?:{})\b",
            alternation(&keywords, "anomaly.colors")?
        ))
        .map_err(|e| OrderCheckError::Config(format!("invalid attribute keyword: {e}")))?;

        Ok(Self {
            row_marker,
            attribute,
        })
    }

    /// Whether a line starts a new row block.
    pub fn is_row_marker(&self, line: &str) -> bool {
        self.row_marker.is_match(line)
    }

    /// Whether a line carries a recognized attribute keyword.
    pub fn is_attribute(&self, line: &str) -> bool {
        self.attribute.is_match(line)
    }

    /// Split lines into row blocks. Lines before the first marker are dropped.
    pub fn blocks<'a, I>(&self, lines: I) -> Vec<AttributeBlock>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut blocks = Vec::new();
        let mut current: Option<AttributeBlock> = None;

        for line in lines {
            if self.is_row_marker(line) {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
                current = Some(AttributeBlock {
                    header: line.trim().to_string(),
                    lines: Vec::new(),
                });
            } else if let Some(block) = current.as_mut() {
                let line = line.trim();
                if !line.is_empty() {
                    block.lines.push(line.to_string());
                }
            }
        }

        if let Some(block) = current {
            blocks.push(block);
        }
        blocks
    }

    /// Majority attribute value across all blocks.
    ///
    /// Ties go to the value that appears first in the document.
    pub fn baseline(&self, blocks: &[AttributeBlock]) -> Option<Baseline> {
        let mut tallies: Vec<Tally> = Vec::new();

        for line in blocks.iter().flat_map(|b| &b.lines) {
            if !self.is_attribute(line) {
                continue;
            }
            let value = collapse_whitespace(line);
            let key = value.to_lowercase();
            match tallies.iter_mut().find(|t| t.key == key) {
                Some(tally) => tally.count += 1,
                None => tallies.push(Tally {
                    key,
                    value,
                    count: 1,
                }),
            }
        }

        let mut best: Option<&Tally> = None;
        for tally in &tallies {
            if best.is_none_or(|b| tally.count > b.count) {
                best = Some(tally);
            }
        }

        best.map(|b| Baseline {
            value: b.value.clone(),
            count: b.count,
            distinct: tallies.len(),
        })
    }

    /// Report every attribute line that differs from the document majority.
    pub fn detect<'a, I>(&self, lines: I) -> Vec<Anomaly>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let blocks = self.blocks(lines);
        let Some(baseline) = self.baseline(&blocks) else {
            debug!("No attribute lines in {} blocks", blocks.len());
            return Vec::new();
        };
        if baseline.distinct < 2 {
            debug!("Uniform attribute {:?} across {} blocks", baseline.value, blocks.len());
            return Vec::new();
        }

        let expected_key = baseline.value.to_lowercase();
        let mut anomalies = Vec::new();

        for block in &blocks {
            let (attributes, details): (Vec<&String>, Vec<&String>) =
                block.lines.iter().partition(|l| self.is_attribute(l));

            for line in attributes {
                let observed = collapse_whitespace(line);
                if observed.to_lowercase() == expected_key {
                    continue;
                }
                anomalies.push(Anomaly {
                    block_header: block.header.clone(),
                    detail_lines: details.iter().map(|d| d.to_string()).collect(),
                    observed_value: observed,
                    expected_value: baseline.value.clone(),
                });
            }
        }

        debug!(
            "{} anomalies against baseline {:?} ({} of {} distinct values)",
            anomalies.len(),
            baseline.value,
            baseline.count,
            baseline.distinct
        );
        anomalies
    }

    /// Detect anomalies across all pages of a document.
    pub fn detect_document(&self, document: &Document) -> Vec<Anomaly> {
        self.detect(document.lines())
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(&AnomalyConfig::default()).expect("default anomaly config is valid")
    }
}

/// Escaped regex alternation of keywords; spaces match any whitespace run.
fn alternation(keywords: &[String], field: &str) -> Result<String> {
    let parts: Vec<String> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(|k| {
            k.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect();

    if parts.is_empty() {
        return Err(OrderCheckError::Config(format!("{field} must not be empty")));
    }
    Ok(parts.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_minority_row() {
        let lines = ["Row 1", "vit", "Row 2", "vit", "Row 3", "röd"];
        let anomalies = AnomalyDetector::default().detect(lines);

        assert_eq!(
            anomalies,
            vec![Anomaly {
                block_header: "Row 3".to_string(),
                detail_lines: vec![],
                observed_value: "röd".to_string(),
                expected_value: "vit".to_string(),
            }]
        );
    }

    #[test]
    fn test_no_attributes_is_empty() {
        let lines = ["Row 1", "1200x800", "Row 2", "600x800"];
        assert!(AnomalyDetector::default().detect(lines).is_empty());
        assert!(AnomalyDetector::default().detect(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_uniform_attributes_is_empty() {
        let lines = ["Row 1", "Färg: Vit", "Row 2", "färg:  vit"];
        assert!(AnomalyDetector::default().detect(lines).is_empty());
    }

    #[test]
    fn test_lines_before_first_marker_are_ignored() {
        let lines = ["Kund: Svart & Co", "röd", "Row 1", "vit", "Row 2", "vit"];
        assert!(AnomalyDetector::default().detect(lines).is_empty());
    }

    #[test]
    fn test_detail_lines_are_reported() {
        let lines = [
            "Rad 1", "Fönster 1200x800", "Färg: vit",
            "Rad 2", "Fönster 600x800", "Färg: vit",
            "Rad 3", "Dörr 900x2100", "", "Färg: svart",
        ];
        let anomalies = AnomalyDetector::default().detect(lines);

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].block_header, "Rad 3");
        assert_eq!(anomalies[0].detail_lines, vec!["Dörr 900x2100"]);
        assert_eq!(anomalies[0].observed_value, "Färg: svart");
        assert_eq!(anomalies[0].expected_value, "Färg: vit");
    }

    #[test]
    fn test_tie_goes_to_first_seen_value() {
        let lines = ["Row 1", "blå", "Row 2", "grön"];
        let detector = AnomalyDetector::default();
        let baseline = detector.baseline(&detector.blocks(lines)).unwrap();
        assert_eq!(baseline.value, "blå");
        assert_eq!(baseline.distinct, 2);

        let anomalies = detector.detect(lines);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].block_header, "Row 2");
    }

    #[test]
    fn test_trailing_block_is_flushed() {
        let detector = AnomalyDetector::default();
        let blocks = detector.blocks(["Row 1", "vit", "Row 2", "svart", "extra"]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].lines, vec!["svart", "extra"]);
    }

    #[test]
    fn test_keywords_match_whole_words() {
        let detector = AnomalyDetector::default();
        assert!(detector.is_attribute("Färg: RÖD"));
        assert!(!detector.is_attribute("Vitrin 40 cm"));
        assert!(!detector.is_attribute("Reduction"));
    }

    #[test]
    fn test_pattern_keywords_only_when_enabled() {
        let lines = ["Row 1", "med rutnät", "Row 2", "med rutnät", "Row 3", "utan  rutnät"];
        assert!(AnomalyDetector::default().detect(lines).is_empty());

        let config = AnomalyConfig {
            include_patterns: true,
            ..Default::default()
        };
        let anomalies = AnomalyDetector::new(&config).unwrap().detect(lines);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].observed_value, "utan rutnät");
        assert_eq!(anomalies[0].expected_value, "med rutnät");
    }

    #[test]
    fn test_row_marker_requires_number() {
        let detector = AnomalyDetector::default();
        assert!(detector.is_row_marker("Row 12"));
        assert!(detector.is_row_marker("  pos. 3 Fönster"));
        assert!(!detector.is_row_marker("Rows total"));
        assert!(!detector.is_row_marker("Position 3"));
    }

    #[test]
    fn test_empty_keywords_rejected() {
        let config = AnomalyConfig {
            colors: vec![],
            ..Default::default()
        };
        assert!(AnomalyDetector::new(&config).is_err());
    }
}
