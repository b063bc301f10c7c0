//! Configuration structures for the ordercheck pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for ordercheck.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderCheckConfig {
    /// Confirmation parsing configuration.
    pub confirmation: ConfirmationConfig,

    /// Invoice parsing configuration.
    pub invoice: InvoiceConfig,

    /// Order document anomaly detection configuration.
    pub anomaly: AnomalyConfig,

    /// Report rendering configuration.
    pub report: ReportConfig,

    /// History and review storage locations.
    pub storage: StorageConfig,
}

/// How order numbers are located on confirmation lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfirmationStrategy {
    /// Fixed token column holds the order number, last token is the quantity.
    #[default]
    Positional,
    /// Any 7-digit token is an order, the next integer token its quantity.
    TokenScan,
    /// Reorder marker lines plus the positional rule.
    Marker,
}

/// Confirmation parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Extraction strategy.
    pub strategy: ConfirmationStrategy,

    /// Zero-based token index of the order number (positional rule).
    pub order_column: usize,

    /// Minimum number of tokens for a positional line.
    pub min_tokens: usize,

    /// Exclusive upper bound for a plausible quantity (None = unbounded).
    pub max_quantity: Option<u64>,

    /// Keywords that introduce an authoritative order number (marker rule).
    pub marker_keywords: Vec<String>,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            strategy: ConfirmationStrategy::Positional,
            order_column: 3,
            min_tokens: 6,
            max_quantity: Some(500),
            marker_keywords: words(&["reorder", "re-order", "ombeställning"]),
        }
    }
}

/// Which anchor convention delimits invoice order blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvoiceStrategy {
    /// Pick the convention from the labels present in the document.
    #[default]
    Auto,
    /// `Order: 1234567` anchors own the lines above them.
    ReverseAnchor,
    /// Bilingual `Ordernr/Order no` anchors own the lines below them.
    ForwardBlock,
}

/// Invoice parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceConfig {
    /// Anchor convention.
    pub strategy: InvoiceStrategy,

    /// Unit keywords that follow a quantity.
    pub units: Vec<String>,

    /// Exclusive upper bound for a plausible quantity (None = unbounded).
    pub max_quantity: Option<u64>,

    /// Keep the current order open across page breaks.
    pub carry_context_across_pages: bool,
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            strategy: InvoiceStrategy::Auto,
            units: words(&["pcs", "pc", "stk", "st", "szt", "stycken"]),
            max_quantity: None,
            carry_context_across_pages: false,
        }
    }
}

/// Order document anomaly detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Labels that start a row block when followed by a number.
    pub row_labels: Vec<String>,

    /// Color keywords.
    pub colors: Vec<String>,

    /// Pattern keywords (used when `include_patterns` is set).
    pub patterns: Vec<String>,

    /// Also treat pattern keywords as attributes.
    pub include_patterns: bool,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            row_labels: words(&["row", "rad", "line", "pos"]),
            colors: words(&[
                "vit", "svart", "röd", "blå", "grön", "gul", "grå", "brun", "rosa", "lila",
                "beige", "silver", "antracit", "white", "black", "red", "blue", "green",
                "yellow", "grey", "gray", "brown", "pink", "purple", "orange",
            ]),
            patterns: words(&[
                "med rutnät",
                "utan rutnät",
                "with grid",
                "without grid",
                "spröjs",
            ]),
            include_patterns: false,
        }
    }
}

/// Report rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Title printed above text reports.
    pub title: String,

    /// Match column value for equal quantities.
    pub match_label: String,

    /// Match column value for differing quantities.
    pub mismatch_label: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Order comparison: confirmation vs invoice".to_string(),
            match_label: "YES".to_string(),
            mismatch_label: "NO".to_string(),
        }
    }
}

/// History and review storage locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for saved comparison reports.
    pub history_dir: PathBuf,

    /// Directory for saved anomaly reviews.
    pub review_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ordercheck");
        Self {
            history_dir: base.join("history"),
            review_dir: base.join("reviews"),
        }
    }
}

impl OrderCheckConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: OrderCheckConfig =
            serde_json::from_str(r#"{"invoice": {"strategy": "reverse-anchor"}}"#).unwrap();
        assert_eq!(config.invoice.strategy, InvoiceStrategy::ReverseAnchor);
        assert!(!config.invoice.units.is_empty());
        assert_eq!(config.confirmation.max_quantity, Some(500));
        assert_eq!(config.confirmation.order_column, 3);
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = OrderCheckConfig::default();
        config.confirmation.strategy = ConfirmationStrategy::Marker;
        config.save(&path).unwrap();

        let loaded = OrderCheckConfig::from_file(&path).unwrap();
        assert_eq!(loaded.confirmation.strategy, ConfirmationStrategy::Marker);
    }
}
