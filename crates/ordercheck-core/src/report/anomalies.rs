//! Rendering of anomaly lists.

use crate::error::{OrderCheckError, Result};
use crate::models::order::Anomaly;

/// Numbered text list, one entry per anomaly with its detail lines indented.
pub fn anomalies_to_text(anomalies: &[Anomaly]) -> String {
    if anomalies.is_empty() {
        return "No anomalies found\n".to_string();
    }

    let mut output = String::new();
    for (i, anomaly) in anomalies.iter().enumerate() {
        output.push_str(&format!(
            "{}. {}: {} (expected: {})\n",
            i + 1,
            anomaly.block_header,
            anomaly.observed_value,
            anomaly.expected_value
        ));
        for line in &anomaly.detail_lines {
            output.push_str(&format!("     {}\n", line));
        }
    }
    output
}

pub fn anomalies_to_json(anomalies: &[Anomaly]) -> Result<String> {
    serde_json::to_string_pretty(anomalies).map_err(|e| OrderCheckError::Report(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn anomaly() -> Anomaly {
        Anomaly {
            block_header: "Row 3".to_string(),
            detail_lines: vec!["Dörr 900x2100".to_string()],
            observed_value: "röd".to_string(),
            expected_value: "vit".to_string(),
        }
    }

    #[test]
    fn test_text_list() {
        assert_eq!(
            anomalies_to_text(&[anomaly()]),
            "1. Row 3: röd (expected: vit)\n     Dörr 900x2100\n"
        );
        assert_eq!(anomalies_to_text(&[]), "No anomalies found\n");
    }

    #[test]
    fn test_json_list() {
        let json = anomalies_to_json(&[anomaly()]).unwrap();
        let parsed: Vec<Anomaly> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![anomaly()]);
    }
}
