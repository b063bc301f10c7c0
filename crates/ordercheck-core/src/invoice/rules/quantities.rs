//! Quantity extraction for invoice lines.

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::trace;

use super::patterns::quantity_pattern;
use super::{ExtractionMatch, FieldExtractor};
use crate::error::{OrderCheckError, Result};
use crate::extract::QuantityBound;

/// Quantity-with-unit extractor.
#[derive(Debug, Clone)]
pub struct QuantityExtractor {
    pattern: Regex,
    bound: QuantityBound,
}

impl QuantityExtractor {
    /// Create an extractor for the given unit keywords.
    pub fn new(units: &[String]) -> Result<Self> {
        if units.iter().all(|u| u.trim().is_empty()) {
            return Err(OrderCheckError::Config(
                "invoice.units must not be empty".to_string(),
            ));
        }
        let pattern = quantity_pattern(units)
            .map_err(|e| OrderCheckError::Config(format!("invalid unit keyword: {e}")))?;

        Ok(Self {
            pattern,
            bound: QuantityBound::unbounded(),
        })
    }

    /// Set the plausibility bound.
    pub fn with_bound(mut self, bound: QuantityBound) -> Self {
        self.bound = bound;
        self
    }

    /// Number of quantity matches in a line, before normalization.
    pub fn count_matches(&self, text: &str) -> usize {
        self.pattern.find_iter(text).count()
    }
}

impl FieldExtractor for QuantityExtractor {
    type Output = ExtractionMatch<u64>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in self.pattern.captures_iter(text) {
            let (Some(full_match), Some(number)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            let Some(quantity) = parse_locale_quantity(number.as_str()) else {
                trace!("Skipping unparseable quantity {:?}", number.as_str());
                continue;
            };

            if !self.bound.accepts(quantity) {
                trace!("Rejected implausible quantity {}", quantity);
                continue;
            }

            results.push(
                ExtractionMatch::new(quantity, full_match.as_str())
                    .with_position(full_match.start(), full_match.end()),
            );
        }

        results
    }
}

/// Normalize a locale-formatted number (e.g. "1.234,5", "1,234.5", "1234,5").
///
/// With both `.` and `,` present the rightmost one is the decimal separator
/// and the others group thousands. With a single kind, a repeated separator
/// groups thousands, as does a single one followed by exactly three digits;
/// otherwise it is the decimal separator.
pub fn normalize_number(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let strip = |part: &str| part.replace([',', '.'], "");

    let (integer, fraction) = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(c), Some(d)) => {
            let pos = c.max(d);
            (strip(&cleaned[..pos]), cleaned[pos + 1..].to_string())
        }
        (Some(pos), None) | (None, Some(pos)) => {
            let sep = &cleaned[pos..pos + 1];
            let digits_after = cleaned.len() - pos - 1;
            if cleaned.matches(sep).count() > 1 || digits_after == 3 {
                (strip(&cleaned), String::new())
            } else {
                (cleaned[..pos].to_string(), cleaned[pos + 1..].to_string())
            }
        }
        (None, None) => (cleaned, String::new()),
    };

    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    let integer = if integer.is_empty() { "0".to_string() } else { integer };
    let normalized = if fraction.is_empty() {
        integer
    } else {
        format!("{}.{}", integer, strip(&fraction))
    };

    Decimal::from_str(&normalized).ok()
}

/// Parse a locale-formatted quantity, truncating any decimal part.
pub fn parse_locale_quantity(s: &str) -> Option<u64> {
    normalize_number(s)?.trunc().to_u64()
}
