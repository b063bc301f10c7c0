//! Order, reconciliation and anomaly data models.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::text::is_order_number;

/// Placeholder used in place of a missing invoice number.
pub const INVOICE_ID_PLACEHOLDER: &str = "Faktura";

/// A fixed-width numeric order number, the key shared by confirmations and
/// invoices.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Parse an order number; `None` unless the token is exactly seven ASCII digits.
    pub fn parse(token: &str) -> Option<Self> {
        is_order_number(token).then(|| Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_order_number(&value) {
            Ok(Self(value))
        } else {
            Err(format!("not a 7-digit order number: {value:?}"))
        }
    }
}

impl From<OrderNumber> for String {
    fn from(value: OrderNumber) -> Self {
        value.0
    }
}

impl AsRef<str> for OrderNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Quantities per order number, accumulated by sum.
///
/// Backed by an ordered map, so iteration (and serialization) is in ascending
/// order-number order and repeated parses of the same text are identical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderMap {
    quantities: BTreeMap<OrderNumber, u64>,
}

impl OrderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a quantity to an order. Quantities never overwrite.
    pub fn add(&mut self, order: OrderNumber, quantity: u64) {
        let entry = self.quantities.entry(order).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    /// Quantity for an order, `None` if it never appeared.
    pub fn get(&self, order: &OrderNumber) -> Option<u64> {
        self.quantities.get(order).copied()
    }

    /// Quantity for an order given as text, zero if absent or malformed.
    pub fn quantity(&self, order: &str) -> u64 {
        OrderNumber::parse(order)
            .and_then(|o| self.get(&o))
            .unwrap_or(0)
    }

    pub fn contains(&self, order: &OrderNumber) -> bool {
        self.quantities.contains_key(order)
    }

    pub fn keys(&self) -> impl Iterator<Item = &OrderNumber> + '_ {
        self.quantities.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OrderNumber, u64)> + '_ {
        self.quantities.iter().map(|(k, v)| (k, *v))
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Sum of all quantities.
    pub fn total(&self) -> u64 {
        self.quantities.values().fold(0u64, |acc, q| acc.saturating_add(*q))
    }
}

impl FromIterator<(OrderNumber, u64)> for OrderMap {
    fn from_iter<I: IntoIterator<Item = (OrderNumber, u64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (order, quantity) in iter {
            map.add(order, quantity);
        }
        map
    }
}

/// One reconciled order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationRow {
    pub order_number: OrderNumber,
    pub confirmed_qty: u64,
    pub invoiced_qty: u64,
    pub matches: bool,
}

impl ReconciliationRow {
    /// Invoiced minus confirmed quantity.
    pub fn difference(&self) -> i128 {
        self.invoiced_qty as i128 - self.confirmed_qty as i128
    }
}

/// Reconciliation rows in ascending order-number order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reconciliation {
    pub rows: Vec<ReconciliationRow>,
}

impl Reconciliation {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReconciliationRow> {
        self.rows.iter()
    }

    /// Rows whose quantities differ.
    pub fn mismatches(&self) -> impl Iterator<Item = &ReconciliationRow> + '_ {
        self.rows.iter().filter(|r| !r.matches)
    }

    /// Whether every order matched.
    pub fn is_clean(&self) -> bool {
        self.rows.iter().all(|r| r.matches)
    }
}

impl<'a> IntoIterator for &'a Reconciliation {
    type Item = &'a ReconciliationRow;
    type IntoIter = std::slice::Iter<'a, ReconciliationRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// A contiguous run of order-document lines starting at a row marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeBlock {
    /// The marker line that opened the block.
    pub header: String,
    /// The lines after the header.
    pub lines: Vec<String>,
}

/// An attribute value that disagrees with the document's majority value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    pub block_header: String,
    pub detail_lines: Vec<String>,
    pub observed_value: String,
    pub expected_value: String,
}

/// A reviewer's verdict on an anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Ok,
    NotOk,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NotOk => "not OK",
        }
    }

    /// Parse a verdict as typed by a reviewer.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "ok" | "y" | "yes" | "ja" => Some(Self::Ok),
            "not ok" | "notok" | "n" | "no" | "nej" | "inte ok" => Some(Self::NotOk),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An anomaly together with the reviewer's verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub anomaly: Anomaly,
    pub verdict: Verdict,
}

impl Review {
    /// The persisted one-line form of a review.
    pub fn to_line(&self) -> String {
        format!(
            "{} – {} – expected: {} – status: {}",
            self.anomaly.block_header,
            self.anomaly.observed_value,
            self.anomaly.expected_value,
            self.verdict
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn order(s: &str) -> OrderNumber {
        OrderNumber::parse(s).unwrap()
    }

    #[test]
    fn test_order_number_rejects_non_conforming() {
        assert!(OrderNumber::parse("123456").is_none());
        assert!(OrderNumber::parse("1234567 ").is_none());
        assert_eq!(order("0012345").as_str(), "0012345");
        assert!(serde_json::from_str::<OrderNumber>("\"12\"").is_err());
    }

    #[test]
    fn test_order_map_accumulates() {
        let mut map = OrderMap::new();
        for qty in [3, 4, 5] {
            map.add(order("1234567"), qty);
        }
        assert_eq!(map.get(&order("1234567")), Some(12));
        assert_eq!(map.quantity("7654321"), 0);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_order_map_serializes_sorted() {
        let map: OrderMap = [(order("2000000"), 1), (order("1000000"), 2)].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"1000000":2,"2000000":1}"#
        );
    }

    #[test]
    fn test_review_line() {
        let review = Review {
            anomaly: Anomaly {
                block_header: "Row 3".to_string(),
                detail_lines: vec![],
                observed_value: "röd".to_string(),
                expected_value: "vit".to_string(),
            },
            verdict: Verdict::NotOk,
        };
        assert_eq!(review.to_line(), "Row 3 – röd – expected: vit – status: not OK");
    }

    #[test]
    fn test_verdict_parsing() {
        assert_eq!(Verdict::parse("OK"), Some(Verdict::Ok));
        assert_eq!(Verdict::parse("not-ok"), Some(Verdict::NotOk));
        assert_eq!(Verdict::parse("nej"), Some(Verdict::NotOk));
        assert_eq!(Verdict::parse("maybe"), None);
    }
}
