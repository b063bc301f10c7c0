//! Confirmation vs invoice reconciliation.

use std::collections::BTreeSet;

use tracing::debug;

use crate::extract::OrderExtractor;
use crate::models::order::{OrderMap, OrderNumber, Reconciliation, ReconciliationRow};
use crate::text::Document;

/// Reconcile confirmed against invoiced quantities.
///
/// Emits one row per order number present in either map, in ascending order.
/// A missing side counts as zero and quantities must match exactly.
pub fn reconcile(confirmed: &OrderMap, invoiced: &OrderMap) -> Reconciliation {
    let keys: BTreeSet<&OrderNumber> = confirmed.keys().chain(invoiced.keys()).collect();

    let rows: Vec<ReconciliationRow> = keys
        .into_iter()
        .map(|order| {
            let confirmed_qty = confirmed.get(order).unwrap_or(0);
            let invoiced_qty = invoiced.get(order).unwrap_or(0);
            ReconciliationRow {
                order_number: order.clone(),
                confirmed_qty,
                invoiced_qty,
                matches: confirmed_qty == invoiced_qty,
            }
        })
        .collect();

    let result = Reconciliation { rows };
    debug!(
        "Reconciled {} orders, {} mismatches",
        result.len(),
        result.mismatches().count()
    );
    result
}

/// Extract both documents with their parsers and reconcile the results.
pub fn reconcile_documents<C, I>(
    confirmation_parser: &C,
    confirmation: &Document,
    invoice_parser: &I,
    invoice: &Document,
) -> Reconciliation
where
    C: OrderExtractor + ?Sized,
    I: OrderExtractor + ?Sized,
{
    let confirmed = confirmation_parser.extract_orders(confirmation);
    let invoiced = invoice_parser.extract_orders(invoice);
    reconcile(&confirmed, &invoiced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirmation::ConfirmationParser;
    use crate::invoice::InvoiceParser;
    use pretty_assertions::assert_eq;

    fn map(entries: &[(&str, u64)]) -> OrderMap {
        entries
            .iter()
            .map(|(o, q)| (OrderNumber::parse(o).unwrap(), *q))
            .collect()
    }

    #[test]
    fn test_union_sorted_and_defaults_to_zero() {
        let confirmed = map(&[("3000000", 5), ("1000000", 2)]);
        let invoiced = map(&[("2000000", 1), ("1000000", 2)]);

        let result = reconcile(&confirmed, &invoiced);
        let keys: Vec<&str> = result.iter().map(|r| r.order_number.as_str()).collect();
        assert_eq!(keys, vec!["1000000", "2000000", "3000000"]);

        assert!(result.rows[0].matches);
        assert_eq!((result.rows[1].confirmed_qty, result.rows[1].invoiced_qty), (0, 1));
        assert_eq!((result.rows[2].confirmed_qty, result.rows[2].invoiced_qty), (5, 0));
        assert_eq!(result.mismatches().count(), 2);
        assert!(!result.is_clean());
    }

    #[test]
    fn test_length_equals_union_size() {
        let confirmed = map(&[("1000000", 1), ("2000000", 1), ("4000000", 1)]);
        let invoiced = map(&[("2000000", 1), ("3000000", 1)]);
        assert_eq!(reconcile(&confirmed, &invoiced).len(), 4);
    }

    #[test]
    fn test_empty_inputs() {
        let result = reconcile(&OrderMap::new(), &OrderMap::new());
        assert!(result.is_empty());
        assert!(result.is_clean());
    }

    #[test]
    fn test_row_difference() {
        let result = reconcile(&map(&[("1234567", 10)]), &map(&[("1234567", 5)]));
        assert_eq!(result.rows[0].difference(), -5);
    }

    #[test]
    fn test_end_to_end_mismatch() {
        let confirmation = Document::from_page_lines([["1 GL-44 Isolerglas 1234567 1200x800 10"]]);
        let invoice = Document::from_page_lines([["Order: 1234567", "5 pcs"]]);

        let result = reconcile_documents(
            &ConfirmationParser::default(),
            &confirmation,
            &InvoiceParser::default(),
            &invoice,
        );

        assert_eq!(
            result.rows,
            vec![ReconciliationRow {
                order_number: OrderNumber::parse("1234567").unwrap(),
                confirmed_qty: 10,
                invoiced_qty: 5,
                matches: false,
            }]
        );
    }
}
