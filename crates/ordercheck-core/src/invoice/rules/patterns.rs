//! Common regex patterns for invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Invoice number: "Fakturanummer: 2024-0042", "Invoice no. INV-77", "Rechnungsnr 881"
    pub static ref INVOICE_ID: Regex = Regex::new(
        r"(?i)\b(?:faktura|invoice|rechnungs?)\s*(?:nr|nummer|no|number)\b\.?[\s:#.]*([A-Za-z0-9][A-Za-z0-9\-]*)"
    ).unwrap();

    // Single-language order label closing a block: "Order: 1234567", "Order/1234567"
    pub static ref ORDER_LABEL: Regex = Regex::new(
        r"\bOrder\s*[:/\-]?\s*(\d{7})\b"
    ).unwrap();

    // Bilingual order label opening a block: "Ordernr/Order no: 1234567"
    pub static ref BILINGUAL_ORDER_LABEL: Regex = Regex::new(
        r"(?i)\b(?:ordernr|ordernummer|order\s+nr|auftragsnr|auftragsnummer)\.?\s*/\s*order\s*(?:no|number|nr|#)\.?[\s:#]*(\d{7})\b"
    ).unwrap();
}

/// Build the quantity-with-unit pattern for a set of unit keywords.
///
/// The number may use `.`, `,` or no-break spaces as grouping and carry a
/// decimal part; capture group 1 holds the number text.
pub fn quantity_pattern(units: &[String]) -> Result<Regex, regex::Error> {
    let units: Vec<String> = units
        .iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .map(regex::escape)
        .collect();

    Regex::new(&format!(
        r"(?i)\b(\d{{1,3}}(?:[.,\u{{00a0}}\u{{202f}}]\d{{3}})+(?:[.,]\d+)?|\d+(?:[.,]\d+)?)\s*(?:{})\b",
        units.join("|")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_label() {
        assert_eq!(&ORDER_LABEL.captures("Order: 1234567").unwrap()[1], "1234567");
        assert_eq!(&ORDER_LABEL.captures("Ref Order/7654321 ").unwrap()[1], "7654321");
        assert_eq!(&ORDER_LABEL.captures("Order - 7654321").unwrap()[1], "7654321");
        assert!(ORDER_LABEL.captures("Order: 12345678").is_none());
        assert!(ORDER_LABEL.captures("Ordernr/Order no: 1234567").is_none());
    }

    #[test]
    fn test_bilingual_order_label() {
        assert_eq!(
            &BILINGUAL_ORDER_LABEL.captures("Ordernr/Order no: 1234567").unwrap()[1],
            "1234567"
        );
        assert_eq!(
            &BILINGUAL_ORDER_LABEL.captures("ORDERNUMMER / ORDER NUMBER 7654321").unwrap()[1],
            "7654321"
        );
        assert!(BILINGUAL_ORDER_LABEL.captures("Order: 1234567").is_none());
    }

    #[test]
    fn test_quantity_pattern_units() {
        let re = quantity_pattern(&["pcs".to_string(), "st".to_string()]).unwrap();
        let found: Vec<&str> = re
            .captures_iter("5 pcs, 1.234,5 PCS and 7st; 9 stycken; ABC12 pcs")
            .map(|c| c.get(1).unwrap().as_str())
            .collect();
        assert_eq!(found, vec!["5", "1.234,5", "7"]);
    }
}
