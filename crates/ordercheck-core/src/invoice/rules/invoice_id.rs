//! Invoice number extraction.

use super::patterns::INVOICE_ID;
use super::{ExtractionMatch, FieldExtractor};

/// Invoice number extractor.
pub struct InvoiceIdExtractor;

impl InvoiceIdExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InvoiceIdExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for InvoiceIdExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        INVOICE_ID
            .captures_iter(text)
            .filter_map(|caps| {
                let full_match = caps.get(0)?;
                let id = caps.get(1)?.as_str().trim_end_matches('-');
                if id.is_empty() {
                    return None;
                }
                Some(
                    ExtractionMatch::new(id.to_string(), full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                )
            })
            .collect()
    }
}

/// First invoice number found in the given lines.
pub fn extract_invoice_id<'a, I>(lines: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let extractor = InvoiceIdExtractor::new();
    lines
        .into_iter()
        .find_map(|line| extractor.extract(line))
        .map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_invoice_id_labels() {
        assert_eq!(
            extract_invoice_id(["Fakturanummer: 2024-0042"]),
            Some("2024-0042".to_string())
        );
        assert_eq!(
            extract_invoice_id(["Fakturanr 881"]),
            Some("881".to_string())
        );
        assert_eq!(
            extract_invoice_id(["Invoice no. INV-77 date 2024-01-02"]),
            Some("INV-77".to_string())
        );
        assert_eq!(
            extract_invoice_id(["Invoice number: A1"]),
            Some("A1".to_string())
        );
    }

    #[test]
    fn test_first_match_wins() {
        let lines = ["Sida 1", "Fakturanr: 100", "Fakturanr: 200"];
        assert_eq!(extract_invoice_id(lines), Some("100".to_string()));
    }

    #[test]
    fn test_missing_invoice_id() {
        assert_eq!(extract_invoice_id(["Invoice date 2024-01-02", "Total 5 pcs"]), None);
        assert_eq!(extract_invoice_id(std::iter::empty()), None);
    }
}
