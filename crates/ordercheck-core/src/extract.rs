//! Contract shared by the confirmation and invoice parsers.

use crate::error::{OrderCheckError, Result};
use crate::models::order::OrderMap;
use crate::text::Document;

/// Trait for anything that turns a document into order quantities.
pub trait OrderExtractor {
    /// Extract the order quantities of a document.
    fn extract_orders(&self, document: &Document) -> OrderMap;
}

/// Plausibility guard for quantities read from extracted text.
///
/// With an upper bound set, only `0 < qty < max` is accepted; dates, article
/// numbers and other large numbers that land in a quantity position are
/// rejected. Without a bound every non-negative integer is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuantityBound {
    max: Option<u64>,
}

impl QuantityBound {
    /// Create a bound from an optional exclusive maximum.
    pub fn new(max: Option<u64>) -> Result<Self> {
        match max {
            Some(m) if m <= 1 => Err(OrderCheckError::InvalidArgument(format!(
                "max_quantity must be greater than 1, got {m}"
            ))),
            _ => Ok(Self { max }),
        }
    }

    /// A bound that accepts every quantity.
    pub fn unbounded() -> Self {
        Self { max: None }
    }

    pub fn max(&self) -> Option<u64> {
        self.max
    }

    pub fn accepts(&self, quantity: u64) -> bool {
        match self.max {
            Some(max) => quantity > 0 && quantity < max,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_is_exclusive() {
        let bound = QuantityBound::new(Some(500)).unwrap();
        assert!(bound.accepts(1));
        assert!(bound.accepts(499));
        assert!(!bound.accepts(500));
        assert!(!bound.accepts(1000));
        assert!(!bound.accepts(0));
    }

    #[test]
    fn test_unbounded_accepts_zero_and_large() {
        let bound = QuantityBound::unbounded();
        assert!(bound.accepts(0));
        assert!(bound.accepts(1_000_000));
    }

    #[test]
    fn test_degenerate_bound_is_rejected() {
        assert!(matches!(
            QuantityBound::new(Some(1)),
            Err(OrderCheckError::InvalidArgument(_))
        ));
    }
}
