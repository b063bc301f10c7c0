//! Order anchors and block accrual for invoice pages.
//!
//! An anchor is a line carrying an order label. Depending on the layout, an
//! anchor owns the lines above it (up to the previous anchor) or the lines
//! below it (up to the next anchor). Quantities found on lines no anchor owns
//! are dropped and counted.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::rules::{FieldExtractor, QuantityExtractor, BILINGUAL_ORDER_LABEL, ORDER_LABEL};
use crate::models::order::{OrderMap, OrderNumber};
use crate::text::{Document, Page};

/// Which label marks an order anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorLabel {
    /// `Order: 1234567`
    Order,
    /// `Ordernr/Order no: 1234567`
    Bilingual,
}

impl AnchorLabel {
    /// Order number anchored by a line, if any.
    pub fn anchor(&self, line: &str) -> Option<OrderNumber> {
        let pattern = match self {
            Self::Order => &*ORDER_LABEL,
            Self::Bilingual => &*BILINGUAL_ORDER_LABEL,
        };
        pattern
            .captures(line)
            .and_then(|caps| OrderNumber::parse(&caps[1]))
    }

    /// Whether any line of the document carries this label.
    pub fn present_in(&self, document: &Document) -> bool {
        document.lines().any(|line| self.anchor(line).is_some())
    }
}

/// Which lines an anchor owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Accrual {
    /// Lines above the anchor, scanned bottom-up.
    Above,
    /// Lines below the anchor, scanned top-down.
    Below,
}

/// Anchor convention applied to an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLayout {
    pub label: AnchorLabel,
    pub accrual: Accrual,
}

impl InvoiceLayout {
    /// `Order:` labels closing the block above them.
    pub const REVERSE_ANCHOR: Self = Self {
        label: AnchorLabel::Order,
        accrual: Accrual::Above,
    };

    /// Bilingual labels opening the block below them.
    pub const FORWARD_BLOCK: Self = Self {
        label: AnchorLabel::Bilingual,
        accrual: Accrual::Below,
    };

    /// `Order:` labels opening the block below them.
    pub const FORWARD_ANCHOR: Self = Self {
        label: AnchorLabel::Order,
        accrual: Accrual::Below,
    };
}

/// Result of accruing quantities into anchored blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accrued {
    pub orders: OrderMap,
    /// Quantities found outside any anchored block.
    pub unanchored: usize,
}

/// Accrue quantities into the orders anchoring them.
///
/// With `carry_context` unset the current order is cleared at every page
/// boundary, so a block never spans two pages.
pub fn accrue(
    document: &Document,
    layout: InvoiceLayout,
    quantities: &QuantityExtractor,
    carry_context: bool,
) -> Accrued {
    let mut accrued = Accrued::default();
    let mut current: Option<OrderNumber> = None;

    let pages: Vec<&Page> = match layout.accrual {
        Accrual::Below => document.pages.iter().collect(),
        Accrual::Above => document.pages.iter().rev().collect(),
    };

    for page in pages {
        if !carry_context {
            current = None;
        }

        let lines: Vec<&String> = match layout.accrual {
            Accrual::Below => page.lines.iter().collect(),
            Accrual::Above => page.lines.iter().rev().collect(),
        };

        for line in lines {
            if let Some(order) = layout.label.anchor(line) {
                trace!("Page {}: anchor {}", page.number, order);
                current = Some(order);
                continue;
            }

            let found = quantities.extract_all(line);
            if found.is_empty() {
                continue;
            }

            match &current {
                Some(order) => {
                    for m in found {
                        accrued.orders.add(order.clone(), m.value);
                    }
                }
                None => {
                    trace!("Page {}: {} quantities without anchor", page.number, found.len());
                    accrued.unanchored += found.len();
                }
            }
        }
    }

    accrued
}

/// Infer whether `Order:` anchors own the lines above or below them.
///
/// Counts quantity matches above each page's first anchor and below each
/// page's last anchor. [`Accrual::Below`] is chosen only when quantities sit
/// below the last anchor and no page has any quantity above its first anchor;
/// footer totals under the last order never flip a reverse layout.
pub fn infer_accrual(document: &Document, quantities: &QuantityExtractor) -> Accrual {
    let mut above = 0usize;
    let mut below = 0usize;

    for page in &document.pages {
        let anchors: Vec<usize> = page
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| AnchorLabel::Order.anchor(line).is_some())
            .map(|(i, _)| i)
            .collect();

        let (Some(&first), Some(&last)) = (anchors.first(), anchors.last()) else {
            continue;
        };

        above += page.lines[..first]
            .iter()
            .map(|l| quantities.count_matches(l))
            .sum::<usize>();
        below += page.lines[last + 1..]
            .iter()
            .map(|l| quantities.count_matches(l))
            .sum::<usize>();
    }

    trace!("Orphan quantities: {} above, {} below", above, below);
    if above == 0 && below > 0 {
        Accrual::Below
    } else {
        Accrual::Above
    }
}
