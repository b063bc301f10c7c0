//! Invoice document parsing.
//!
//! Invoices group their lines in per-order blocks. The parser finds the
//! invoice number, resolves the anchor convention of the document and sums
//! the unit-suffixed quantities of each block into an [`OrderMap`].

mod anchors;
pub mod rules;

pub use anchors::{accrue, infer_accrual, Accrual, Accrued, AnchorLabel, InvoiceLayout};

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::extract::{OrderExtractor, QuantityBound};
use crate::models::config::{InvoiceConfig, InvoiceStrategy};
use crate::models::order::{OrderMap, INVOICE_ID_PLACEHOLDER};
use crate::text::Document;

use rules::{extract_invoice_id, QuantityExtractor};

/// Result of parsing an invoice document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceExtraction {
    /// Invoiced quantities per order.
    pub orders: OrderMap,
    /// First invoice number found in the document.
    pub invoice_id: Option<String>,
    /// Anchor convention that was applied.
    pub layout: InvoiceLayout,
    /// Quantities dropped because no anchor owned their line.
    pub unanchored: usize,
}

impl InvoiceExtraction {
    /// The invoice number, or a placeholder when none was found.
    pub fn invoice_id_or_placeholder(&self) -> &str {
        self.invoice_id.as_deref().unwrap_or(INVOICE_ID_PLACEHOLDER)
    }
}

/// Compiled invoice settings shared by the layout strategies.
#[derive(Debug, Clone)]
pub struct InvoiceRules {
    pub quantities: QuantityExtractor,
    pub carry_context: bool,
}

impl InvoiceRules {
    /// Compile rules from configuration.
    pub fn from_config(config: &InvoiceConfig) -> Result<Self> {
        Ok(Self {
            quantities: QuantityExtractor::new(&config.units)?
                .with_bound(QuantityBound::new(config.max_quantity)?),
            carry_context: config.carry_context_across_pages,
        })
    }
}

fn extract_with(document: &Document, rules: &InvoiceRules, layout: InvoiceLayout) -> InvoiceExtraction {
    let accrued = accrue(document, layout, &rules.quantities, rules.carry_context);
    InvoiceExtraction {
        orders: accrued.orders,
        invoice_id: extract_invoice_id(document.lines()),
        layout,
        unanchored: accrued.unanchored,
    }
}

/// Reverse-anchor strategy: `Order: 1234567` lines close the block above them.
pub fn reverse_anchor(document: &Document, rules: &InvoiceRules) -> InvoiceExtraction {
    extract_with(document, rules, InvoiceLayout::REVERSE_ANCHOR)
}

/// Forward-block strategy: bilingual `Ordernr/Order no` lines open the block
/// below them.
pub fn forward_block(document: &Document, rules: &InvoiceRules) -> InvoiceExtraction {
    extract_with(document, rules, InvoiceLayout::FORWARD_BLOCK)
}

/// Pick the layout from the labels present in the document.
///
/// Bilingual labels select the forward-block layout. Otherwise `Order:`
/// labels are used and their direction is inferred from where the
/// unanchored quantities sit (see [`infer_accrual`]).
pub fn detect_layout(document: &Document, rules: &InvoiceRules) -> InvoiceLayout {
    if AnchorLabel::Bilingual.present_in(document) {
        return InvoiceLayout::FORWARD_BLOCK;
    }
    match infer_accrual(document, &rules.quantities) {
        Accrual::Above => InvoiceLayout::REVERSE_ANCHOR,
        Accrual::Below => InvoiceLayout::FORWARD_ANCHOR,
    }
}

/// Invoice parser dispatching to the configured strategy.
#[derive(Debug, Clone)]
pub struct InvoiceParser {
    strategy: InvoiceStrategy,
    rules: InvoiceRules,
}

impl InvoiceParser {
    /// Create a parser from configuration.
    pub fn new(config: &InvoiceConfig) -> Result<Self> {
        Ok(Self {
            strategy: config.strategy,
            rules: InvoiceRules::from_config(config)?,
        })
    }

    /// Override the configured strategy.
    pub fn with_strategy(mut self, strategy: InvoiceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Keep the current order open across page breaks.
    pub fn with_page_carry(mut self, carry: bool) -> Self {
        self.rules.carry_context = carry;
        self
    }

    pub fn strategy(&self) -> InvoiceStrategy {
        self.strategy
    }

    /// Parse an invoice document.
    pub fn parse(&self, document: &Document) -> InvoiceExtraction {
        let extraction = match self.strategy {
            InvoiceStrategy::ReverseAnchor => reverse_anchor(document, &self.rules),
            InvoiceStrategy::ForwardBlock => forward_block(document, &self.rules),
            InvoiceStrategy::Auto => {
                let layout = detect_layout(document, &self.rules);
                extract_with(document, &self.rules, layout)
            }
        };

        debug!(
            "Invoice {} ({:?}/{:?}): {} orders, {} pcs, {} unanchored quantities",
            extraction.invoice_id_or_placeholder(),
            extraction.layout.label,
            extraction.layout.accrual,
            extraction.orders.len(),
            extraction.orders.total(),
            extraction.unanchored
        );
        extraction
    }

    /// Parse invoice text with form-feed page breaks.
    pub fn parse_text(&self, text: &str) -> InvoiceExtraction {
        self.parse(&Document::from_text(text))
    }
}

impl Default for InvoiceParser {
    fn default() -> Self {
        Self::new(&InvoiceConfig::default()).expect("default invoice config is valid")
    }
}

impl OrderExtractor for InvoiceParser {
    fn extract_orders(&self, document: &Document) -> OrderMap {
        self.parse(document).orders
    }
}
