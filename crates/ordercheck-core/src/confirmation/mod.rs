//! Confirmation document parsing.
//!
//! A confirmation lists order numbers and promised quantities in loosely
//! aligned columns. Three strategies recover the `order → quantity` mapping;
//! all of them share one line-state machine (see [`strategies`]) and return a
//! sum-accumulated [`OrderMap`].

mod strategies;

pub use strategies::{marker, positional, token_scan, ConfirmationRules};

use tracing::debug;

use crate::error::Result;
use crate::extract::OrderExtractor;
use crate::models::config::{ConfirmationConfig, ConfirmationStrategy};
use crate::models::order::OrderMap;
use crate::text::Document;

/// Confirmation parser dispatching to the configured strategy.
#[derive(Debug, Clone)]
pub struct ConfirmationParser {
    strategy: ConfirmationStrategy,
    rules: ConfirmationRules,
}

impl ConfirmationParser {
    /// Create a parser from configuration.
    pub fn new(config: &ConfirmationConfig) -> Result<Self> {
        Ok(Self {
            strategy: config.strategy,
            rules: ConfirmationRules::from_config(config)?,
        })
    }

    /// Override the configured strategy.
    pub fn with_strategy(mut self, strategy: ConfirmationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> ConfirmationStrategy {
        self.strategy
    }

    /// Parse confirmation lines.
    pub fn parse_lines<'a, I>(&self, lines: I) -> OrderMap
    where
        I: IntoIterator<Item = &'a str>,
    {
        let orders = match self.strategy {
            ConfirmationStrategy::Positional => positional(lines, &self.rules),
            ConfirmationStrategy::TokenScan => token_scan(lines, &self.rules),
            ConfirmationStrategy::Marker => marker(lines, &self.rules),
        };

        debug!(
            "Confirmation ({:?}): {} orders, {} pcs",
            self.strategy,
            orders.len(),
            orders.total()
        );
        orders
    }

    /// Parse a confirmation document. Page breaks carry no meaning here.
    pub fn parse(&self, document: &Document) -> OrderMap {
        self.parse_lines(document.lines())
    }
}

impl Default for ConfirmationParser {
    fn default() -> Self {
        Self {
            strategy: ConfirmationStrategy::default(),
            rules: ConfirmationRules::default(),
        }
    }
}

impl OrderExtractor for ConfirmationParser {
    fn extract_orders(&self, document: &Document) -> OrderMap {
        self.parse(document)
    }
}
