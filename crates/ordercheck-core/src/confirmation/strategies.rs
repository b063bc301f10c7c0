//! Line-scan strategies for confirmation documents.
//!
//! Every strategy feeds the same state machine. A recognized order opens a
//! context; if no plausible quantity sits on the same line the context stays
//! open, and the next line that holds nothing but a 1-3 digit number is taken
//! as its quantity, after which the context closes. Unparseable tokens are
//! skipped and no line aborts the scan.

use regex::Regex;
use tracing::trace;

use crate::error::{OrderCheckError, Result};
use crate::extract::QuantityBound;
use crate::models::config::ConfirmationConfig;
use crate::models::order::{OrderMap, OrderNumber};
use crate::text::{is_digits, is_order_number, short_number_line, tokens};

/// Compiled confirmation settings shared by all strategies.
#[derive(Debug, Clone)]
pub struct ConfirmationRules {
    /// Zero-based token index of the order number.
    pub order_column: usize,
    /// Minimum token count of a positional line.
    pub min_tokens: usize,
    /// Quantity plausibility guard.
    pub bound: QuantityBound,
    marker: Regex,
}

impl ConfirmationRules {
    /// Compile rules from configuration.
    pub fn from_config(config: &ConfirmationConfig) -> Result<Self> {
        if config.order_column + 1 >= config.min_tokens {
            return Err(OrderCheckError::InvalidArgument(format!(
                "order_column ({}) must leave at least one token before min_tokens ({})",
                config.order_column, config.min_tokens
            )));
        }

        Ok(Self {
            order_column: config.order_column,
            min_tokens: config.min_tokens,
            bound: QuantityBound::new(config.max_quantity)?,
            marker: marker_pattern(&config.marker_keywords)?,
        })
    }

    /// Order number asserted by a marker line, e.g. `Reorder: 1234567`.
    pub fn marker_order(&self, line: &str) -> Option<OrderNumber> {
        self.marker
            .captures(line)
            .and_then(|caps| OrderNumber::parse(&caps[1]))
    }

    /// Parse and bound-check a quantity token.
    fn quantity(&self, token: &str) -> Option<u64> {
        if !is_digits(token) {
            return None;
        }
        match token.parse::<u64>() {
            Ok(qty) if self.bound.accepts(qty) => Some(qty),
            Ok(qty) => {
                trace!("Rejected implausible quantity {}", qty);
                None
            }
            Err(_) => None,
        }
    }
}

impl Default for ConfirmationRules {
    fn default() -> Self {
        Self {
            order_column: 3,
            min_tokens: 6,
            bound: QuantityBound::new(Some(500)).unwrap_or_default(),
            marker: default_marker(),
        }
    }
}

fn marker_pattern(keywords: &[String]) -> Result<Regex> {
    let keywords: Vec<String> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(regex::escape)
        .collect();

    if keywords.is_empty() {
        return Err(OrderCheckError::Config(
            "confirmation.marker_keywords must not be empty".to_string(),
        ));
    }

    Regex::new(&format!(
        r"(?i)\b(?:{})\b[\s:#./-]*(\d{{7}})\b",
        keywords.join("|")
    ))
    .map_err(|e| OrderCheckError::Config(format!("invalid marker keyword: {e}")))
}

fn default_marker() -> Regex {
    lazy_static::lazy_static! {
        static ref DEFAULT_MARKER: Regex =
            Regex::new(r"(?i)\b(?:reorder|re-order|ombeställning)\b[\s:#./-]*(\d{7})\b").unwrap();
    }
    DEFAULT_MARKER.clone()
}

/// An order recognized on a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LineHit {
    order: OrderNumber,
    quantity: Option<u64>,
}

/// The order currently awaiting (or holding) a quantity.
#[derive(Debug)]
struct OpenOrder {
    order: OrderNumber,
    has_quantity: bool,
}

struct Scanner<'r> {
    rules: &'r ConfirmationRules,
    orders: OrderMap,
    open: Option<OpenOrder>,
}

impl<'r> Scanner<'r> {
    fn new(rules: &'r ConfirmationRules) -> Self {
        Self {
            rules,
            orders: OrderMap::new(),
            open: None,
        }
    }

    fn open(&mut self, order: OrderNumber) {
        self.open = Some(OpenOrder {
            order,
            has_quantity: false,
        });
    }

    fn hit(&mut self, hit: LineHit) {
        let has_quantity = hit.quantity.is_some();
        if let Some(qty) = hit.quantity {
            self.orders.add(hit.order.clone(), qty);
        }
        self.open = Some(OpenOrder {
            order: hit.order,
            has_quantity,
        });
    }

    /// Try the line as the pending quantity of the open order.
    fn fallback(&mut self, line: &str) {
        let Some(open) = self.open.as_ref() else {
            return;
        };
        if open.has_quantity {
            return;
        }
        let Some(qty) = short_number_line(line).and_then(|t| self.rules.quantity(t)) else {
            return;
        };

        trace!("Fallback quantity {} for order {}", qty, open.order);
        let order = open.order.clone();
        self.orders.add(order, qty);
        self.open = None;
    }

    fn run<'a, I, F>(mut self, lines: I, markers: bool, recognize: F) -> OrderMap
    where
        I: IntoIterator<Item = &'a str>,
        F: Fn(&ConfirmationRules, &[&str]) -> Vec<LineHit>,
    {
        for line in lines {
            if markers {
                if let Some(order) = self.rules.marker_order(line) {
                    trace!("Marker line opens order {}", order);
                    self.open(order);
                    continue;
                }
            }

            let hits = recognize(self.rules, &tokens(line));
            if hits.is_empty() {
                self.fallback(line);
            } else {
                for hit in hits {
                    self.hit(hit);
                }
            }
        }
        self.orders
    }
}

fn positional_hits(rules: &ConfirmationRules, tokens: &[&str]) -> Vec<LineHit> {
    if tokens.len() < rules.min_tokens {
        return Vec::new();
    }
    let Some(order) = tokens.get(rules.order_column).and_then(|t| OrderNumber::parse(t)) else {
        return Vec::new();
    };
    let quantity = tokens.last().and_then(|t| rules.quantity(t));
    vec![LineHit { order, quantity }]
}

fn token_scan_hits(rules: &ConfirmationRules, tokens: &[&str]) -> Vec<LineHit> {
    tokens
        .iter()
        .enumerate()
        .filter_map(|(i, token)| {
            let order = OrderNumber::parse(token)?;
            let quantity = tokens[i + 1..]
                .iter()
                .take_while(|t| !is_order_number(t))
                .find(|t| is_digits(t))
                .and_then(|t| rules.quantity(t));
            Some(LineHit { order, quantity })
        })
        .collect()
}

/// Positional-column strategy: on lines with at least `min_tokens` tokens whose
/// `order_column` token is an order number, the last token is the quantity.
pub fn positional<'a, I>(lines: I, rules: &ConfirmationRules) -> OrderMap
where
    I: IntoIterator<Item = &'a str>,
{
    Scanner::new(rules).run(lines, false, positional_hits)
}

/// Token-scan strategy: every order number token on a line, with the first
/// later integer token before the next order number as its quantity.
pub fn token_scan<'a, I>(lines: I, rules: &ConfirmationRules) -> OrderMap
where
    I: IntoIterator<Item = &'a str>,
{
    Scanner::new(rules).run(lines, false, token_scan_hits)
}

/// Marker strategy: reorder marker lines open an order authoritatively; other
/// lines follow the positional rule.
pub fn marker<'a, I>(lines: I, rules: &ConfirmationRules) -> OrderMap
where
    I: IntoIterator<Item = &'a str>,
{
    Scanner::new(rules).run(lines, true, positional_hits)
}
