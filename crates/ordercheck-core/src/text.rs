//! Line and page splitting shared by every parser.

use serde::{Deserialize, Serialize};

/// Page separator emitted by most PDF text extractors.
pub const PAGE_BREAK: char = '\u{000c}';

/// Width of an order number token.
pub const ORDER_NUMBER_LEN: usize = 7;

/// A single page of extracted text, split into lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed).
    pub number: u32,
    /// Lines in reading order, right-trimmed.
    pub lines: Vec<String>,
}

impl Page {
    /// Build a page from raw text.
    pub fn from_text(number: u32, text: &str) -> Self {
        Self {
            number,
            lines: split_lines(text),
        }
    }

    /// Whether the page has no non-blank line.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }
}

/// A document as an ordered sequence of pages.
///
/// Page grouping matters for the invoice parser, whose order context may
/// reset at page boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    /// Build a document from text, splitting pages on form feeds.
    pub fn from_text(text: &str) -> Self {
        Self::from_pages(text.split(PAGE_BREAK))
    }

    /// Build a document from per-page text.
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| Page::from_text(i as u32 + 1, text.as_ref()))
            .collect();
        Self { pages }
    }

    /// Build a document from already split page lines.
    pub fn from_page_lines<P, L, S>(pages: P) -> Self
    where
        P: IntoIterator<Item = L>,
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, lines)| Page {
                number: i as u32 + 1,
                lines: lines.into_iter().map(Into::into).collect(),
            })
            .collect();
        Self { pages }
    }

    /// All lines of all pages in reading order.
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.pages
            .iter()
            .flat_map(|p| p.lines.iter().map(String::as_str))
    }

    /// Total number of lines.
    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|p| p.lines.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(Page::is_blank)
    }
}

/// Split text into right-trimmed lines, accepting `\n`, `\r\n` and `\r`.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text
        .lines()
        .flat_map(|l| l.split('\r'))
        .map(|l| l.trim_end().to_string())
        .collect();

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Whitespace-delimited tokens of a line.
pub fn tokens(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(line: &str) -> String {
    tokens(line).join(" ")
}

/// Whether a token is a fixed-width order number.
pub fn is_order_number(token: &str) -> bool {
    token.len() == ORDER_NUMBER_LEN && token.bytes().all(|b| b.is_ascii_digit())
}

/// Whether a token consists only of ASCII digits.
pub fn is_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Whether a line holds nothing but a short (1-3 digit) number.
pub fn short_number_line(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    (trimmed.len() <= 3 && is_digits(trimmed)).then_some(trimmed)
}
