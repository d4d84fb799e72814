//! Cell data and content classification.
//!
//! A [`Cell`] holds only persistent state: the raw text the user typed and
//! the outcome of the last committed recalculation. Per-pass bookkeeping
//! (in-progress markers, pending values) lives with the pass, not here.

use super::error::CellError;
use super::format::format_number;

/// A cell in the grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    /// Raw user text, stored verbatim. The source of truth.
    pub expression: String,
    /// Last committed numeric result.
    pub value: f64,
    /// The content is a literal that is not a number and is shown verbatim.
    pub is_text: bool,
    /// Set when the last pass failed for this cell.
    pub error: Option<CellError>,
}

/// How a cell's (trimmed) text should be treated.
#[derive(Debug, PartialEq)]
pub enum Content<'a> {
    Empty,
    /// Formula body, without the leading `=`.
    Formula(&'a str),
    Number(f64),
    Text,
}

impl Cell {
    pub fn new(expression: impl Into<String>) -> Cell {
        Cell {
            expression: expression.into(),
            ..Cell::default()
        }
    }

    /// Short error tag (`"CYCLE"`, `"REF"`, ...) if the cell is in error.
    pub fn error_tag(&self) -> Option<&'static str> {
        self.error.as_ref().map(CellError::tag)
    }

    /// Classify the cell's content. Bare numbers that overflow `f64` fail.
    pub fn content(&self) -> Result<Content<'_>, CellError> {
        classify(&self.expression)
    }

    /// Text to render for this cell. Errors take priority over values.
    pub fn display_text(&self) -> String {
        if let Some(err) = &self.error {
            return err.display_tag();
        }
        let trimmed = self.expression.trim();
        if trimmed.is_empty() {
            String::new()
        } else if self.is_text {
            trimmed.to_string()
        } else {
            format_number(self.value)
        }
    }
}

/// Classify raw cell text.
/// - Empty string or whitespace -> Empty
/// - Starts with '=' -> Formula (without the '=')
/// - Decimal number -> Number
/// - Otherwise -> Text
pub fn classify(input: &str) -> Result<Content<'_>, CellError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Content::Empty);
    }

    if let Some(formula) = trimmed.strip_prefix('=') {
        return Ok(Content::Formula(formula));
    }

    // `inf` and `nan` parse as f64 but are words, not numbers.
    let unsigned = trimmed.trim_start_matches(['+', '-']);
    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return Ok(Content::Text);
    }

    match trimmed.parse::<f64>() {
        Ok(n) if n.is_infinite() => Err(CellError::Overflow),
        Ok(n) => Ok(Content::Number(n)),
        Err(_) => Ok(Content::Text),
    }
}
