//! Cell coordinate parsing and formatting.
//!
//! Converts between spreadsheet-style addresses (e.g., "A1", "B2", "AA100")
//! and zero-indexed row/column coordinates. Columns use bijective base-26
//! letters (no zero digit), rows are printed 1-based.
//!
//! # Examples
//!
//! ```
//! use cellcalc_engine::engine::CellRef;
//!
//! let cell: CellRef = "B3".parse().unwrap();
//! assert_eq!(cell.col, 1); // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use super::error::InvalidCoordinate;

/// A reference to a cell by row and column indices (0-indexed).
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }

    /// True when this coordinate lies inside a grid of `rows` x `cols`.
    pub fn is_within(&self, rows: usize, cols: usize) -> bool {
        self.row < rows && self.col < cols
    }

    fn parse_a1(name: &str) -> Option<CellRef> {
        let caps = coordinate_re().captures(name)?;
        let letters = &caps["letters"];
        let numbers = &caps["numbers"];

        let mut col_acc = 0usize;
        for c in letters.to_ascii_uppercase().bytes() {
            let digit = (c - b'A') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        let col = col_acc.checked_sub(1)?;

        let row = numbers.parse::<usize>().ok()?.checked_sub(1)?;

        Some(CellRef::new(row, col))
    }
}

impl std::str::FromStr for CellRef {
    type Err = InvalidCoordinate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_a1(s).ok_or_else(|| InvalidCoordinate(s.to_string()))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row as u128 + 1)
    }
}

fn coordinate_re() -> &'static Regex {
    static COORD_RE: OnceLock<Regex> = OnceLock::new();
    COORD_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$")
            .expect("coordinate regex must compile")
    })
}

/// True when `text` has the shape of a coordinate (letters then digits),
/// whether or not it decodes to an addressable index.
pub fn is_coordinate_syntax(text: &str) -> bool {
    coordinate_re().is_match(text)
}

/// Encode zero-indexed `(row, col)` as an uppercase address ("A1" is `(0, 0)`).
pub fn encode(row: usize, col: usize) -> String {
    CellRef::new(row, col).to_string()
}

/// Decode an address (case-insensitive) into zero-indexed `(row, col)`.
pub fn decode(address: &str) -> Result<(usize, usize), InvalidCoordinate> {
    let cell: CellRef = address.parse()?;
    Ok((cell.row, cell.col))
}

/// True only for syntactically valid addresses inside a `rows` x `cols` grid.
pub fn is_within_bounds(address: &str, rows: usize, cols: usize) -> bool {
    address
        .parse::<CellRef>()
        .is_ok_and(|cell| cell.is_within(rows, cols))
}
