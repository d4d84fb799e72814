//! Error kinds produced while evaluating a single cell.
//!
//! A [`CellError`] never escapes a recalculation pass: the grid stores it on
//! the offending cell and renders its [`tag`](CellError::tag) instead of a value.

use thiserror::Error;

/// Why a cell failed to produce a value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CellError {
    /// Malformed formula text.
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// Reference to a coordinate that is invalid or outside the grid.
    #[error("Invalid reference: {0}")]
    Ref(String),

    /// Reference to a cell that is itself in an error state.
    #[error("Referenced cell {0} holds an error")]
    Dependency(String),

    /// Reference to a cell holding non-numeric text.
    #[error("Referenced cell {0} is not numeric")]
    Value(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Numeric overflow")]
    Overflow,

    #[error("Result is not a number")]
    NotANumber,

    /// Circular dependency. Carries the failing cell, which lies on the loop.
    #[error("Circular reference through {0}")]
    Cycle(String),
}

impl CellError {
    /// Short machine-readable tag stored on the failing cell.
    pub fn tag(&self) -> &'static str {
        match self {
            CellError::Syntax(_) => "SYNTAX",
            CellError::Ref(_) => "REF",
            CellError::Dependency(_) => "DEP",
            CellError::Value(_) => "VALUE",
            CellError::DivisionByZero => "DIV0",
            CellError::Overflow => "OVERFLOW",
            CellError::NotANumber => "NAN",
            CellError::Cycle(_) => "CYCLE",
        }
    }

    /// Text shown in place of a value, e.g. `#CYCLE!`.
    pub fn display_tag(&self) -> String {
        format!("#{}!", self.tag())
    }
}

/// An address that does not match `[A-Za-z]+[0-9]+` or is out of index range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid cell coordinate: {0:?}")]
pub struct InvalidCoordinate(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_stable() {
        assert_eq!(CellError::Cycle("A1".into()).tag(), "CYCLE");
        assert_eq!(CellError::DivisionByZero.tag(), "DIV0");
        assert_eq!(CellError::Ref("Z99".into()).display_tag(), "#REF!");
    }
}
