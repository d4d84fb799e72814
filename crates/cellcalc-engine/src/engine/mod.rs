//! Formula engine API.
//!
//! - [`Cell`], [`Content`] - Persistent cell state and content classification
//! - [`CellRef`], [`encode`], [`decode`] - Coordinates (A1 notation <-> row/col indices)
//! - [`parse`] - Formula text to [`Expr`] tree
//! - [`evaluate`], [`normalize`] - Tree evaluation with a reference callback
//! - [`format_number`] - Format values for display

mod ast;
mod cell;
mod cell_ref;
mod error;
mod eval;
mod format;
mod parser;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use cell::{Cell, Content, classify};
pub use cell_ref::{CellRef, decode, encode, is_coordinate_syntax, is_within_bounds};
pub use error::{CellError, InvalidCoordinate};
pub use eval::{EQ_TOLERANCE, ROUND_DIGITS, evaluate, normalize};
pub use format::format_number;
pub use parser::parse;
