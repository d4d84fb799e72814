//! cellcalc-core - UI-agnostic grid document + text storage.

pub mod document;
pub mod error;
pub mod storage;

pub use document::{CellView, Document};
pub use error::{CalcError, Result};

pub use cellcalc_engine::engine::{Cell, CellError, CellRef};
