use cellcalc_engine::engine::{Cell, CellRef};
use std::collections::HashMap;

/// UI-agnostic spreadsheet document: the cell store, its bounds and the
/// snapshot used to detect unsaved edits.
///
/// Every mutating edit runs a full recalculation before returning, so the
/// committed values are always consistent with the stored expressions.
#[derive(Debug, Default)]
pub struct Document {
    /// Sparse cell storage. Absent entries are empty cells.
    pub(crate) cells: HashMap<CellRef, Cell>,
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    /// Exported text at the last save/load, compared by `is_modified`.
    pub(crate) saved_snapshot: String,
}

/// What a presentation layer needs to draw one cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellView {
    pub display: String,
    pub is_error: bool,
    pub is_text: bool,
}

impl CellView {
    pub(crate) fn of(cell: &Cell) -> CellView {
        CellView {
            display: cell.display_text(),
            is_error: cell.error.is_some(),
            is_text: cell.is_text,
        }
    }
}

impl Document {
    /// Create an empty 0 x 0 document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document with the given bounds, baselined as saved.
    pub fn with_dimensions(rows: usize, cols: usize) -> Self {
        let mut doc = Self::new();
        doc.set_dimensions(rows, cols);
        doc
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// Number of stored cells (including ones created empty by a reference).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
