use super::{CellView, Document};
use crate::error::Result;
use cellcalc_engine::engine::{Cell, CellRef};
use log::debug;

/// Dimension for row/column operations
#[derive(Copy, Clone)]
enum Dimension {
    Row,
    Column,
}

impl Document {
    /// Update the grid bounds. Does not prune or recalculate.
    ///
    /// The first call on a document that was never saved also records the
    /// saved baseline, so a fresh blank grid does not count as modified.
    pub fn set_dimensions(&mut self, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
        if self.saved_snapshot.is_empty() {
            self.mark_saved();
        }
    }

    /// Store raw text at `address` and recalculate.
    ///
    /// Invalid or out-of-bounds addresses are ignored; returns whether the
    /// edit was applied.
    pub fn update_cell(&mut self, address: &str, raw: &str) -> bool {
        let Ok(cell_ref) = address.parse::<CellRef>() else {
            debug!("Ignoring edit to invalid address {address:?}");
            return false;
        };
        if !cell_ref.is_within(self.rows, self.cols) {
            debug!("Ignoring edit to {cell_ref}: outside {}x{}", self.rows, self.cols);
            return false;
        }

        self.cells.entry(cell_ref).or_default().expression = raw.to_string();
        self.recalculate();
        true
    }

    /// Remove every stored cell outside the current bounds.
    /// Returns the number of cells removed.
    pub fn prune_out_of_bounds(&mut self) -> usize {
        let (rows, cols) = (self.rows, self.cols);
        let before = self.cells.len();
        self.cells.retain(|cell_ref, _| cell_ref.is_within(rows, cols));
        let removed = before - self.cells.len();
        if removed > 0 {
            debug!("Pruned {removed} cells outside {rows}x{cols}");
        }
        removed
    }

    /// Get the cell at `address`, creating an empty one if absent.
    pub fn get_or_insert_cell(&mut self, address: &str) -> Result<&mut Cell> {
        let cell_ref: CellRef = address.parse()?;
        Ok(self.cells.entry(cell_ref).or_default())
    }

    /// The stored cell at `cell_ref`, if any.
    pub fn cell(&self, cell_ref: &CellRef) -> Option<&Cell> {
        self.cells.get(cell_ref)
    }

    /// All stored cells, in row-major order.
    pub fn cells(&self) -> Vec<(&CellRef, &Cell)> {
        let mut cells: Vec<_> = self.cells.iter().collect();
        cells.sort_by(|a, b| a.0.cmp(b.0));
        cells
    }

    /// Render state for one cell. Absent cells render as empty.
    pub fn view(&self, cell_ref: &CellRef) -> CellView {
        self.cells.get(cell_ref).map(CellView::of).unwrap_or_default()
    }

    /// Render state for the cell at `address`.
    pub fn view_at(&self, address: &str) -> Result<CellView> {
        let cell_ref: CellRef = address.parse()?;
        Ok(self.view(&cell_ref))
    }

    /// Raw text of the cell at `address`, as the user typed it.
    pub fn cell_input(&self, address: &str) -> Result<String> {
        let cell_ref: CellRef = address.parse()?;
        Ok(self
            .cells
            .get(&cell_ref)
            .map(|cell| cell.expression.clone())
            .unwrap_or_default())
    }

    /// True when any cell is currently in an error state.
    pub fn has_errors(&self) -> bool {
        self.cells.values().any(|cell| cell.error.is_some())
    }

    pub fn add_row(&mut self) {
        self.grow(Dimension::Row);
    }

    pub fn add_column(&mut self) {
        self.grow(Dimension::Column);
    }

    /// Drop the last row, discarding its cells. No-op on an empty grid.
    pub fn remove_row(&mut self) {
        self.shrink(Dimension::Row);
    }

    /// Drop the last column, discarding its cells. No-op on an empty grid.
    pub fn remove_column(&mut self) {
        self.shrink(Dimension::Column);
    }

    fn grow(&mut self, dim: Dimension) {
        let (rows, cols) = match dim {
            Dimension::Row => (self.rows + 1, self.cols),
            Dimension::Column => (self.rows, self.cols + 1),
        };
        self.set_dimensions(rows, cols);
        // References that were out of range may now resolve.
        self.recalculate();
    }

    fn shrink(&mut self, dim: Dimension) {
        let (rows, cols) = match dim {
            Dimension::Row if self.rows > 0 => (self.rows - 1, self.cols),
            Dimension::Column if self.cols > 0 => (self.rows, self.cols - 1),
            _ => return,
        };
        self.set_dimensions(rows, cols);
        self.prune_out_of_bounds();
        self.recalculate();
    }
}
