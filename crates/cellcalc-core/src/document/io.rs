use super::Document;
use crate::error::Result;
use crate::storage::{parse_records, write_records};
use cellcalc_engine::engine::{Cell, CellRef};
use log::debug;

impl Document {
    /// Replace the whole document with delimited `content`.
    ///
    /// Bounds become (number of non-blank lines) x (widest line). Blank fields
    /// stay empty. On success the document is recalculated and baselined as
    /// saved; on failure it is left untouched.
    pub fn load_from_text(&mut self, content: &str) -> Result<()> {
        let records = parse_records(content)?;

        self.cells.clear();
        if !records.is_empty() {
            let rows = records.len();
            let cols = records.iter().map(Vec::len).max().unwrap_or(0);

            for (row, fields) in records.into_iter().enumerate() {
                for (col, field) in fields.into_iter().enumerate() {
                    if field.trim().is_empty() {
                        continue;
                    }
                    self.cells.insert(CellRef::new(row, col), Cell::new(field));
                }
            }

            self.rows = rows;
            self.cols = cols;
        }
        debug!(
            "Loaded {} cells into {}x{} grid",
            self.cells.len(),
            self.rows,
            self.cols
        );

        self.recalculate();
        self.mark_saved();
        Ok(())
    }

    /// Serialize every row x column position of the current bounds.
    pub fn export_to_text(&self) -> String {
        let rows = (0..self.rows).map(|row| {
            (0..self.cols).map(move |col| {
                self.cells
                    .get(&CellRef::new(row, col))
                    .map(|cell| cell.expression.as_str())
                    .unwrap_or("")
            })
        });
        write_records(rows)
    }

    /// Serialize display text (evaluated values, error tags) instead of
    /// expressions.
    pub fn export_values(&self) -> String {
        let rows = (0..self.rows).map(|row| {
            (0..self.cols).map(move |col| self.view(&CellRef::new(row, col)).display)
        });
        write_records(rows)
    }

    /// Record the current content as saved.
    pub fn mark_saved(&mut self) {
        self.saved_snapshot = self.export_to_text();
    }

    /// True when the content differs from the last saved snapshot.
    pub fn is_modified(&self) -> bool {
        self.export_to_text() != self.saved_snapshot
    }
}
