//! Markdown rendering of display text.

use crate::document::Document;
use cellcalc_engine::engine::CellRef;
use std::fmt::Write;

/// Render the full grid bounds as a markdown table of display text.
pub fn render_markdown(doc: &Document) -> String {
    let (rows, cols) = doc.dimensions();
    let mut out = String::new();

    if rows == 0 || cols == 0 {
        out.push_str("*Empty spreadsheet*\n");
        return out;
    }

    // Header with column letters
    out.push_str("|   |");
    for col in 0..cols {
        let _ = write!(out, " {} |", CellRef::col_to_letters(col));
    }
    out.push('\n');

    out.push_str("|---|");
    for _ in 0..cols {
        out.push_str("---|");
    }
    out.push('\n');

    for row in 0..rows {
        let _ = write!(out, "| {} |", row + 1); // 1-based row numbers
        for col in 0..cols {
            let view = doc.view(&CellRef::new(row, col));
            let _ = write!(out, " {} |", escape_markdown(&view.display));
        }
        out.push('\n');
    }

    out
}

/// Escape special markdown characters in cell content
fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}
