//! Text formats: delimited import/export and markdown rendering.

mod md;
mod text;

pub use md::render_markdown;
pub use text::{FormatError, escape_field, parse_records, write_records};
