//! Error types for cellcalc core.

use cellcalc_engine::engine::InvalidCoordinate;
use thiserror::Error;

use crate::storage::FormatError;

/// Errors surfaced by document operations. Per-cell evaluation failures are
/// never reported here; they are stored on the cells themselves.
#[derive(Error, Debug)]
pub enum CalcError {
    #[error("Import failed: {0}")]
    Import(#[from] FormatError),

    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),
}

pub type Result<T> = std::result::Result<T, CalcError>;
