//! cellcalc_engine - Formula parsing and evaluation for a sparse grid of cells.

pub mod engine;
