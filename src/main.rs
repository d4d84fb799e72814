//! cellcalc - recalculate a delimited-text spreadsheet from the command line.

mod config;

use anyhow::{Context, Result, bail};
use cellcalc_core::Document;
use cellcalc_core::storage::render_markdown;
use clap::Parser;
use config::{OutputFormat, load_config};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "cellcalc", version, about)]
struct Cli {
    /// Sheet to open (comma-delimited text). Starts blank when omitted.
    file: Option<PathBuf>,

    /// Resize to this many rows (cells outside are discarded).
    #[arg(long)]
    rows: Option<usize>,

    /// Resize to this many columns (cells outside are discarded).
    #[arg(long)]
    cols: Option<usize>,

    /// Set a cell before printing, e.g. `-s B1==A1*2`. Can be repeated.
    #[arg(short = 's', long = "set", value_name = "CELL=TEXT")]
    edits: Vec<String>,

    /// Write the sheet (expressions) to this file.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// How to print the sheet.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Read configuration from this file instead of the user config dir.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Exit with status 1 when any cell is in an error state.
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let (config, warnings) = load_config(cli.config.as_deref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    let mut doc = match &cli.file {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let mut doc = Document::new();
            doc.load_from_text(&content)
                .with_context(|| format!("loading {}", path.display()))?;
            doc
        }
        None => Document::with_dimensions(config.rows, config.cols),
    };

    if cli.rows.is_some() || cli.cols.is_some() {
        let (rows, cols) = doc.dimensions();
        doc.set_dimensions(cli.rows.unwrap_or(rows), cli.cols.unwrap_or(cols));
        doc.prune_out_of_bounds();
        doc.recalculate();
    }

    for edit in &cli.edits {
        let Some((address, text)) = edit.split_once('=') else {
            bail!("invalid edit {edit:?}: expected CELL=TEXT");
        };
        if !doc.update_cell(address.trim(), text) {
            let (rows, cols) = doc.dimensions();
            eprintln!(
                "Warning: skipped {}: not a cell inside the {}x{} sheet",
                address, rows, cols
            );
        }
    }

    if let Some(path) = &cli.output {
        std::fs::write(path, doc.export_to_text())
            .with_context(|| format!("writing {}", path.display()))?;
        doc.mark_saved();
        log::debug!("Saved to {}", path.display());
    }

    let format = cli.format.unwrap_or(config.format);
    let rendered = match format {
        OutputFormat::Table => render_markdown(&doc),
        OutputFormat::Text => doc.export_to_text(),
        OutputFormat::Values => doc.export_values(),
    };
    print!("{}", rendered);

    if cli.strict && doc.has_errors() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
