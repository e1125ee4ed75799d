//! Hole data ingestion: CSV uploads, JSON blast documents and in-memory
//! hole sources

mod csv;
mod source;

pub use csv::{load_blast_csv, parse_holes_csv};
pub use source::{BlastStore, HoleSource};

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::types::Blast;

/// Errors while reading hole data.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Only CSV files are supported: {}", .0.display())]
    NotCsv(PathBuf),

    #[error("CSV input is empty")]
    EmptyInput,

    #[error("CSV header has no recognised hole columns: {0}")]
    NoKnownColumns(String),

    #[error("Invalid blast document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load a blast document (`name`, `description`, `bench`, `holes`) from disk.
pub fn load_blast_json(path: impl AsRef<Path>) -> Result<Blast, IngestError> {
    let path = path.as_ref();
    let text =
        std::fs::read_to_string(path).map_err(|e| IngestError::Io(path.to_path_buf(), e))?;
    let blast = Blast::from_json(&text)?;
    info!(file = %path.display(), blast = %blast.name, holes = blast.hole_count(), "Blast document loaded");
    Ok(blast)
}
