use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a whole file from loading.
///
/// A single unparseable CSV row is not an error; it lands in
/// `LoadOutcome::skipped` instead.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to open '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("revenue CSV has no '{column}' column (accepted headers: {accepted})")]
    MissingColumn {
        column: &'static str,
        accepted: String,
    },
}

pub type IngestResult<T> = Result<T, IngestError>;
