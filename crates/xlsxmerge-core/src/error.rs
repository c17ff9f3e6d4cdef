//! Error types for xlsxmerge-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in xlsxmerge-core
#[derive(Debug, Error)]
pub enum Error {
    /// No input workbooks to merge
    #[error("no XLSX files found in {dir}")]
    NoWorkbooks { dir: PathBuf },

    /// Failed to decode a workbook
    #[error("error processing '{path}': {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
