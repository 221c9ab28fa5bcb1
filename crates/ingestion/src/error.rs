//! Source error types

use contracts::SourceFailure;
use thiserror::Error;

/// Log source errors
#[derive(Debug, Error)]
pub enum SourceError {
    /// Source path does not exist
    #[error("log file not found: {path}")]
    NotFound {
        /// Path that was opened
        path: String,
    },

    /// Source exists but could not be opened
    #[error("failed to open log file {path}: {source}")]
    Open {
        /// Path that was opened
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Read failed (I/O error or invalid UTF-8)
    #[error("failed to read line {line} of {origin}: {source}")]
    Read {
        /// Source description
        origin: String,
        /// Index of the line that could not be read
        line: u64,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// Summary-level description of this failure
    pub fn to_failure(&self) -> SourceFailure {
        match self {
            Self::NotFound { path } => SourceFailure::NotFound { path: path.clone() },
            Self::Open { source, .. } => SourceFailure::Read {
                line: None,
                message: source.to_string(),
            },
            Self::Read { line, source, .. } => SourceFailure::Read {
                line: Some(*line),
                message: source.to_string(),
            },
        }
    }
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, SourceError>;
