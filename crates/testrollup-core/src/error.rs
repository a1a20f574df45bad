//! Ingestion error types.
//!
//! Only failures that make the whole input unusable are errors; anything
//! recoverable at the record level becomes an [`IngestWarning`] instead.
//!
//! [`IngestWarning`]: crate::parser::IngestWarning

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort ingestion of an input file.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The input file could not be read.
    #[error("failed to read input file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input is not valid JSON.
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level JSON value is not an array of sessions.
    #[error("expected a JSON array of sessions, found {found}")]
    NotAnArray { found: &'static str },
}
