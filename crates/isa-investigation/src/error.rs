//! Error types for investigation files.
//!
//! Parsing never fails; problems in the document are reported as messages.
//! Errors cover caller-side operations such as writing a file.

use std::path::PathBuf;

use isa_ingest::IngestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvestigationError {
    /// Section header that is not part of the investigation vocabulary.
    #[error("unknown investigation section: {header}")]
    UnknownSection { header: String },

    /// Failed to write an investigation file.
    #[error("failed to write investigation file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Result type for investigation operations.
pub type Result<T> = std::result::Result<T, InvestigationError>;
