//! Error types for the ISA table engine.
//!
//! Only caller mistakes are errors. Problems found in the data itself are
//! reported as messages in a [`ParserReport`](isa_model::ParserReport).

use std::path::PathBuf;

use isa_ingest::IngestError;
use thiserror::Error;

/// Errors raised before any row is scanned.
#[derive(Debug, Error)]
pub enum TableError {
    // === Query Errors ===
    /// Selected, filtered or sorted columns that the table does not have.
    #[error("unknown column(s): {}", columns.join(", "))]
    UnknownColumns { columns: Vec<String> },

    /// A custom filter name with no registered evaluator.
    #[error("no custom filter registered as '{name}'")]
    UnknownCustomFilter { name: String },

    /// A custom sort name with no registered sorter.
    #[error("no custom sorter registered as '{name}'")]
    UnknownCustomSorter { name: String },

    /// A `custom` filter or sort option without a `custom_name`.
    #[error("{kind} option uses the custom operation without a custom name")]
    MissingCustomName { kind: &'static str },

    /// Regex filter parameter that does not compile.
    #[error("invalid regex filter '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Filter parameter that cannot be coerced to the requested type.
    #[error("filter parameter '{parameter}' is not a valid {data_type}")]
    InvalidParameter {
        parameter: String,
        data_type: &'static str,
    },

    /// Custom arguments missing or of the wrong shape.
    #[error("invalid arguments for '{name}': {reason}")]
    InvalidCustomArgs { name: String, reason: String },

    // === Profile Errors ===
    /// Expected header pattern that does not compile or lacks one capture group.
    #[error("invalid header pattern '{pattern}' for category '{category}': {reason}")]
    InvalidPattern {
        pattern: String,
        category: String,
        reason: String,
    },

    /// Header profile that is not valid TOML for the profile schema.
    #[error("invalid header profile {name}: {source}")]
    ProfileParse {
        name: String,
        #[source]
        source: toml::de::Error,
    },

    /// Header profile file that could not be read.
    #[error("failed to read header profile {path}: {source}")]
    ProfileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Ingest Errors ===
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;
