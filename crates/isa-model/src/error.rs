//! Error types for parsing model vocabulary from strings.

use thiserror::Error;

/// Errors raised when converting option vocabulary from text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    #[error("unknown filter operation: {value}")]
    UnknownFilterOperation { value: String },

    #[error("unknown sort type: {value}")]
    UnknownSortType { value: String },

    #[error("unknown data type: {value}")]
    UnknownDataType { value: String },

    #[error("unknown value order: {value}")]
    UnknownValueOrder { value: String },
}

/// Result type for model conversions.
pub type Result<T> = std::result::Result<T, ModelError>;
