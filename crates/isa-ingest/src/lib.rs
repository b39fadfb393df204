//! ISA-Tab ingestion.
//!
//! Turns raw investigation and table files into a clean grid of rows:
//!
//! - **Decoding**: BOM-aware byte decoding and line-ending normalization
//! - **Tokenizing**: tab splitting tolerant of quoted tabs and line breaks,
//!   blank line removal, cell trimming
//! - **Logical lines**: re-joining investigation values broken across rows
//! - **Files**: size-checked reading with failures reported as messages
//!
//! Every anomaly the tokenizer repairs is returned as a
//! [`ParserMessage`](isa_model::ParserMessage) in a
//! [`ParserReport`](isa_model::ParserReport).

mod decode;
mod error;
mod file;
mod logical;
mod tokenizer;

// === Error Types ===
pub use error::{IngestError, Result};

// === Decoding ===
pub use decode::{decode_bytes, normalize_line_endings};

// === Tokenizing ===
pub use tokenizer::{
    DEFAULT_MAX_REPORTED_REPLACEMENTS, SourceRow, TokenizerOptions, into_rows, render_rows,
    tokenize, tokenize_bytes, tokenize_bytes_with, tokenize_with,
};

// === Logical Lines ===
pub use logical::{
    COMMENT_PREFIX, FILE_COMMENT_PREFIX, LineKind, LogicalLine, group_logical_lines, line_kind,
};

// === Files ===
pub use file::{
    MAX_FILE_SIZE, check_file_size, critical_for, read_file, tokenize_file, tokenize_file_with,
};
