//! ISA-Tab investigation files.
//!
//! Parses the key/value layout of `i_*.txt` files into an
//! [`Investigation`](isa_model::Investigation) and writes documents back:
//!
//! - **Vocabulary**: per-section field tables naming every row key
//! - **Parser**: section state machine, comment rows, record population
//! - **Writer**: tab-separated output that parses back to the same document
//!
//! Parsing never fails. Missing sections, unknown rows and repaired values
//! are reported in a [`ParserReport`](isa_model::ParserReport).
//!
//! ```rust,ignore
//! use isa_investigation::{InvestigationParseOptions, parse_investigation_file};
//!
//! let (investigation, report) =
//!     parse_investigation_file(path, &InvestigationParseOptions::default());
//! for message in report.actionable() {
//!     eprintln!("{message}");
//! }
//! ```

mod error;
mod parser;
mod record;
mod vocabulary;
mod writer;

// === Error Types ===
pub use error::{InvestigationError, Result};

// === Vocabulary ===
pub use vocabulary::{
    FieldKind, FieldSpec, INITIAL_SECTIONS, LIST_SEPARATOR, STUDY_HEADER, STUDY_SECTIONS,
    SectionLayout, SectionScope, SectionSpec, TERM_ACCESSION_SUFFIX, TERM_SOURCE_SUFFIX,
    section_of_key, section_spec,
};

// === Records ===
pub use record::{FieldValue, Record, prune_trailing, split_list, zip_ontology};

// === Parsing ===
pub use parser::{
    InvestigationParseOptions, parse_investigation_bytes, parse_investigation_file,
    parse_investigation_str,
};

// === Writing ===
pub use writer::{write_investigation, write_investigation_file};
