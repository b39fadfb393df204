//! ISA table engine.
//!
//! Works on the wide tab-separated tables of an ISA-Tab submission (sample,
//! assay and metabolite assignment files) without a dataframe runtime:
//!
//! - **Profiles**: expected header vocabularies per table type, loaded from TOML
//! - **Classification**: stand-alone, ontology-linked and unit-linked columns
//! - **Filtering**: built-in operations plus named custom filters
//! - **Sorting**: synthetic keys with configurable placement of empty and
//!   invalid values, composed into stable multi-key sorts
//! - **Views**: column selection with linked-column completion and pagination
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use isa_table::{HeaderProfile, TableQuery, TableRegistries, read_isa_table};
//!
//! let profile = HeaderProfile::sample()?;
//! let query = TableQuery::new().with_columns(["Sample Name"]).with_limit(50);
//! let result = read_isa_table(
//!     Path::new("MTBLS1/s_MTBLS1.txt"),
//!     &profile,
//!     &query,
//!     &TableRegistries::default(),
//! )?;
//! ```

mod classify;
mod coerce;
mod error;
mod filter;
mod index;
mod profile;
mod reader;
mod sort;
mod view;

// === Error Types ===
pub use error::{Result, TableError};

// === Profiles ===
pub use profile::{
    ASSAY_PROFILE, ASSIGNMENT_PROFILE, ExpectedPattern, HeaderProfile, PatternEntry,
    SAMPLE_PROFILE,
};

// === Classification ===
pub use classify::{
    TERM_ACCESSION_NUMBER, TERM_SOURCE_REF, UNIT, classify_columns, clean_header_name,
    disambiguate_headers, is_continuation_header,
};

// === Coercion ===
pub use coerce::{Coerced, coerce, parse_datetime, parse_float, parse_integer};

// === Filtering ===
pub use filter::{
    BetweenEqual, CellPredicate, CompiledFilter, CustomFilter, DatetimeValid, EnumContains,
    FilterRegistry, NumericValid, compile_filters,
};

// === Sorting ===
pub use sort::{
    CompiledSort, CustomSorter, EnumSorter, SortRegistry, ValueKey, apply_sorts, compile_sorts,
    keys,
};

// === Views ===
pub use index::ColumnIndex;
pub use view::{TableQuery, TableRegistries, build_table_view};

// === Reading ===
pub use reader::{IsaTableResult, IsaTableType, read_isa_table, read_isa_table_str, read_table_headers};
