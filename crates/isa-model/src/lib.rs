//! ISA-Tab data model.
//!
//! Plain, serde-derivable types shared by the tokenizer, the table engine and
//! the investigation parser:
//!
//! - **Messages**: [`ParserMessage`] / [`ParserReport`], severity-classified
//!   diagnostics returned alongside every result
//! - **Tables**: [`ColumnDescriptor`], [`ColumnStructure`], [`TableView`]
//! - **Options**: [`FilterOption`], [`SortOption`] and their vocabularies
//! - **Investigation**: the [`Investigation`] / [`Study`] document tree

pub mod error;
pub mod investigation;
pub mod options;
pub mod report;
pub mod table;

pub use error::{ModelError, Result};
pub use investigation::{
    Assay, Comment, Factor, Investigation, InvestigationContacts, InvestigationPublications,
    OntologyAnnotation, OntologySourceReference, OntologySourceReferences, Person, Protocol,
    ProtocolComponent, Publication, Study, StudyAssays, StudyContacts, StudyDesignDescriptors,
    StudyFactors, StudyProtocols, StudyPublications,
};
pub use options::{
    DataType, FilterOperation, FilterOption, FilterValue, SortOption, SortType, ValueClass,
    ValueOrder,
};
pub use report::{MessageType, ParserMessage, ParserReport};
pub use table::{
    ColumnDescriptor, ColumnStructure, LINKED_COLUMN_CATEGORY, Row, TableView, UNDEFINED_CATEGORY,
};
