//! Investigation document tree.
//!
//! One [`Investigation`] owns the initial sections (ontology sources,
//! investigation fields, publications, contacts) and an ordered list of
//! [`Study`] blocks, each with its six fixed sub-sections. Every section keeps
//! its free-form `Comment[...]` rows.

use serde::{Deserialize, Serialize};

/// A `Comment[name]` row: the bracketed name and the value cells that followed it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub name: String,
    pub value: Vec<String>,
}

impl Comment {
    pub fn new(name: impl Into<String>, value: Vec<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A controlled-vocabulary value with its accession and source reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyAnnotation {
    pub term: String,
    pub term_accession_number: String,
    pub term_source_ref: String,
}

impl OntologyAnnotation {
    pub fn new(
        term: impl Into<String>,
        term_accession_number: impl Into<String>,
        term_source_ref: impl Into<String>,
    ) -> Self {
        Self {
            term: term.into(),
            term_accession_number: term_accession_number.into(),
            term_source_ref: term_source_ref.into(),
        }
    }

    pub fn term(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }

    pub fn is_default(&self) -> bool {
        self.term.is_empty()
            && self.term_accession_number.is_empty()
            && self.term_source_ref.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologySourceReference {
    pub name: String,
    pub file: String,
    pub version: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologySourceReferences {
    pub references: Vec<OntologySourceReference>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub pubmed_id: String,
    pub doi: String,
    pub author_list: String,
    pub title: String,
    pub status: OntologyAnnotation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub last_name: String,
    pub first_name: String,
    pub mid_initials: String,
    pub email: String,
    pub phone: String,
    pub fax: String,
    pub address: String,
    pub affiliation: String,
    pub roles: Vec<OntologyAnnotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigationPublications {
    pub publications: Vec<Publication>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigationContacts {
    pub people: Vec<Person>,
    pub comments: Vec<Comment>,
}

/// Root of a parsed investigation file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investigation {
    pub identifier: String,
    pub title: String,
    pub description: String,
    pub submission_date: String,
    pub public_release_date: String,
    pub ontology_source_references: OntologySourceReferences,
    pub publications: InvestigationPublications,
    pub contacts: InvestigationContacts,
    pub studies: Vec<Study>,
    /// Comments of the `INVESTIGATION` section.
    pub comments: Vec<Comment>,
}

impl Investigation {
    pub fn study(&self, identifier: &str) -> Option<&Study> {
        self.studies
            .iter()
            .find(|study| study.identifier == identifier)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyDesignDescriptors {
    pub design_types: Vec<OntologyAnnotation>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPublications {
    pub publications: Vec<Publication>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factor {
    pub name: String,
    #[serde(rename = "type")]
    pub factor_type: OntologyAnnotation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyFactors {
    pub factors: Vec<Factor>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assay {
    pub file_name: String,
    pub measurement_type: OntologyAnnotation,
    pub technology_type: OntologyAnnotation,
    pub technology_platform: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyAssays {
    pub assays: Vec<Assay>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolComponent {
    pub name: String,
    #[serde(rename = "type")]
    pub component_type: OntologyAnnotation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protocol {
    pub name: String,
    #[serde(rename = "type")]
    pub protocol_type: OntologyAnnotation,
    pub description: String,
    pub uri: String,
    pub version: String,
    pub parameters: Vec<OntologyAnnotation>,
    pub components: Vec<ProtocolComponent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyProtocols {
    pub protocols: Vec<Protocol>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyContacts {
    pub people: Vec<Person>,
    pub comments: Vec<Comment>,
}

/// One `STUDY` block with its fixed sub-sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Study {
    pub identifier: String,
    pub title: String,
    pub description: String,
    pub submission_date: String,
    pub public_release_date: String,
    pub file_name: String,
    pub design_descriptors: StudyDesignDescriptors,
    pub publications: StudyPublications,
    pub factors: StudyFactors,
    pub assays: StudyAssays,
    pub protocols: StudyProtocols,
    pub contacts: StudyContacts,
    /// Comments of the `STUDY` section.
    pub comments: Vec<Comment>,
}

impl Study {
    pub fn protocol(&self, name: &str) -> Option<&Protocol> {
        self.protocols
            .protocols
            .iter()
            .find(|protocol| protocol.name == name)
    }
}
