//! Field assignment for investigation records.
//!
//! Every record type of the document tree implements [`Record`], mapping the
//! field names of the vocabulary tables onto its struct fields in both
//! directions.

use isa_model::{
    Assay, Factor, Investigation, OntologyAnnotation, OntologySourceReference, Person, Protocol,
    ProtocolComponent, Publication, Study,
};

use crate::vocabulary::LIST_SEPARATOR;

/// A value read from, or written to, the rows of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Ontology(OntologyAnnotation),
    OntologyList(Vec<OntologyAnnotation>),
    TextList(Vec<String>),
}

impl FieldValue {
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Ontology(annotation) => annotation.term,
            Self::OntologyList(annotations) => join_list(annotations.iter().map(|a| a.term.as_str())),
            Self::TextList(values) => join_list(values.iter().map(String::as_str)),
        }
    }

    pub fn into_ontology(self) -> OntologyAnnotation {
        match self {
            Self::Ontology(annotation) => annotation,
            Self::OntologyList(annotations) => annotations.into_iter().next().unwrap_or_default(),
            other => OntologyAnnotation::term(other.into_text()),
        }
    }

    pub fn into_ontology_list(self) -> Vec<OntologyAnnotation> {
        match self {
            Self::OntologyList(annotations) => annotations,
            Self::Ontology(annotation) if annotation.is_default() => Vec::new(),
            Self::Ontology(annotation) => vec![annotation],
            other => other
                .into_text_list()
                .into_iter()
                .map(OntologyAnnotation::term)
                .collect(),
        }
    }

    pub fn into_text_list(self) -> Vec<String> {
        match self {
            Self::TextList(values) => values,
            Self::OntologyList(annotations) => annotations.into_iter().map(|a| a.term).collect(),
            other => split_list(&other.into_text()),
        }
    }
}

/// A record populated from one value column of a section.
pub trait Record: Default + PartialEq {
    /// Stores a field value. Names outside the record's table are ignored.
    fn assign(&mut self, field: &str, value: FieldValue);

    /// Reads a field value back for writing.
    fn value(&self, field: &str) -> FieldValue;

    /// A record equal to its default carries no information and is pruned
    /// from the end of repeated sections.
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Drops trailing default records.
pub fn prune_trailing<R: Record>(records: &mut Vec<R>) {
    while records.last().is_some_and(R::is_default) {
        records.pop();
    }
}

/// Splits a `;`-separated cell. An empty cell is an empty list.
pub fn split_list(cell: &str) -> Vec<String> {
    if cell.trim().is_empty() {
        return Vec::new();
    }
    cell.split(LIST_SEPARATOR)
        .map(|part| part.trim().to_string())
        .collect()
}

pub fn join_list<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    values.into_iter().collect::<Vec<_>>().join(";")
}

/// Zips parallel term, accession and source lists position by position.
pub fn zip_ontology(
    terms: Vec<String>,
    accessions: Vec<String>,
    sources: Vec<String>,
) -> Vec<OntologyAnnotation> {
    let length = terms.len().max(accessions.len()).max(sources.len());
    let mut terms = terms.into_iter();
    let mut accessions = accessions.into_iter();
    let mut sources = sources.into_iter();
    let mut annotations: Vec<OntologyAnnotation> = (0..length)
        .map(|_| OntologyAnnotation {
            term: terms.next().unwrap_or_default(),
            term_accession_number: accessions.next().unwrap_or_default(),
            term_source_ref: sources.next().unwrap_or_default(),
        })
        .collect();
    prune_trailing(&mut annotations);
    annotations
}

impl Record for OntologyAnnotation {
    fn assign(&mut self, field: &str, value: FieldValue) {
        if field == "type" {
            *self = value.into_ontology();
        }
    }

    fn value(&self, field: &str) -> FieldValue {
        match field {
            "type" => FieldValue::Ontology(self.clone()),
            _ => FieldValue::Text(String::new()),
        }
    }

    fn is_default(&self) -> bool {
        OntologyAnnotation::is_default(self)
    }
}

impl Record for OntologySourceReference {
    fn assign(&mut self, field: &str, value: FieldValue) {
        let slot = match field {
            "name" => &mut self.name,
            "file" => &mut self.file,
            "version" => &mut self.version,
            "description" => &mut self.description,
            _ => return,
        };
        *slot = value.into_text();
    }

    fn value(&self, field: &str) -> FieldValue {
        let text = match field {
            "name" => &self.name,
            "file" => &self.file,
            "version" => &self.version,
            "description" => &self.description,
            _ => return FieldValue::Text(String::new()),
        };
        FieldValue::Text(text.clone())
    }
}

impl Record for Investigation {
    fn assign(&mut self, field: &str, value: FieldValue) {
        let slot = match field {
            "identifier" => &mut self.identifier,
            "title" => &mut self.title,
            "description" => &mut self.description,
            "submission_date" => &mut self.submission_date,
            "public_release_date" => &mut self.public_release_date,
            _ => return,
        };
        *slot = value.into_text();
    }

    fn value(&self, field: &str) -> FieldValue {
        let text = match field {
            "identifier" => &self.identifier,
            "title" => &self.title,
            "description" => &self.description,
            "submission_date" => &self.submission_date,
            "public_release_date" => &self.public_release_date,
            _ => return FieldValue::Text(String::new()),
        };
        FieldValue::Text(text.clone())
    }
}

impl Record for Publication {
    fn assign(&mut self, field: &str, value: FieldValue) {
        let slot = match field {
            "pubmed_id" => &mut self.pubmed_id,
            "doi" => &mut self.doi,
            "author_list" => &mut self.author_list,
            "title" => &mut self.title,
            "status" => {
                self.status = value.into_ontology();
                return;
            }
            _ => return,
        };
        *slot = value.into_text();
    }

    fn value(&self, field: &str) -> FieldValue {
        let text = match field {
            "pubmed_id" => &self.pubmed_id,
            "doi" => &self.doi,
            "author_list" => &self.author_list,
            "title" => &self.title,
            "status" => return FieldValue::Ontology(self.status.clone()),
            _ => return FieldValue::Text(String::new()),
        };
        FieldValue::Text(text.clone())
    }
}

impl Record for Person {
    fn assign(&mut self, field: &str, value: FieldValue) {
        let slot = match field {
            "last_name" => &mut self.last_name,
            "first_name" => &mut self.first_name,
            "mid_initials" => &mut self.mid_initials,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "fax" => &mut self.fax,
            "address" => &mut self.address,
            "affiliation" => &mut self.affiliation,
            "roles" => {
                self.roles = value.into_ontology_list();
                return;
            }
            _ => return,
        };
        *slot = value.into_text();
    }

    fn value(&self, field: &str) -> FieldValue {
        let text = match field {
            "last_name" => &self.last_name,
            "first_name" => &self.first_name,
            "mid_initials" => &self.mid_initials,
            "email" => &self.email,
            "phone" => &self.phone,
            "fax" => &self.fax,
            "address" => &self.address,
            "affiliation" => &self.affiliation,
            "roles" => return FieldValue::OntologyList(self.roles.clone()),
            _ => return FieldValue::Text(String::new()),
        };
        FieldValue::Text(text.clone())
    }
}

impl Record for Study {
    fn assign(&mut self, field: &str, value: FieldValue) {
        let slot = match field {
            "identifier" => &mut self.identifier,
            "title" => &mut self.title,
            "description" => &mut self.description,
            "submission_date" => &mut self.submission_date,
            "public_release_date" => &mut self.public_release_date,
            "file_name" => &mut self.file_name,
            _ => return,
        };
        *slot = value.into_text();
    }

    fn value(&self, field: &str) -> FieldValue {
        let text = match field {
            "identifier" => &self.identifier,
            "title" => &self.title,
            "description" => &self.description,
            "submission_date" => &self.submission_date,
            "public_release_date" => &self.public_release_date,
            "file_name" => &self.file_name,
            _ => return FieldValue::Text(String::new()),
        };
        FieldValue::Text(text.clone())
    }
}

impl Record for Factor {
    fn assign(&mut self, field: &str, value: FieldValue) {
        match field {
            "name" => self.name = value.into_text(),
            "type" => self.factor_type = value.into_ontology(),
            _ => {}
        }
    }

    fn value(&self, field: &str) -> FieldValue {
        match field {
            "name" => FieldValue::Text(self.name.clone()),
            "type" => FieldValue::Ontology(self.factor_type.clone()),
            _ => FieldValue::Text(String::new()),
        }
    }
}

impl Record for Assay {
    fn assign(&mut self, field: &str, value: FieldValue) {
        match field {
            "file_name" => self.file_name = value.into_text(),
            "measurement_type" => self.measurement_type = value.into_ontology(),
            "technology_type" => self.technology_type = value.into_ontology(),
            "technology_platform" => self.technology_platform = value.into_text(),
            _ => {}
        }
    }

    fn value(&self, field: &str) -> FieldValue {
        match field {
            "file_name" => FieldValue::Text(self.file_name.clone()),
            "measurement_type" => FieldValue::Ontology(self.measurement_type.clone()),
            "technology_type" => FieldValue::Ontology(self.technology_type.clone()),
            "technology_platform" => FieldValue::Text(self.technology_platform.clone()),
            _ => FieldValue::Text(String::new()),
        }
    }
}

impl Record for Protocol {
    fn assign(&mut self, field: &str, value: FieldValue) {
        match field {
            "name" => self.name = value.into_text(),
            "type" => self.protocol_type = value.into_ontology(),
            "description" => self.description = value.into_text(),
            "uri" => self.uri = value.into_text(),
            "version" => self.version = value.into_text(),
            "parameters" => self.parameters = value.into_ontology_list(),
            "component_names" => {
                let names = value.into_text_list();
                resize_components(&mut self.components, names.len());
                for (component, name) in self.components.iter_mut().zip(names) {
                    component.name = name;
                }
            }
            "component_types" => {
                let types = value.into_ontology_list();
                resize_components(&mut self.components, types.len());
                for (component, component_type) in self.components.iter_mut().zip(types) {
                    component.component_type = component_type;
                }
            }
            _ => {}
        }
    }

    fn value(&self, field: &str) -> FieldValue {
        match field {
            "name" => FieldValue::Text(self.name.clone()),
            "type" => FieldValue::Ontology(self.protocol_type.clone()),
            "description" => FieldValue::Text(self.description.clone()),
            "uri" => FieldValue::Text(self.uri.clone()),
            "version" => FieldValue::Text(self.version.clone()),
            "parameters" => FieldValue::OntologyList(self.parameters.clone()),
            "component_names" => FieldValue::TextList(
                self.components
                    .iter()
                    .map(|component| component.name.clone())
                    .collect(),
            ),
            "component_types" => FieldValue::OntologyList(
                self.components
                    .iter()
                    .map(|component| component.component_type.clone())
                    .collect(),
            ),
            _ => FieldValue::Text(String::new()),
        }
    }
}

fn resize_components(components: &mut Vec<ProtocolComponent>, length: usize) {
    if components.len() < length {
        components.resize_with(length, ProtocolComponent::default);
    }
}
