//! Row key vocabulary of investigation files.
//!
//! Each section is described by a hand-written field table. A row key is the
//! section prefix followed by the field label (`Study` + `Title` gives
//! `Study Title`). Ontology fields own two further rows suffixed with
//! [`TERM_ACCESSION_SUFFIX`] and [`TERM_SOURCE_SUFFIX`].

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;

use crate::error::{InvestigationError, Result};

/// Suffix of the accession row of an ontology field.
pub const TERM_ACCESSION_SUFFIX: &str = "Term Accession Number";

/// Suffix of the source row of an ontology field.
pub const TERM_SOURCE_SUFFIX: &str = "Term Source REF";

/// Separator of multi-valued cells.
pub const LIST_SEPARATOR: char = ';';

/// Header opening a study block.
pub const STUDY_HEADER: &str = "STUDY";

/// How the cells of a field row are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// One text value per record.
    Scalar,
    /// A term with accession and source rows.
    OntologyRef,
    /// `;`-separated terms zipped with their accession and source rows.
    OntologyRefList,
    /// `;`-separated text values.
    RepeatedScalarList,
}

/// One field of a section record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Record field the value is assigned to.
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind }
    }

    const fn scalar(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Scalar)
    }

    const fn ontology(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::OntologyRef)
    }

    /// Every row key this field reads, main row first.
    pub fn row_keys(&self, prefix: &str) -> Vec<String> {
        let key = format!("{prefix} {}", self.label);
        match self.kind {
            FieldKind::Scalar | FieldKind::RepeatedScalarList => vec![key],
            FieldKind::OntologyRef | FieldKind::OntologyRefList => {
                let accession = format!("{key} {TERM_ACCESSION_SUFFIX}");
                let source = format!("{key} {TERM_SOURCE_SUFFIX}");
                vec![key, accession, source]
            }
        }
    }
}

/// Whether a section holds one record or one record per value column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "layout")]
pub enum SectionLayout {
    Single,
    /// Record count is the number of value cells of `search_field`'s row.
    Repeated { search_field: &'static str },
}

/// Where a section may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionScope {
    /// Before the first `STUDY` header, once per file.
    Initial,
    /// Inside each study block.
    Study,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionSpec {
    pub header: &'static str,
    pub prefix: &'static str,
    pub scope: SectionScope,
    pub layout: SectionLayout,
    pub fields: &'static [FieldSpec],
}

impl SectionSpec {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Row key of the field that decides the record count.
    pub fn search_key(&self) -> Option<String> {
        match self.layout {
            SectionLayout::Single => None,
            SectionLayout::Repeated { search_field } => self
                .field(search_field)
                .map(|field| format!("{} {}", self.prefix, field.label)),
        }
    }

    /// Every row key of the section in file order.
    pub fn row_keys(&self) -> Vec<String> {
        self.fields
            .iter()
            .flat_map(|field| field.row_keys(self.prefix))
            .collect()
    }
}

// === Initial sections ===

const ONTOLOGY_SOURCE_FIELDS: &[FieldSpec] = &[
    FieldSpec::scalar("name", "Name"),
    FieldSpec::scalar("file", "File"),
    FieldSpec::scalar("version", "Version"),
    FieldSpec::scalar("description", "Description"),
];

const INVESTIGATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::scalar("identifier", "Identifier"),
    FieldSpec::scalar("title", "Title"),
    FieldSpec::scalar("description", "Description"),
    FieldSpec::scalar("submission_date", "Submission Date"),
    FieldSpec::scalar("public_release_date", "Public Release Date"),
];

const PUBLICATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::scalar("pubmed_id", "PubMed ID"),
    FieldSpec::scalar("doi", "Publication DOI"),
    FieldSpec::scalar("author_list", "Publication Author List"),
    FieldSpec::scalar("title", "Publication Title"),
    FieldSpec::ontology("status", "Publication Status"),
];

const PERSON_FIELDS: &[FieldSpec] = &[
    FieldSpec::scalar("last_name", "Last Name"),
    FieldSpec::scalar("first_name", "First Name"),
    FieldSpec::scalar("mid_initials", "Mid Initials"),
    FieldSpec::scalar("email", "Email"),
    FieldSpec::scalar("phone", "Phone"),
    FieldSpec::scalar("fax", "Fax"),
    FieldSpec::scalar("address", "Address"),
    FieldSpec::scalar("affiliation", "Affiliation"),
    FieldSpec::new("roles", "Roles", FieldKind::OntologyRefList),
];

pub const ONTOLOGY_SOURCE_REFERENCE: SectionSpec = SectionSpec {
    header: "ONTOLOGY SOURCE REFERENCE",
    prefix: "Term Source",
    scope: SectionScope::Initial,
    layout: SectionLayout::Repeated {
        search_field: "name",
    },
    fields: ONTOLOGY_SOURCE_FIELDS,
};

pub const INVESTIGATION: SectionSpec = SectionSpec {
    header: "INVESTIGATION",
    prefix: "Investigation",
    scope: SectionScope::Initial,
    layout: SectionLayout::Single,
    fields: INVESTIGATION_FIELDS,
};

pub const INVESTIGATION_PUBLICATIONS: SectionSpec = SectionSpec {
    header: "INVESTIGATION PUBLICATIONS",
    prefix: "Investigation",
    scope: SectionScope::Initial,
    layout: SectionLayout::Repeated {
        search_field: "pubmed_id",
    },
    fields: PUBLICATION_FIELDS,
};

pub const INVESTIGATION_CONTACTS: SectionSpec = SectionSpec {
    header: "INVESTIGATION CONTACTS",
    prefix: "Investigation Person",
    scope: SectionScope::Initial,
    layout: SectionLayout::Repeated {
        search_field: "last_name",
    },
    fields: PERSON_FIELDS,
};

// === Study sections ===

const STUDY_FIELDS: &[FieldSpec] = &[
    FieldSpec::scalar("identifier", "Identifier"),
    FieldSpec::scalar("title", "Title"),
    FieldSpec::scalar("description", "Description"),
    FieldSpec::scalar("submission_date", "Submission Date"),
    FieldSpec::scalar("public_release_date", "Public Release Date"),
    FieldSpec::scalar("file_name", "File Name"),
];

const DESIGN_FIELDS: &[FieldSpec] = &[FieldSpec::ontology("type", "Type")];

const FACTOR_FIELDS: &[FieldSpec] = &[
    FieldSpec::scalar("name", "Name"),
    FieldSpec::ontology("type", "Type"),
];

const ASSAY_FIELDS: &[FieldSpec] = &[
    FieldSpec::scalar("file_name", "File Name"),
    FieldSpec::ontology("measurement_type", "Measurement Type"),
    FieldSpec::ontology("technology_type", "Technology Type"),
    FieldSpec::scalar("technology_platform", "Technology Platform"),
];

const PROTOCOL_FIELDS: &[FieldSpec] = &[
    FieldSpec::scalar("name", "Name"),
    FieldSpec::ontology("type", "Type"),
    FieldSpec::scalar("description", "Description"),
    FieldSpec::scalar("uri", "URI"),
    FieldSpec::scalar("version", "Version"),
    FieldSpec::new("parameters", "Parameters Name", FieldKind::OntologyRefList),
    FieldSpec::new(
        "component_names",
        "Components Name",
        FieldKind::RepeatedScalarList,
    ),
    FieldSpec::new(
        "component_types",
        "Components Type",
        FieldKind::OntologyRefList,
    ),
];

pub const STUDY: SectionSpec = SectionSpec {
    header: STUDY_HEADER,
    prefix: "Study",
    scope: SectionScope::Study,
    layout: SectionLayout::Single,
    fields: STUDY_FIELDS,
};

pub const STUDY_DESIGN_DESCRIPTORS: SectionSpec = SectionSpec {
    header: "STUDY DESIGN DESCRIPTORS",
    prefix: "Study Design",
    scope: SectionScope::Study,
    layout: SectionLayout::Repeated {
        search_field: "type",
    },
    fields: DESIGN_FIELDS,
};

pub const STUDY_PUBLICATIONS: SectionSpec = SectionSpec {
    header: "STUDY PUBLICATIONS",
    prefix: "Study",
    scope: SectionScope::Study,
    layout: SectionLayout::Repeated {
        search_field: "pubmed_id",
    },
    fields: PUBLICATION_FIELDS,
};

pub const STUDY_FACTORS: SectionSpec = SectionSpec {
    header: "STUDY FACTORS",
    prefix: "Study Factor",
    scope: SectionScope::Study,
    layout: SectionLayout::Repeated {
        search_field: "name",
    },
    fields: FACTOR_FIELDS,
};

pub const STUDY_ASSAYS: SectionSpec = SectionSpec {
    header: "STUDY ASSAYS",
    prefix: "Study Assay",
    scope: SectionScope::Study,
    layout: SectionLayout::Repeated {
        search_field: "file_name",
    },
    fields: ASSAY_FIELDS,
};

pub const STUDY_PROTOCOLS: SectionSpec = SectionSpec {
    header: "STUDY PROTOCOLS",
    prefix: "Study Protocol",
    scope: SectionScope::Study,
    layout: SectionLayout::Repeated {
        search_field: "name",
    },
    fields: PROTOCOL_FIELDS,
};

pub const STUDY_CONTACTS: SectionSpec = SectionSpec {
    header: "STUDY CONTACTS",
    prefix: "Study Person",
    scope: SectionScope::Study,
    layout: SectionLayout::Repeated {
        search_field: "last_name",
    },
    fields: PERSON_FIELDS,
};

/// Sections before the first study, in file order.
pub const INITIAL_SECTIONS: &[SectionSpec] = &[
    ONTOLOGY_SOURCE_REFERENCE,
    INVESTIGATION,
    INVESTIGATION_PUBLICATIONS,
    INVESTIGATION_CONTACTS,
];

/// Sections of one study block, in file order.
pub const STUDY_SECTIONS: &[SectionSpec] = &[
    STUDY,
    STUDY_DESIGN_DESCRIPTORS,
    STUDY_PUBLICATIONS,
    STUDY_FACTORS,
    STUDY_ASSAYS,
    STUDY_PROTOCOLS,
    STUDY_CONTACTS,
];

/// Looks up a section by its header.
pub fn section_spec(header: &str) -> Result<&'static SectionSpec> {
    INITIAL_SECTIONS
        .iter()
        .chain(STUDY_SECTIONS)
        .find(|spec| spec.header == header)
        .ok_or_else(|| InvestigationError::UnknownSection {
            header: header.to_string(),
        })
}

static ROW_KEY_OWNERS: LazyLock<HashMap<String, &'static SectionSpec>> = LazyLock::new(|| {
    INITIAL_SECTIONS
        .iter()
        .chain(STUDY_SECTIONS)
        .flat_map(|spec| spec.row_keys().into_iter().map(move |key| (key, spec)))
        .collect()
});

/// Section owning a row key, if the key is part of the vocabulary.
pub fn section_of_key(key: &str) -> Option<&'static SectionSpec> {
    ROW_KEY_OWNERS.get(key).copied()
}
