//! Investigation file writer.

use std::fs;
use std::path::Path;

use isa_ingest::render_rows;
use isa_model::{Comment, Investigation, Row, Study};

use crate::error::{InvestigationError, Result};
use crate::record::{FieldValue, Record, join_list};
use crate::vocabulary::{
    FieldKind, INVESTIGATION, INVESTIGATION_CONTACTS, INVESTIGATION_PUBLICATIONS,
    ONTOLOGY_SOURCE_REFERENCE, STUDY, STUDY_ASSAYS, STUDY_CONTACTS, STUDY_DESIGN_DESCRIPTORS,
    STUDY_FACTORS, STUDY_PROTOCOLS, STUDY_PUBLICATIONS, SectionSpec,
};

/// Serializes a document into the tab-separated investigation layout.
///
/// Keys and section headers are written bare, values are quoted with inner
/// quotes doubled. Parsing the output yields the same document as long as
/// values carry no tabs or line breaks.
pub fn write_investigation(investigation: &Investigation) -> String {
    let mut rows: Vec<Row> = Vec::new();

    let sources = &investigation.ontology_source_references;
    write_section(
        &mut rows,
        &ONTOLOGY_SOURCE_REFERENCE,
        &sources.references,
        &sources.comments,
    );
    write_section(
        &mut rows,
        &INVESTIGATION,
        std::slice::from_ref(investigation),
        &investigation.comments,
    );
    let publications = &investigation.publications;
    write_section(
        &mut rows,
        &INVESTIGATION_PUBLICATIONS,
        &publications.publications,
        &publications.comments,
    );
    let contacts = &investigation.contacts;
    write_section(
        &mut rows,
        &INVESTIGATION_CONTACTS,
        &contacts.people,
        &contacts.comments,
    );

    for study in &investigation.studies {
        write_study(&mut rows, study);
    }

    let mut text = render_rows(&rows);
    text.push('\n');
    text
}

/// Writes [`write_investigation`]'s output to `path`.
pub fn write_investigation_file(path: &Path, investigation: &Investigation) -> Result<()> {
    fs::write(path, write_investigation(investigation)).map_err(|source| {
        InvestigationError::Write {
            path: path.to_path_buf(),
            source,
        }
    })?;
    tracing::info!(
        path = %path.display(),
        studies = investigation.studies.len(),
        "wrote investigation file"
    );
    Ok(())
}

fn write_study(rows: &mut Vec<Row>, study: &Study) {
    write_section(rows, &STUDY, std::slice::from_ref(study), &study.comments);
    let design = &study.design_descriptors;
    write_section(
        rows,
        &STUDY_DESIGN_DESCRIPTORS,
        &design.design_types,
        &design.comments,
    );
    let publications = &study.publications;
    write_section(
        rows,
        &STUDY_PUBLICATIONS,
        &publications.publications,
        &publications.comments,
    );
    write_section(
        rows,
        &STUDY_FACTORS,
        &study.factors.factors,
        &study.factors.comments,
    );
    write_section(
        rows,
        &STUDY_ASSAYS,
        &study.assays.assays,
        &study.assays.comments,
    );
    write_section(
        rows,
        &STUDY_PROTOCOLS,
        &study.protocols.protocols,
        &study.protocols.comments,
    );
    write_section(
        rows,
        &STUDY_CONTACTS,
        &study.contacts.people,
        &study.contacts.comments,
    );
}

fn write_section<R: Record>(
    rows: &mut Vec<Row>,
    spec: &SectionSpec,
    records: &[R],
    comments: &[Comment],
) {
    rows.push(vec![spec.header.to_string()]);

    for field in spec.fields {
        let keys = field.row_keys(spec.prefix);
        let columns: Vec<[String; 3]> = records
            .iter()
            .map(|record| cells(field.kind, record.value(field.name)))
            .collect();
        for (position, key) in keys.into_iter().enumerate() {
            let mut row = vec![key];
            row.extend(columns.iter().map(|column| quote(&column[position])));
            rows.push(row);
        }
    }

    for comment in comments {
        let mut row = vec![format!("Comment[{}]", comment.name)];
        row.extend(comment.value.iter().map(String::as_str).map(quote));
        rows.push(row);
    }
}

/// Term, accession and source cells of one value. Scalars use the first.
fn cells(kind: FieldKind, value: FieldValue) -> [String; 3] {
    match kind {
        FieldKind::Scalar => [value.into_text(), String::new(), String::new()],
        FieldKind::RepeatedScalarList => {
            let values = value.into_text_list();
            [join_list(values.iter().map(String::as_str)), String::new(), String::new()]
        }
        FieldKind::OntologyRef => {
            let annotation = value.into_ontology();
            [
                annotation.term,
                annotation.term_accession_number,
                annotation.term_source_ref,
            ]
        }
        FieldKind::OntologyRefList => {
            let annotations = value.into_ontology_list();
            [
                join_list(annotations.iter().map(|a| a.term.as_str())),
                join_list(annotations.iter().map(|a| a.term_accession_number.as_str())),
                join_list(annotations.iter().map(|a| a.term_source_ref.as_str())),
            ]
        }
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
