//! Column classifier.
//!
//! Walks a header row left to right and assigns each column a structure
//! (stand-alone, ontology anchor, unit+ontology anchor, linked, dangling or
//! malformed) and a category from the expected header patterns.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use isa_model::{
    ColumnDescriptor, ColumnStructure, LINKED_COLUMN_CATEGORY, ParserMessage, ParserReport,
    UNDEFINED_CATEGORY,
};
use regex::Regex;

use crate::profile::ExpectedPattern;

static DISAMBIGUATION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\d+$").expect("Invalid suffix regex"));

pub const UNIT: &str = "Unit";
pub const TERM_SOURCE_REF: &str = "Term Source REF";
pub const TERM_ACCESSION_NUMBER: &str = "Term Accession Number";

/// `Unit`, `Term Source REF`, `Term Accession Number`.
const UNIT_ONTOLOGY_TEMPLATE: [&str; 3] = [UNIT, TERM_SOURCE_REF, TERM_ACCESSION_NUMBER];

/// `Term Source REF`, `Term Accession Number`.
const ONTOLOGY_TEMPLATE: [&str; 2] = [TERM_SOURCE_REF, TERM_ACCESSION_NUMBER];

/// Header without a trailing `.N` disambiguation suffix.
pub fn clean_header_name(header: &str) -> &str {
    match DISAMBIGUATION_SUFFIX.find(header) {
        Some(suffix) => &header[..suffix.start()],
        None => header,
    }
}

/// True for `Unit`, `Term Source REF` and `Term Accession Number`, with or without `.N`.
pub fn is_continuation_header(header: &str) -> bool {
    let cleaned = clean_header_name(header);
    cleaned == UNIT || cleaned == TERM_SOURCE_REF || cleaned == TERM_ACCESSION_NUMBER
}

/// Unique column names for a header row.
///
/// Headers that occur once keep their text. A repeated header becomes
/// `header.0`, `header.1`, ... on every occurrence; a generated name that is
/// already taken by another header is skipped.
pub fn disambiguate_headers(headers: &[String]) -> Vec<String> {
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for header in headers {
        *occurrences.entry(header.as_str()).or_default() += 1;
    }

    let mut taken: HashSet<String> = headers.iter().cloned().collect();
    let mut counters: HashMap<&str, usize> = HashMap::new();
    headers
        .iter()
        .map(|header| {
            if occurrences[header.as_str()] == 1 {
                return header.clone();
            }
            let counter = counters.entry(header.as_str()).or_default();
            loop {
                let candidate = format!("{header}.{counter}");
                *counter += 1;
                if taken.insert(candidate.clone()) {
                    break candidate;
                }
            }
        })
        .collect()
}

/// Classifies a header row.
///
/// Never fails: problems downgrade the affected column and add a message.
/// Message column numbers are 1-based.
pub fn classify_columns(
    headers: &[String],
    patterns: &[ExpectedPattern],
) -> (Vec<ColumnDescriptor>, ParserReport) {
    let mut report = ParserReport::new();
    let names = disambiguate_headers(headers);
    let mut columns = Vec::with_capacity(headers.len());

    for (index, header) in headers.iter().enumerate() {
        if header.is_empty() {
            report.push(
                ParserMessage::error("invalid header", "header cell is empty")
                    .with_column(index + 1),
            );
        } else if header.trim() != header {
            report.push(
                ParserMessage::error(
                    "invalid header",
                    format!("header '{header}' has leading or trailing whitespace"),
                )
                .with_column(index + 1),
            );
        }
    }

    let mut index = 0;
    while index < headers.len() {
        let header = &headers[index];

        if is_continuation_header(header) {
            report.push(
                ParserMessage::critical(
                    "not linked to a previous header",
                    format!("'{header}' does not follow a column it can belong to"),
                )
                .with_column(index + 1),
            );
            let (category, qualifier) = match_category(header, patterns);
            columns.push(descriptor(
                index,
                header,
                &names[index],
                category,
                qualifier,
                ColumnStructure::AdditionalColumn,
            ));
            index += 1;
            continue;
        }

        let following = headers[index + 1..]
            .iter()
            .take_while(|next| is_continuation_header(next))
            .map(|next| clean_header_name(next))
            .collect::<Vec<_>>();

        let (structure, consumed) = if following.starts_with(&UNIT_ONTOLOGY_TEMPLATE) {
            (ColumnStructure::SingleColumnAndUnitOntology, 3)
        } else if following.starts_with(&ONTOLOGY_TEMPLATE) {
            (ColumnStructure::OntologyColumn, 2)
        } else if !following.is_empty() {
            report.push(
                ParserMessage::critical(
                    "invalid multi column",
                    format!(
                        "'{header}' is followed by [{}]; expected [{}] or [{}]",
                        following.join(", "),
                        UNIT_ONTOLOGY_TEMPLATE.join(", "),
                        ONTOLOGY_TEMPLATE.join(", ")
                    ),
                )
                .with_column(index + 1),
            );
            (ColumnStructure::InvalidMultiColumn, following.len())
        } else {
            (ColumnStructure::SingleColumn, 0)
        };

        let (category, qualifier) = match_category(header, patterns);
        if category == UNDEFINED_CATEGORY {
            report.push(
                ParserMessage::info(
                    "undefined column",
                    format!("'{header}' matches no expected header"),
                )
                .with_column(index + 1),
            );
        }

        let mut anchor = descriptor(index, header, &names[index], category, qualifier, structure);
        anchor.linked_columns = names[index + 1..=index + consumed].to_vec();
        columns.push(anchor);

        for linked in index + 1..=index + consumed {
            columns.push(descriptor(
                linked,
                &headers[linked],
                &names[linked],
                LINKED_COLUMN_CATEGORY.to_string(),
                None,
                ColumnStructure::LinkedColumn,
            ));
        }
        index += consumed + 1;
    }

    tracing::debug!(
        columns = columns.len(),
        messages = report.len(),
        "classified table columns"
    );
    (columns, report)
}

fn match_category(header: &str, patterns: &[ExpectedPattern]) -> (String, Option<String>) {
    let cleaned = clean_header_name(header);
    patterns
        .iter()
        .find_map(|pattern| {
            pattern
                .capture(cleaned)
                .map(|qualifier| (pattern.category.clone(), Some(qualifier.to_string())))
        })
        .unwrap_or_else(|| (UNDEFINED_CATEGORY.to_string(), None))
}

fn descriptor(
    index: usize,
    header: &str,
    column_name: &str,
    category: String,
    qualifier: Option<String>,
    structure: ColumnStructure,
) -> ColumnDescriptor {
    ColumnDescriptor {
        index,
        raw_header: header.to_string(),
        column_name: column_name.to_string(),
        cleaned_name: clean_header_name(header).to_string(),
        category,
        qualifier,
        structure,
        linked_columns: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isa_model::MessageType;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_string()).collect()
    }

    fn patterns() -> Vec<ExpectedPattern> {
        vec![
            ExpectedPattern::new("^(Sample Name)$", "Sample").unwrap(),
            ExpectedPattern::new(r"^Characteristics\[(.+)\]$", "Characteristics").unwrap(),
            ExpectedPattern::new("^(Protocol REF)$", "Protocol").unwrap(),
        ]
    }

    #[test]
    fn test_clean_header_name() {
        assert_eq!(clean_header_name("Unit.2"), "Unit");
        assert_eq!(clean_header_name("Sample Name"), "Sample Name");
        assert_eq!(clean_header_name("Version 1.5a"), "Version 1.5a");
    }

    #[test]
    fn test_disambiguate_repeated_headers() {
        let names = disambiguate_headers(&headers(&[
            "Protocol REF",
            "Unit",
            "Protocol REF",
            "Unit",
            "Sample Name",
        ]));
        assert_eq!(
            names,
            vec!["Protocol REF.0", "Unit.0", "Protocol REF.1", "Unit.1", "Sample Name"]
        );
    }

    #[test]
    fn test_disambiguate_skips_taken_names() {
        let names = disambiguate_headers(&headers(&["Unit", "Unit.0", "Unit"]));
        assert_eq!(names, vec!["Unit.1", "Unit.0", "Unit.2"]);
    }

    #[test]
    fn test_single_columns_with_categories() {
        let (columns, report) = classify_columns(
            &headers(&["Sample Name", "Characteristics[Organism]"]),
            &patterns(),
        );
        assert!(report.is_empty());
        assert_eq!(columns[0].category, "Sample");
        assert_eq!(columns[1].structure, ColumnStructure::SingleColumn);
        assert_eq!(columns[1].qualifier.as_deref(), Some("Organism"));
    }

    #[test]
    fn test_ontology_anchor() {
        let (columns, report) = classify_columns(
            &headers(&[
                "Characteristics[Organism]",
                "Term Source REF",
                "Term Accession Number",
                "Sample Name",
            ]),
            &patterns(),
        );
        assert!(report.is_empty());
        assert_eq!(columns[0].structure, ColumnStructure::OntologyColumn);
        assert_eq!(
            columns[0].linked_columns,
            vec!["Term Source REF", "Term Accession Number"]
        );
        assert!(columns[1].is_linked());
        assert_eq!(columns[2].category, LINKED_COLUMN_CATEGORY);
        assert_eq!(columns[3].structure, ColumnStructure::SingleColumn);
    }

    #[test]
    fn test_dangling_continuation_is_additional() {
        let (columns, report) = classify_columns(&headers(&["Unit", "Sample Name"]), &patterns());
        assert_eq!(columns[0].structure, ColumnStructure::AdditionalColumn);
        assert_eq!(report.count(MessageType::Critical), 1);
        assert_eq!(report.messages()[0].column, Some(1));
    }

    #[test]
    fn test_extra_continuation_after_template_is_additional() {
        let (columns, report) = classify_columns(
            &headers(&[
                "Sample Name",
                "Term Source REF",
                "Term Accession Number",
                "Unit",
            ]),
            &patterns(),
        );
        assert_eq!(columns[0].structure, ColumnStructure::OntologyColumn);
        assert_eq!(columns[3].structure, ColumnStructure::AdditionalColumn);
        assert_eq!(report.count(MessageType::Critical), 1);
    }

    #[test]
    fn test_lone_unit_is_invalid_multi_column() {
        let (columns, report) =
            classify_columns(&headers(&["Sample Name", "Unit"]), &patterns());
        assert_eq!(columns[0].structure, ColumnStructure::InvalidMultiColumn);
        assert_eq!(columns[1].structure, ColumnStructure::LinkedColumn);
        assert_eq!(report.count(MessageType::Critical), 1);
    }

    #[test]
    fn test_undefined_column_is_info() {
        let (columns, report) = classify_columns(&headers(&["Mystery"]), &patterns());
        assert_eq!(columns[0].category, UNDEFINED_CATEGORY);
        assert_eq!(report.count(MessageType::Info), 1);
        assert!(!report.has_errors());
    }

    #[test]
    fn test_blank_and_padded_headers_are_errors() {
        let (columns, report) =
            classify_columns(&headers(&["", " Sample Name", "Sample Name"]), &patterns());
        assert_eq!(columns.len(), 3);
        assert_eq!(report.count(MessageType::Error), 2);
    }
}
