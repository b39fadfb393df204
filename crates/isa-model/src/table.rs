//! Column descriptors and paginated table views.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A tokenized row. Row 0 of a table is its header row.
pub type Row = Vec<String>;

/// Category assigned to columns consumed by a multi-column anchor.
pub const LINKED_COLUMN_CATEGORY: &str = "Linked Column";

/// Category assigned to columns no expected pattern matched.
pub const UNDEFINED_CATEGORY: &str = "Undefined";

/// Structural role of a column within an ISA table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnStructure {
    /// Stand-alone column.
    SingleColumn,
    /// Anchor followed by `Term Source REF`, `Term Accession Number`.
    OntologyColumn,
    /// Anchor followed by `Unit`, `Term Source REF`, `Term Accession Number`.
    SingleColumnAndUnitOntology,
    /// Column consumed by the anchor to its left.
    LinkedColumn,
    /// Continuation column with no anchor.
    AdditionalColumn,
    /// Anchor followed by continuation columns that match no template.
    InvalidMultiColumn,
}

impl ColumnStructure {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnStructure::SingleColumn => "SINGLE_COLUMN",
            ColumnStructure::OntologyColumn => "ONTOLOGY_COLUMN",
            ColumnStructure::SingleColumnAndUnitOntology => "SINGLE_COLUMN_AND_UNIT_ONTOLOGY",
            ColumnStructure::LinkedColumn => "LINKED_COLUMN",
            ColumnStructure::AdditionalColumn => "ADDITIONAL_COLUMN",
            ColumnStructure::InvalidMultiColumn => "INVALID_MULTI_COLUMN",
        }
    }

    /// Number of linked columns a valid anchor of this structure owns.
    pub fn linked_column_count(&self) -> usize {
        match self {
            ColumnStructure::OntologyColumn => 2,
            ColumnStructure::SingleColumnAndUnitOntology => 3,
            _ => 0,
        }
    }
}

impl fmt::Display for ColumnStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification result for one header cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// 0-based position in the header row.
    pub index: usize,
    /// Header text exactly as tokenized.
    pub raw_header: String,
    /// Unique name within the table; key of [`TableView::data`].
    pub column_name: String,
    /// Header without its numeric disambiguation suffix.
    pub cleaned_name: String,
    /// Category label from the first matching expected pattern.
    pub category: String,
    /// Text captured by the matching expected pattern.
    pub qualifier: Option<String>,
    pub structure: ColumnStructure,
    /// Unique names of the columns this anchor owns, in header order.
    pub linked_columns: Vec<String>,
}

impl ColumnDescriptor {
    pub fn is_linked(&self) -> bool {
        self.structure == ColumnStructure::LinkedColumn
    }
}

/// Paginated, column-oriented slice of an ISA table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableView {
    /// Selected columns in output order.
    pub columns: Vec<ColumnDescriptor>,
    /// Column name to cells of the returned rows.
    pub data: BTreeMap<String, Vec<String>>,
    /// Data rows in the table (header excluded).
    pub total_row_count: usize,
    /// Data rows that survived filtering, before pagination.
    pub filtered_total_row_count: usize,
    pub row_offset: usize,
    /// Rows actually returned.
    pub row_count: usize,
    pub total_column_count: usize,
    pub selected_column_count: usize,
    /// Source row numbers (1-based, header is row 0) of the returned rows.
    pub row_indices: Vec<usize>,
    pub filter_options: Vec<crate::FilterOption>,
    pub sort_options: Vec<crate::SortOption>,
}

impl TableView {
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.data.get(name).map(Vec::as_slice)
    }

    /// Materializes one returned row in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&str>> {
        if index >= self.row_count {
            return None;
        }
        self.columns
            .iter()
            .map(|column| {
                self.data
                    .get(&column.column_name)
                    .and_then(|cells| cells.get(index))
                    .map(String::as_str)
            })
            .collect()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.column_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(index: usize, name: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            index,
            raw_header: name.to_string(),
            column_name: name.to_string(),
            cleaned_name: name.to_string(),
            category: UNDEFINED_CATEGORY.to_string(),
            qualifier: None,
            structure: ColumnStructure::SingleColumn,
            linked_columns: Vec::new(),
        }
    }

    #[test]
    fn view_row_materializes_in_column_order() {
        let mut view = TableView {
            columns: vec![descriptor(0, "B"), descriptor(1, "A")],
            row_count: 2,
            ..TableView::default()
        };
        view.data.insert("A".into(), vec!["a1".into(), "a2".into()]);
        view.data.insert("B".into(), vec!["b1".into(), "b2".into()]);

        assert_eq!(view.row(1), Some(vec!["b2", "a2"]));
        assert_eq!(view.row(2), None);
        assert_eq!(view.column("A"), Some(&["a1".to_string(), "a2".to_string()][..]));
    }

    #[test]
    fn linked_counts() {
        assert_eq!(ColumnStructure::OntologyColumn.linked_column_count(), 2);
        assert_eq!(
            ColumnStructure::SingleColumnAndUnitOntology.linked_column_count(),
            3
        );
        assert_eq!(ColumnStructure::SingleColumn.linked_column_count(), 0);
    }
}
