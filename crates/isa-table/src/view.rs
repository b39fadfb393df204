//! Table view builder: column selection, filtering, sorting, pagination.

use std::collections::BTreeMap;

use isa_model::{
    ColumnDescriptor, FilterOption, ParserMessage, ParserReport, Row, SortOption, TableView,
};

use crate::error::Result;
use crate::filter::{FilterRegistry, compile_filters};
use crate::index::ColumnIndex;
use crate::sort::{SortRegistry, apply_sorts, compile_sorts};

/// What to return from a table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableQuery {
    /// Columns to return; `None` returns every column.
    pub selected_columns: Option<Vec<String>>,
    pub offset: usize,
    /// Maximum number of rows; `None` is unbounded.
    pub limit: Option<usize>,
    pub filter_options: Vec<FilterOption>,
    pub sort_options: Vec<SortOption>,
}

impl TableQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: FilterOption) -> Self {
        self.filter_options.push(filter);
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort_options.push(sort);
        self
    }

    fn reorders_rows(&self) -> bool {
        !self.filter_options.is_empty() || !self.sort_options.is_empty()
    }
}

/// Custom filter and sort evaluators available to a query.
#[derive(Debug, Default)]
pub struct TableRegistries {
    pub filters: FilterRegistry,
    pub sorts: SortRegistry,
}

/// Builds one page of a classified table.
///
/// `rows` are the data rows without the header. Caller mistakes (unknown
/// columns, unregistered operations, bad parameters) are returned as errors
/// before any row is read. A data row with non-empty cells beyond the header
/// yields one CRITICAL message and an empty view.
pub fn build_table_view(
    columns: &[ColumnDescriptor],
    rows: &[Row],
    query: &TableQuery,
    registries: &TableRegistries,
) -> Result<(TableView, ParserReport)> {
    let mut report = ParserReport::new();
    let index = ColumnIndex::new(columns);
    let selected = select_columns(columns, &index, query.selected_columns.as_deref())?;
    let filters = compile_filters(
        &query.filter_options,
        &index,
        columns.len(),
        &registries.filters,
    )?;
    let sorts = compile_sorts(&query.sort_options, &index, &registries.sorts)?;

    if let Some(message) = check_row_shape(rows, columns.len()) {
        tracing::warn!(detail = %message.detail, "table rows do not fit the header");
        report.push(message);
        return Ok((TableView::default(), report));
    }

    let mut indices: Vec<usize> = if query.reorders_rows() {
        (0..rows.len())
            .filter(|&row| filters.iter().all(|filter| filter.matches(&rows[row])))
            .collect()
    } else {
        (0..rows.len()).collect()
    };
    apply_sorts(&mut indices, rows, &sorts);

    let filtered_total = indices.len();
    let offset = query.offset.min(filtered_total);
    let count = query
        .limit
        .map_or(filtered_total - offset, |limit| limit.min(filtered_total - offset));
    let page = &indices[offset..offset + count];

    let data: BTreeMap<String, Vec<String>> = selected
        .iter()
        .map(|column| {
            let values = page
                .iter()
                .map(|&row| rows[row].get(column.index).cloned().unwrap_or_default())
                .collect();
            (column.column_name.clone(), values)
        })
        .collect();

    tracing::debug!(
        total_rows = rows.len(),
        filtered_rows = filtered_total,
        offset,
        count,
        columns = selected.len(),
        "built table view"
    );

    let selected_column_count = selected.len();
    let view = TableView {
        columns: selected.into_iter().cloned().collect(),
        data,
        total_row_count: rows.len(),
        filtered_total_row_count: filtered_total,
        row_offset: offset,
        row_count: count,
        total_column_count: columns.len(),
        selected_column_count,
        row_indices: page.to_vec(),
        filter_options: query.filter_options.clone(),
        sort_options: query.sort_options.clone(),
    };
    Ok((view, report))
}

/// Resolves the requested columns and appends each one's linked columns.
fn select_columns<'c>(
    columns: &'c [ColumnDescriptor],
    index: &ColumnIndex,
    requested: Option<&[String]>,
) -> Result<Vec<&'c ColumnDescriptor>> {
    let Some(requested) = requested else {
        return Ok(columns.iter().collect());
    };
    let by_position = |position: usize| columns.iter().find(|column| column.index == position);

    let mut selected: Vec<&ColumnDescriptor> = Vec::new();
    for position in index.resolve_all(requested)? {
        let Some(column) = by_position(position) else {
            continue;
        };
        let linked = column
            .linked_columns
            .iter()
            .filter_map(|name| index.get(name))
            .filter_map(by_position);
        for candidate in std::iter::once(column).chain(linked) {
            if !selected.iter().any(|chosen| chosen.index == candidate.index) {
                selected.push(candidate);
            }
        }
    }
    Ok(selected)
}

fn check_row_shape(rows: &[Row], width: usize) -> Option<ParserMessage> {
    rows.iter().enumerate().find_map(|(position, row)| {
        let extra = row.get(width..)?;
        let (offset, cell) = extra
            .iter()
            .enumerate()
            .find(|(_, cell)| !cell.trim().is_empty())?;
        Some(
            ParserMessage::critical(
                "invalid row",
                format!(
                    "data row {} has {} cells but the header has {width}; cell '{cell}' has no column",
                    position + 1,
                    row.len()
                ),
            )
            .with_column(width + offset + 1),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_columns;
    use crate::error::TableError;
    use crate::profile::HeaderProfile;
    use isa_model::{ColumnStructure, DataType, FilterOperation, MessageType, SortType};

    fn table(header: &[&str], data: &[&[&str]]) -> (Vec<ColumnDescriptor>, Vec<Row>) {
        let headers: Vec<String> = header.iter().map(|h| (*h).to_string()).collect();
        let patterns = HeaderProfile::sample().unwrap().compile().unwrap();
        let (columns, _) = classify_columns(&headers, &patterns);
        let rows = data
            .iter()
            .map(|row| row.iter().map(|c| (*c).to_string()).collect())
            .collect();
        (columns, rows)
    }

    fn build(
        columns: &[ColumnDescriptor],
        rows: &[Row],
        query: &TableQuery,
    ) -> Result<(TableView, ParserReport)> {
        build_table_view(columns, rows, query, &TableRegistries::default())
    }

    #[test]
    fn test_unfiltered_page() {
        let data: Vec<Vec<String>> = (0..12).map(|i| vec![format!("S{i}")]).collect();
        let (columns, _) = table(&["Sample Name"], &[]);
        let (view, report) =
            build(&columns, &data, &TableQuery::new().with_offset(5).with_limit(100)).unwrap();
        assert!(report.is_empty());
        assert_eq!(view.row_offset, 5);
        assert_eq!(view.row_count, 7);
        assert_eq!(view.filtered_total_row_count, 12);
        assert_eq!(view.column("Sample Name").unwrap()[0], "S5");
        assert_eq!(view.row_indices, (5..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_offset_beyond_end_is_clamped() {
        let (columns, rows) = table(&["Sample Name"], &[&["a"], &["b"]]);
        let (view, _) = build(&columns, &rows, &TableQuery::new().with_offset(10)).unwrap();
        assert_eq!(view.row_offset, 2);
        assert_eq!(view.row_count, 0);
    }

    #[test]
    fn test_selection_appends_linked_columns() {
        let (columns, rows) = table(
            &[
                "Source Name",
                "Characteristics[Organism]",
                "Term Source REF",
                "Term Accession Number",
            ],
            &[&["src", "rat", "NCBITAXON", "10116"]],
        );
        let (view, _) = build(
            &columns,
            &rows,
            &TableQuery::new().with_columns(["Characteristics[Organism]"]),
        )
        .unwrap();
        assert_eq!(
            view.column_names().collect::<Vec<_>>(),
            vec![
                "Characteristics[Organism]",
                "Term Source REF",
                "Term Accession Number"
            ]
        );
        assert_eq!(view.selected_column_count, 3);
        assert_eq!(view.total_column_count, 4);
        assert_eq!(view.row(0).unwrap(), vec!["rat", "NCBITAXON", "10116"]);
    }

    #[test]
    fn test_selection_appends_unit_and_ontology_columns() {
        let (columns, rows) = table(
            &[
                "Sample Name",
                "Factor Value[Dose]",
                "Unit",
                "Term Source REF",
                "Term Accession Number",
                "Characteristics[Organism]",
                "Term Source REF",
                "Term Accession Number",
            ],
            &[&["S1", "5", "mg", "UO", "UO_0000022", "rat", "NCBITAXON", "10116"]],
        );
        assert_eq!(
            columns[1].structure,
            ColumnStructure::SingleColumnAndUnitOntology
        );
        let (view, _) = build(
            &columns,
            &rows,
            &TableQuery::new().with_columns(["Factor Value[Dose]", "Sample Name"]),
        )
        .unwrap();
        assert_eq!(
            view.column_names().collect::<Vec<_>>(),
            vec![
                "Factor Value[Dose]",
                "Unit",
                "Term Source REF.0",
                "Term Accession Number.0",
                "Sample Name",
            ]
        );
        assert_eq!(view.selected_column_count, 5);
        assert_eq!(view.row(0).unwrap(), vec!["5", "mg", "UO", "UO_0000022", "S1"]);
    }

    #[test]
    fn test_unknown_selected_columns_fail() {
        let (columns, rows) = table(&["Sample Name"], &[&["a"]]);
        let err = build(
            &columns,
            &rows,
            &TableQuery::new().with_columns(["Sample Name", "Nope", "Nada"]),
        )
        .unwrap_err();
        match err {
            TableError::UnknownColumns { columns } => assert_eq!(columns, vec!["Nope", "Nada"]),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_filter_then_sort_then_page() {
        let (columns, rows) = table(
            &["Sample Name", "Factor Value[Dose]"],
            &[
                &["s1", "30"],
                &["s2", "80"],
                &["s3", "abc"],
                &["s4", ""],
                &["s5", "55"],
            ],
        );
        let query = TableQuery::new()
            .with_filter(
                FilterOption::new(FilterOperation::GreaterEqual, 50_i64)
                    .with_columns(["Factor Value[Dose]"])
                    .with_data_type(DataType::Integer),
            )
            .with_sort(SortOption::new("Factor Value[Dose]", SortType::Integer))
            .with_limit(1);
        let (view, _) = build(&columns, &rows, &query).unwrap();
        assert_eq!(view.filtered_total_row_count, 2);
        assert_eq!(view.row_count, 1);
        assert_eq!(view.column("Sample Name").unwrap(), ["s5"]);
        assert_eq!(view.row_indices, vec![4]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let (columns, rows) = table(&["Sample Name", "Protocol REF"], &[&["a"]]);
        let (view, report) = build(&columns, &rows, &TableQuery::new()).unwrap();
        assert!(report.is_empty());
        assert_eq!(view.column("Protocol REF").unwrap(), [""]);
    }

    #[test]
    fn test_extra_cells_abort_with_critical() {
        let (columns, rows) = table(
            &["Sample Name"],
            &[&["a", ""], &["b", "stray"]],
        );
        let (view, report) = build(&columns, &rows, &TableQuery::new()).unwrap();
        assert!(view.is_empty());
        assert_eq!(report.count(MessageType::Critical), 1);
        assert!(report.messages()[0].detail.starts_with("data row 2 has 2 cells"));
        assert_eq!(report.messages()[0].column, Some(2));
    }
}
