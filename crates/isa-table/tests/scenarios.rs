use isa_model::{
    ColumnStructure, DataType, FilterOperation, FilterOption, MessageType, SortOption, SortType,
    ValueOrder,
};
use isa_table::{
    ExpectedPattern, HeaderProfile, TableQuery, TableRegistries, build_table_view,
    classify_columns, read_isa_table_str,
};

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

fn sample_pattern() -> Vec<ExpectedPattern> {
    vec![ExpectedPattern::new("^(Sample Name)$", "Sample").expect("pattern")]
}

#[test]
fn unit_ontology_anchor_owns_three_linked_columns() {
    let (columns, report) = classify_columns(
        &headers(&[
            "Sample Name",
            "Unit",
            "Term Source REF",
            "Term Accession Number",
        ]),
        &sample_pattern(),
    );

    assert_eq!(columns.len(), 4);
    assert_eq!(
        columns[0].structure,
        ColumnStructure::SingleColumnAndUnitOntology
    );
    assert_eq!(columns[0].category, "Sample");
    assert_eq!(columns[0].qualifier.as_deref(), Some("Sample Name"));
    assert!(columns[1..].iter().all(|column| column.is_linked()));
    assert_eq!(report.count(MessageType::Error), 0);
    assert_eq!(report.count(MessageType::Critical), 0);
}

#[test]
fn swapped_continuation_columns_are_one_invalid_multi_column() {
    let (columns, report) = classify_columns(
        &headers(&[
            "Sample Name",
            "Term Source REF",
            "Unit",
            "Term Accession Number",
        ]),
        &sample_pattern(),
    );

    assert_eq!(columns[0].structure, ColumnStructure::InvalidMultiColumn);
    assert_eq!(report.count(MessageType::Critical), 1);
    assert_eq!(report.messages()[0].short, "invalid multi column");
}

#[test]
fn offset_and_limit_on_twelve_rows() {
    let (columns, _) = classify_columns(&headers(&["Sample Name"]), &sample_pattern());
    let rows: Vec<Vec<String>> = (1..=12).map(|i| vec![format!("sample-{i}")]).collect();
    let query = TableQuery::new().with_offset(5).with_limit(100);

    let (view, _) =
        build_table_view(&columns, &rows, &query, &TableRegistries::default()).expect("view");

    assert_eq!(view.row_count, 7);
    assert_eq!(view.row_offset, 5);
    assert_eq!(view.total_row_count, 12);
}

#[test]
fn greater_equal_integer_filter_keeps_only_valid_matches() {
    let (columns, _) = classify_columns(&headers(&["Sample Name"]), &sample_pattern());
    let rows: Vec<Vec<String>> = ["30", "80", "abc", ""]
        .iter()
        .map(|value| vec![(*value).to_string()])
        .collect();
    let query = TableQuery::new().with_filter(
        FilterOption::new(FilterOperation::GreaterEqual, 50_i64).with_data_type(DataType::Integer),
    );

    let (view, _) =
        build_table_view(&columns, &rows, &query, &TableRegistries::default()).expect("view");

    assert_eq!(view.column("Sample Name").expect("column"), ["80"]);
    assert_eq!(view.filtered_total_row_count, 1);
}

#[test]
fn reads_sample_table_text_end_to_end() {
    let text = "Source Name\tCharacteristics[Organism]\tTerm Source REF\tTerm Accession Number\tProtocol REF\tSample Name\tFactor Value[Dose]\tUnit\tTerm Source REF\tTerm Accession Number\n\
src1\tRattus norvegicus\tNCBITAXON\thttp://purl.obolibrary.org/obo/NCBITaxon_10116\tSample collection\tS1\t5\tmg\tUO\tUO_0000022\n\
src2\tRattus norvegicus\tNCBITAXON\thttp://purl.obolibrary.org/obo/NCBITaxon_10116\tSample collection\tS2\t\t\t\t\n\
src3\tMus musculus\tNCBITAXON\thttp://purl.obolibrary.org/obo/NCBITaxon_10090\tSample collection\tS3\t20\tmg\tUO\tUO_0000022\n";
    let profile = HeaderProfile::sample().expect("profile");
    let query = TableQuery::new()
        .with_columns(["Sample Name", "Factor Value[Dose]"])
        .with_sort(
            SortOption::new("Factor Value[Dose]", SortType::Float)
                .reversed()
                .with_value_order(ValueOrder::EmptyInvalidValid),
        );

    let result =
        read_isa_table_str(text, &profile, &query, &TableRegistries::default()).expect("read");
    let view = result.view.expect("view");

    assert!(!result.report.has_errors(), "{}", result.report);
    assert_eq!(view.row_count, 3);
    assert_eq!(
        view.column_names().collect::<Vec<_>>(),
        vec![
            "Sample Name",
            "Factor Value[Dose]",
            "Unit",
            "Term Source REF.1",
            "Term Accession Number.1",
        ]
    );
    // reversed: valid values descending, then the empty one
    assert_eq!(view.column("Sample Name").expect("column"), ["S3", "S1", "S2"]);
    assert_eq!(view.column("Unit").expect("column"), ["mg", "mg", ""]);
    let factor = result
        .columns
        .iter()
        .find(|column| column.column_name == "Factor Value[Dose]")
        .expect("factor column");
    assert_eq!(factor.category, "Factor Value");
    assert_eq!(factor.qualifier.as_deref(), Some("Dose"));
}

#[test]
fn unknown_filter_column_fails_before_scanning() {
    let profile = HeaderProfile::sample().expect("profile");
    let query = TableQuery::new()
        .with_filter(FilterOption::new(FilterOperation::Contains, "x").with_columns(["Nope"]));
    let err = read_isa_table_str("Sample Name\nS1\n", &profile, &query, &TableRegistries::default())
        .expect_err("unknown column");
    assert_eq!(err.to_string(), "unknown column(s): Nope");
}

#[test]
fn malformed_header_row_report() {
    let (columns, report) = classify_columns(
        &headers(&[
            "Term Source REF",
            "Sample Name",
            "Mystery",
            "Unit",
            "Term Source REF",
        ]),
        &sample_pattern(),
    );

    assert_eq!(columns[0].structure, ColumnStructure::AdditionalColumn);
    assert_eq!(columns[2].structure, ColumnStructure::InvalidMultiColumn);
    insta::assert_snapshot!(report.to_string(), @r"
    [CRITICAL] (column 1): not linked to a previous header - 'Term Source REF' does not follow a column it can belong to
    [CRITICAL] (column 3): invalid multi column - 'Mystery' is followed by [Unit, Term Source REF]; expected [Unit, Term Source REF, Term Accession Number] or [Term Source REF, Term Accession Number]
    [INFO] (column 3): undefined column - 'Mystery' matches no expected header
    Summary: 2 critical, 0 errors, 0 warnings, 1 info
    ");
}
