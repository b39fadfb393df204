use std::collections::HashSet;

use isa_model::{
    ColumnDescriptor, FilterOperation, FilterOption, Row, SortOption, SortType,
};
use isa_table::{
    ExpectedPattern, TableQuery, TableRegistries, build_table_view, classify_columns,
    disambiguate_headers,
};
use proptest::prelude::*;

const HEADERS: [&str; 3] = ["Sample Name", "Group", "Dose"];

fn columns() -> Vec<ColumnDescriptor> {
    let headers: Vec<String> = HEADERS.iter().map(|h| (*h).to_string()).collect();
    let patterns = vec![ExpectedPattern::new("^(.+)$", "Any").expect("pattern")];
    classify_columns(&headers, &patterns).0
}

fn table_rows() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(
        ("[a-c]{1,2}", "[xy]?", prop_oneof!["[1-9][0-9]{0,2}", Just(String::new()), Just("n/a".to_string())])
            .prop_map(|(name, group, dose)| vec![name, group, dose]),
        0..30,
    )
}

fn page(rows: &[Row], query: &TableQuery) -> isa_model::TableView {
    build_table_view(&columns(), rows, query, &TableRegistries::default())
        .expect("valid query")
        .0
}

proptest! {
    #[test]
    fn pagination_laws(rows in table_rows(), offset in 0usize..40, limit in proptest::option::of(0usize..40)) {
        let mut query = TableQuery::new().with_offset(offset);
        query.limit = limit;
        let view = page(&rows, &query);

        let filtered = view.filtered_total_row_count;
        prop_assert_eq!(filtered, rows.len());
        prop_assert_eq!(view.row_offset, offset.min(filtered));
        let remaining = filtered - view.row_offset;
        prop_assert_eq!(view.row_count, limit.map_or(remaining, |limit| limit.min(remaining)));
        prop_assert_eq!(view.row_indices.len(), view.row_count);
    }

    #[test]
    fn unbounded_first_page_returns_every_filtered_row(rows in table_rows()) {
        let query = TableQuery::new()
            .with_filter(FilterOption::new(FilterOperation::Contains, "a").with_columns(["Sample Name"]));
        let view = page(&rows, &query);
        prop_assert_eq!(view.row_count, view.filtered_total_row_count);
    }

    #[test]
    fn filters_form_a_conjunction(rows in table_rows()) {
        let by_name = FilterOption::new(FilterOperation::StartsWith, "a").with_columns(["Sample Name"]);
        let by_group = FilterOption::new(FilterOperation::Equal, "x").with_columns(["Group"]);
        let query = TableQuery::new().with_filter(by_name).with_filter(by_group);
        let view = page(&rows, &query);

        let expected: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row[0].starts_with('a') && row[1] == "x")
            .map(|(index, _)| index)
            .collect();
        prop_assert_eq!(view.row_indices, expected);
    }

    #[test]
    fn no_filters_keep_every_row(rows in table_rows()) {
        let view = page(&rows, &TableQuery::new());
        prop_assert_eq!(view.row_indices, (0..rows.len()).collect::<Vec<_>>());
    }

    #[test]
    fn first_sort_option_is_primary(rows in table_rows()) {
        let query = TableQuery::new()
            .with_sort(SortOption::new("Group", SortType::String))
            .with_sort(SortOption::new("Sample Name", SortType::String));
        let view = page(&rows, &query);

        let keys: Vec<(String, String)> = view
            .row_indices
            .iter()
            .map(|&index| (rows[index][1].clone(), rows[index][0].clone()))
            .collect();
        for pair in keys.windows(2) {
            let (group_a, name_a) = &pair[0];
            let (group_b, name_b) = &pair[1];
            // non-empty groups first, then ascending; names break ties
            let rank = |group: &str| (group.is_empty(), group.to_string());
            prop_assert!(rank(group_a) < rank(group_b) || (group_a == group_b && name_a <= name_b));
        }
    }

    #[test]
    fn reversing_a_key_reverses_pairs_it_orders(rows in table_rows()) {
        let forward = page(&rows, &TableQuery::new().with_sort(SortOption::new("Dose", SortType::Integer)));
        let backward = page(&rows, &TableQuery::new().with_sort(SortOption::new("Dose", SortType::Integer).reversed()));

        let position = |indices: &[usize], row: usize| indices.iter().position(|&i| i == row);
        for a in 0..rows.len() {
            for b in 0..rows.len() {
                if rows[a][2].trim() == rows[b][2].trim() {
                    continue;
                }
                let before = position(&forward.row_indices, a) < position(&forward.row_indices, b);
                let after = position(&backward.row_indices, a) < position(&backward.row_indices, b);
                prop_assert_ne!(before, after);
            }
        }
    }

    #[test]
    fn disambiguated_names_are_unique(headers in prop::collection::vec("(Unit|Protocol REF|Sample Name)(\\.[0-2])?", 0..12)) {
        let names = disambiguate_headers(&headers);
        let unique: HashSet<&String> = names.iter().collect();
        prop_assert_eq!(unique.len(), names.len());
        prop_assert_eq!(disambiguate_headers(&headers), names);
    }
}
