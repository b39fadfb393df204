use std::fs;

use isa_ingest::{
    LineKind, TokenizerOptions, group_logical_lines, into_rows, render_rows, tokenize,
    tokenize_file,
};
use isa_model::MessageType;
use proptest::prelude::*;

fn cells_of(text: &str, options: &TokenizerOptions) -> Vec<Vec<String>> {
    into_rows(tokenize(text, options).0)
}

#[test]
fn tokenizes_investigation_file_from_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("i_Investigation.txt");
    fs::write(
        &path,
        "INVESTIGATION\r\nInvestigation Title\t\"Metabolite   profiling\"\r\n\r\nSTUDY\r\n",
    )
    .expect("write file");

    let (rows, report) = tokenize_file(&path, &TokenizerOptions::investigation());
    let cells: Vec<_> = rows.iter().map(|row| row.cells.clone()).collect();
    assert_eq!(
        cells,
        vec![
            vec!["INVESTIGATION".to_string()],
            vec![
                "Investigation Title".to_string(),
                "Metabolite profiling".to_string()
            ],
            vec!["STUDY".to_string()],
        ]
    );
    assert_eq!(rows[2].line, 4);
    assert_eq!(report.len(), 1);
    assert_eq!(report.messages()[0].message_type, MessageType::Warning);
}

#[test]
fn groups_broken_description_into_one_line() {
    let text = "STUDY\nStudy Description\tA long\nwrapped description\nStudy Title\tT\n";
    let (rows, _) = tokenize(text, &TokenizerOptions::investigation());
    let (lines, report) = group_logical_lines(rows, |key| match key {
        "STUDY" => LineKind::Section,
        "Study Description" | "Study Title" => LineKind::Key,
        _ => LineKind::Unknown,
    });
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1].values(), ["A long\nwrapped description"]);
    assert_eq!(report.messages()[0].short, "merged continuation line");
}

#[test]
fn stray_quote_keeps_following_rows() {
    let text = "Sample Name\tCharacteristics[Note]\n\
                s1\t\"5 inch tube\n\
                s2\tok\n\
                s3\tok\n\
                s4\t\"quoted\"\n\
                s5\tok\n";
    let (rows, report) = tokenize(text, &TokenizerOptions::table());

    assert_eq!(rows.len(), 6);
    assert_eq!(rows[1].cells, vec!["s1", "5 inch tube"]);
    assert_eq!(rows[4].cells, vec!["s4", "quoted"]);
    assert_eq!(rows[5].line, 6);
    assert_eq!(report.len(), 1);
    assert_eq!(report.messages()[0].short, "unterminated quoted value");
}

/// Plain cells, quoted cells holding a tab, stray opening quotes and inner quotes.
fn cell() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-zA-Z0-9 ]{0,8}",
        1 => "\"[a-z]{1,4}\t[a-z]{1,4}\"",
        1 => "\"[a-z]{1,6}",
        1 => "[a-z]{1,3}\" [a-z]{1,3}",
    ]
}

fn grid() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec(cell(), 1..5), 0..8)
}

proptest! {
    #[test]
    fn tokenizing_is_idempotent(rows in grid(), reflow in any::<bool>()) {
        let options = TokenizerOptions::table().with_reflow_cells(reflow);
        let text = render_rows(&rows);
        let first = cells_of(&text, &options);
        let second = cells_of(&render_rows(&first), &options);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn tokenized_cells_are_trimmed_and_rows_non_blank(rows in grid()) {
        let text = render_rows(&rows);
        for row in cells_of(&text, &TokenizerOptions::table()) {
            prop_assert!(row.len() > 1 || !row[0].is_empty());
            for cell in &row {
                prop_assert_eq!(cell.trim(), cell.as_str());
            }
        }
    }

    #[test]
    fn quotes_never_merge_lines_in_tables(rows in grid()) {
        let text = render_rows(&rows);
        let lines = text
            .split('\n')
            .filter(|line| line.contains('\t') || !line.trim().is_empty())
            .count();
        let (tokenized, _) = tokenize(&text, &TokenizerOptions::table());
        prop_assert_eq!(tokenized.len(), lines);
    }
}
