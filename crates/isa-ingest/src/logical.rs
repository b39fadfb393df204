//! Grouping of tokenized rows into logical investigation lines.
//!
//! A hand-edited investigation file may break a long value across physical
//! rows without quoting it. A row whose first cell is not a recognised key,
//! section header or comment continues the previous key or comment row: its
//! first cell is appended to the last value of that row with a line break and
//! its remaining cells are appended as further values.

use isa_model::{ParserMessage, ParserReport, Row};

use crate::tokenizer::SourceRow;

/// Marker opening a free-form file comment row.
pub const FILE_COMMENT_PREFIX: &str = "#";

/// Marker opening a section comment row.
pub const COMMENT_PREFIX: &str = "Comment";

/// How the first cell of a row was recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// A known field key such as `Study Title`.
    Key,
    /// A section header such as `STUDY PROTOCOLS`.
    Section,
    /// A `Comment[...]` row.
    Comment,
    /// A `#` row.
    FileComment,
    /// Anything else.
    Unknown,
}

impl LineKind {
    fn accepts_continuation(self) -> bool {
        matches!(self, Self::Key | Self::Comment)
    }
}

/// A row after continuation merging, with the line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub line: usize,
    pub kind: LineKind,
    pub cells: Row,
}

impl LogicalLine {
    pub fn key(&self) -> &str {
        self.cells.first().map(String::as_str).unwrap_or("")
    }

    /// Value cells (everything after the key).
    pub fn values(&self) -> &[String] {
        self.cells.get(1..).unwrap_or(&[])
    }
}

/// Classifies comment markers; other keys are classified by `classify`.
pub fn line_kind<F>(first_cell: &str, classify: &F) -> LineKind
where
    F: Fn(&str) -> LineKind,
{
    if first_cell.starts_with(FILE_COMMENT_PREFIX) {
        LineKind::FileComment
    } else if first_cell.starts_with(COMMENT_PREFIX) {
        LineKind::Comment
    } else {
        classify(first_cell)
    }
}

/// Merges continuation rows into the key or comment row preceding them.
///
/// `classify` decides whether a first cell is a key, a section header or
/// unknown. Unknown rows that cannot continue anything are kept as their own
/// [`LineKind::Unknown`] lines for the caller to report.
pub fn group_logical_lines<F>(rows: Vec<SourceRow>, classify: F) -> (Vec<LogicalLine>, ParserReport)
where
    F: Fn(&str) -> LineKind,
{
    let mut report = ParserReport::new();
    let mut lines: Vec<LogicalLine> = Vec::with_capacity(rows.len());

    for row in rows {
        let kind = line_kind(row.key(), &classify);
        if kind == LineKind::Unknown
            && let Some(previous) = lines
                .last_mut()
                .filter(|line| line.kind.accepts_continuation())
        {
            merge_continuation(previous, row.cells);
            report.push(
                ParserMessage::warning(
                    "merged continuation line",
                    format!(
                        "line {} continues the value of '{}' (line {})",
                        row.line,
                        previous.key(),
                        previous.line
                    ),
                )
                .with_line(row.line),
            );
            continue;
        }
        lines.push(LogicalLine {
            line: row.line,
            kind,
            cells: row.cells,
        });
    }

    tracing::trace!(
        lines = lines.len(),
        merged = report.len(),
        "grouped logical lines"
    );
    (lines, report)
}

fn merge_continuation(previous: &mut LogicalLine, cells: Row) {
    let mut cells = cells.into_iter();
    if let Some(first) = cells.next() {
        if previous.cells.len() > 1
            && let Some(last) = previous.cells.last_mut()
        {
            last.push('\n');
            last.push_str(&first);
        } else {
            previous.cells.push(first);
        }
    }
    previous.cells.extend(cells);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(key: &str) -> LineKind {
        match key {
            "STUDY" => LineKind::Section,
            "Study Title" | "Study Description" => LineKind::Key,
            _ => LineKind::Unknown,
        }
    }

    fn row(line: usize, cells: &[&str]) -> SourceRow {
        SourceRow::new(line, cells.iter().map(|c| (*c).to_string()).collect())
    }

    #[test]
    fn test_continuation_appends_to_last_value() {
        let rows = vec![
            row(1, &["STUDY"]),
            row(2, &["Study Description", "first part"]),
            row(3, &["second part", "extra"]),
            row(4, &["Study Title", "T"]),
        ];
        let (lines, report) = group_logical_lines(rows, classify);
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1].cells,
            vec!["Study Description", "first part\nsecond part", "extra"]
        );
        assert_eq!(report.len(), 1);
        assert_eq!(report.messages()[0].line, Some(3));
    }

    #[test]
    fn test_continuation_of_key_without_values() {
        let rows = vec![row(1, &["Study Title"]), row(2, &["orphan value"])];
        let (lines, _) = group_logical_lines(rows, classify);
        assert_eq!(lines[0].cells, vec!["Study Title", "orphan value"]);
    }

    #[test]
    fn test_unknown_after_section_is_kept() {
        let rows = vec![row(1, &["STUDY"]), row(2, &["garbage", "x"])];
        let (lines, report) = group_logical_lines(rows, classify);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].kind, LineKind::Unknown);
        assert!(report.is_empty());
    }

    #[test]
    fn test_comment_markers() {
        assert_eq!(line_kind("# exported", &classify), LineKind::FileComment);
        assert_eq!(line_kind("Comment[Funding]", &classify), LineKind::Comment);
        assert_eq!(line_kind("STUDY", &classify), LineKind::Section);
    }

    #[test]
    fn test_values_of_key_only_line() {
        let rows = vec![row(1, &["STUDY"])];
        let (lines, _) = group_logical_lines(rows, classify);
        assert!(lines[0].values().is_empty());
        assert_eq!(lines[0].key(), "STUDY");
    }
}
