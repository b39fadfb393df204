//! Tab-delimited tokenizer tolerant of loosely escaped rich text.
//!
//! ISA-Tab files are edited by hand and by many tools, so quoted values
//! routinely carry raw tabs and line breaks, and blank lines appear between
//! sections. The tokenizer recovers a clean row/cell grid from such input:
//!
//! 1. Blank lines are dropped (one WARNING for the whole file).
//! 2. A cell opening with `"` extends across tabs until its closing quote;
//!    the embedded whitespace is collapsed to single spaces (one WARNING
//!    listing the most significant replacements). With
//!    [`TokenizerOptions::multiline_quotes`] it may also cross line breaks,
//!    but never into a line that starts a new row.
//! 3. An opening quote that cannot be closed under those rules is kept as
//!    text and reported.
//! 4. Every cell is trimmed and loses one leading and one trailing `"`.
//! 5. Optionally (investigation files) internal whitespace runs are reflowed
//!    to one space. Table cells are only trimmed.

use std::sync::LazyLock;

use isa_model::{ParserMessage, ParserReport, Row};
use regex::Regex;

use crate::decode::{decode_bytes, normalize_line_endings};

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Default number of replacements listed in the quoted-whitespace warning.
pub const DEFAULT_MAX_REPORTED_REPLACEMENTS: usize = 20;

/// Excerpt length used when listing replacements.
const EXCERPT_LENGTH: usize = 40;

/// Tokenizer behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Collapse internal whitespace runs of every cell to one space.
    pub reflow_cells: bool,
    /// Let quoted values cross line breaks (up to the next row start).
    pub multiline_quotes: bool,
    /// Keep rows made only of tabs as rows of empty cells.
    pub keep_empty_rows: bool,
    /// Upper bound on replacements listed in the quoted-whitespace warning.
    pub max_reported_replacements: usize,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            reflow_cells: false,
            multiline_quotes: false,
            keep_empty_rows: true,
            max_reported_replacements: DEFAULT_MAX_REPORTED_REPLACEMENTS,
        }
    }
}

impl TokenizerOptions {
    /// Options for investigation files: cells reflowed, quoted values may
    /// span lines, tab-only rows dropped.
    pub fn investigation() -> Self {
        Self {
            reflow_cells: true,
            multiline_quotes: true,
            keep_empty_rows: false,
            ..Self::default()
        }
    }

    /// Options for sample, assay and assignment tables (cells only trimmed).
    pub fn table() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_reflow_cells(mut self, enable: bool) -> Self {
        self.reflow_cells = enable;
        self
    }

    #[must_use]
    pub fn with_multiline_quotes(mut self, enable: bool) -> Self {
        self.multiline_quotes = enable;
        self
    }

    #[must_use]
    pub fn with_keep_empty_rows(mut self, enable: bool) -> Self {
        self.keep_empty_rows = enable;
        self
    }

    #[must_use]
    pub fn with_max_reported_replacements(mut self, max: usize) -> Self {
        self.max_reported_replacements = max;
        self
    }
}

/// A tokenized row with the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub line: usize,
    pub cells: Row,
}

impl SourceRow {
    pub fn new(line: usize, cells: Row) -> Self {
        Self { line, cells }
    }

    /// First cell, or `""` for an empty row.
    pub fn key(&self) -> &str {
        self.cells.first().map(String::as_str).unwrap_or("")
    }
}

/// Drops line numbers, keeping the row grid.
pub fn into_rows(rows: Vec<SourceRow>) -> Vec<Row> {
    rows.into_iter().map(|row| row.cells).collect()
}

/// Tokenizes decoded text. Never fails; anomalies are reported.
///
/// No line is treated as a row start, so with
/// [`TokenizerOptions::multiline_quotes`] a quoted value may continue until
/// its closing quote. Use [`tokenize_with`] to bound it by a key vocabulary.
pub fn tokenize(text: &str, options: &TokenizerOptions) -> (Vec<SourceRow>, ParserReport) {
    tokenize_with(text, options, |_| false)
}

/// Tokenizes decoded text, ending quoted values before any line whose first
/// cell satisfies `is_row_start`.
pub fn tokenize_with<F>(
    text: &str,
    options: &TokenizerOptions,
    is_row_start: F,
) -> (Vec<SourceRow>, ParserReport)
where
    F: Fn(&str) -> bool,
{
    let mut report = ParserReport::new();
    let text = normalize_line_endings(text);

    let scanner = Scanner::new(&text, options, is_row_start);
    let (records, unterminated) = scanner.scan();
    for line in unterminated {
        report.push(
            ParserMessage::warning(
                "unterminated quoted value",
                "opening quote has no closing quote in its row; the quote is kept as text",
            )
            .with_line(line),
        );
    }

    let mut rows = Vec::with_capacity(records.len());
    let mut blank_lines = Vec::new();
    let mut empty_rows = Vec::new();
    let mut replacements = Vec::new();

    for record in records {
        if record.is_blank_line() {
            blank_lines.push(record.line);
            continue;
        }
        if record.is_empty_row() && !options.keep_empty_rows {
            empty_rows.push(record.line);
            continue;
        }
        let cells = record
            .cells
            .into_iter()
            .map(|cell| finish_cell(cell, record.line, options, &mut replacements))
            .collect();
        rows.push(SourceRow::new(record.line, cells));
    }

    if !blank_lines.is_empty() {
        report.push(ParserMessage::warning(
            "removed empty lines",
            format!(
                "{} empty line(s) removed (lines {})",
                blank_lines.len(),
                summarize_lines(&blank_lines)
            ),
        ));
    }

    if !empty_rows.is_empty() {
        report.push(ParserMessage::warning(
            "removed empty rows",
            format!(
                "{} row(s) of empty cells removed (lines {})",
                empty_rows.len(),
                summarize_lines(&empty_rows)
            ),
        ));
    }

    if !replacements.is_empty() {
        report.push(replacement_warning(replacements, options.max_reported_replacements));
    }

    tracing::debug!(
        rows = rows.len(),
        messages = report.len(),
        "tokenized tab-delimited text"
    );
    (rows, report)
}

/// Decodes and tokenizes raw bytes. Undecodable input yields one CRITICAL message and no rows.
pub fn tokenize_bytes(bytes: &[u8], options: &TokenizerOptions) -> (Vec<SourceRow>, ParserReport) {
    tokenize_bytes_with(bytes, options, |_| false)
}

/// [`tokenize_bytes`] with a row start predicate, see [`tokenize_with`].
pub fn tokenize_bytes_with<F>(
    bytes: &[u8],
    options: &TokenizerOptions,
    is_row_start: F,
) -> (Vec<SourceRow>, ParserReport)
where
    F: Fn(&str) -> bool,
{
    match decode_bytes(bytes) {
        Ok(text) => tokenize_with(&text, options, is_row_start),
        Err(err) => {
            tracing::warn!(error = %err, "input could not be decoded");
            let mut report = ParserReport::new();
            report.push(ParserMessage::critical("unreadable input", err.to_string()));
            (Vec::new(), report)
        }
    }
}

/// Renders rows back to tab-delimited text (one row per line).
pub fn render_rows<'a, I>(rows: I) -> String
where
    I: IntoIterator<Item = &'a Row>,
{
    rows.into_iter()
        .map(|row| row.join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug)]
struct RawCell {
    text: String,
    quoted: bool,
    /// Tabs and line breaks found inside a quoted value.
    embedded: usize,
}

#[derive(Debug)]
struct RawRecord {
    line: usize,
    cells: Vec<RawCell>,
}

impl RawRecord {
    /// A line without tabs holding only whitespace.
    fn is_blank_line(&self) -> bool {
        matches!(self.cells.as_slice(), [cell] if cell.text.trim().is_empty())
    }

    /// Several cells, all empty.
    fn is_empty_row(&self) -> bool {
        self.cells.len() > 1 && self.cells.iter().all(|cell| cell.text.trim().is_empty())
    }
}

#[derive(Debug)]
struct Replacement {
    line: usize,
    embedded: usize,
    excerpt: String,
}

/// A closed quoted value: its cell, the offset after the closing quote and
/// the line breaks it spans.
struct QuotedSpan {
    cell: RawCell,
    end: usize,
    lines: usize,
}

/// Single pass splitter of text into records and cells.
struct Scanner<'a, F> {
    text: &'a str,
    bytes: &'a [u8],
    options: &'a TokenizerOptions,
    is_row_start: F,
    /// Cell count of the first non-empty record.
    width: Option<usize>,
    line: usize,
    /// Lines of opening quotes kept as text.
    unterminated: Vec<usize>,
}

impl<'a, F> Scanner<'a, F>
where
    F: Fn(&str) -> bool,
{
    fn new(text: &'a str, options: &'a TokenizerOptions, is_row_start: F) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            options,
            is_row_start,
            width: None,
            line: 1,
            unterminated: Vec::new(),
        }
    }

    fn scan(mut self) -> (Vec<RawRecord>, Vec<usize>) {
        let length = self.bytes.len();
        let mut records = Vec::new();
        if length == 0 {
            return (records, self.unterminated);
        }

        let mut cells = Vec::new();
        let mut record_line = 1;
        let mut fields = self.fields_on_line(0);
        let mut i = 0;

        loop {
            let (cell, next) = match self.quoted_cell(i, fields) {
                Some(span) => {
                    self.line += span.lines;
                    (span.cell, span.end)
                }
                None => self.plain_cell(i),
            };
            cells.push(cell);
            i = next;

            if i < length && self.bytes[i] == b'\t' {
                i += 1;
                continue;
            }

            let record = RawRecord {
                line: record_line,
                cells: std::mem::take(&mut cells),
            };
            if self.width.is_none() && !record.is_blank_line() && !record.is_empty_row() {
                self.width = Some(record.cells.len());
            }
            records.push(record);

            // newline or end of input
            i += 1;
            if i >= length {
                break;
            }
            self.line += 1;
            record_line = self.line;
            fields = self.fields_on_line(i);
        }

        (records, self.unterminated)
    }

    /// Reads a quoted value opening at `open`, or records the quote as text.
    fn quoted_cell(&mut self, open: usize, fields: usize) -> Option<QuotedSpan> {
        if self.bytes.get(open) != Some(&b'"') {
            return None;
        }
        let span = self.close_quote(open, fields);
        if span.is_none() {
            self.unterminated.push(self.line);
        }
        span
    }

    fn close_quote(&self, open: usize, fields: usize) -> Option<QuotedSpan> {
        let bytes = self.bytes;
        let length = bytes.len();
        let mut content = String::new();
        let mut embedded = 0;
        let mut tabs = 0;
        let mut lines = 0;
        let mut j = open + 1;
        let mut segment_start = j;

        while j < length {
            match bytes[j] {
                b'"' if j + 1 < length && bytes[j + 1] == b'"' => {
                    content.push_str(&self.text[segment_start..j]);
                    content.push('"');
                    j += 2;
                    segment_start = j;
                }
                b'"' if j + 1 == length || matches!(bytes[j + 1], b'\t' | b'\n') => {
                    content.push_str(&self.text[segment_start..j]);
                    if tabs > 0 && !self.options.multiline_quotes && !self.overflows(fields) {
                        return None;
                    }
                    return Some(QuotedSpan {
                        cell: RawCell {
                            text: content,
                            quoted: true,
                            embedded,
                        },
                        end: j + 1,
                        lines,
                    });
                }
                b'\n' => {
                    if !self.options.multiline_quotes
                        || (self.is_row_start)(first_cell(&self.text[j + 1..]))
                    {
                        return None;
                    }
                    embedded += 1;
                    lines += 1;
                    j += 1;
                }
                b'\t' => {
                    embedded += 1;
                    tabs += 1;
                    j += 1;
                }
                _ => j += 1,
            }
        }
        None
    }

    /// True when a line split on every tab would be wider than the first
    /// record, so a quoted value spanning tabs is needed to fit it.
    fn overflows(&self, fields: usize) -> bool {
        self.width.is_none_or(|width| fields > width)
    }

    fn plain_cell(&self, start: usize) -> (RawCell, usize) {
        let end = self.bytes[start..]
            .iter()
            .position(|byte| matches!(*byte, b'\t' | b'\n'))
            .map_or(self.bytes.len(), |offset| start + offset);
        let cell = RawCell {
            text: self.text[start..end].to_string(),
            quoted: false,
            embedded: 0,
        };
        (cell, end)
    }

    fn fields_on_line(&self, start: usize) -> usize {
        self.bytes[start..]
            .iter()
            .take_while(|byte| **byte != b'\n')
            .filter(|byte| **byte == b'\t')
            .count()
            + 1
    }
}

/// First cell of a line, trimmed and without surrounding quotes.
fn first_cell(line: &str) -> &str {
    let end = line.find(['\t', '\n']).unwrap_or(line.len());
    let cell = line[..end].trim();
    let cell = cell.strip_prefix('"').unwrap_or(cell);
    cell.strip_suffix('"').unwrap_or(cell).trim()
}

fn finish_cell(
    cell: RawCell,
    line: usize,
    options: &TokenizerOptions,
    replacements: &mut Vec<Replacement>,
) -> String {
    let mut value = cell.text;
    if cell.embedded > 0 {
        value = WHITESPACE_RUN.replace_all(&value, " ").into_owned();
        replacements.push(Replacement {
            line,
            embedded: cell.embedded,
            excerpt: excerpt(value.trim()),
        });
    }

    let mut trimmed = value.trim();
    if !cell.quoted {
        trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
        trimmed = trimmed.strip_suffix('"').unwrap_or(trimmed).trim();
    }

    if options.reflow_cells {
        WHITESPACE_RUN.replace_all(trimmed, " ").into_owned()
    } else {
        trimmed.to_string()
    }
}

fn replacement_warning(mut replacements: Vec<Replacement>, max: usize) -> ParserMessage {
    let total = replacements.len();
    // stable: ties keep file order
    replacements.sort_by(|a, b| b.embedded.cmp(&a.embedded));
    let listed: Vec<String> = replacements
        .iter()
        .take(max)
        .map(|replacement| {
            format!(
                "line {}: {} tab/line break(s) in \"{}\"",
                replacement.line, replacement.embedded, replacement.excerpt
            )
        })
        .collect();
    ParserMessage::warning(
        "replaced whitespace in quoted values",
        format!(
            "{total} quoted value(s) contained tabs or line breaks; {}",
            listed.join("; ")
        ),
    )
}

fn excerpt(value: &str) -> String {
    if value.chars().count() <= EXCERPT_LENGTH {
        return value.to_string();
    }
    let mut short: String = value.chars().take(EXCERPT_LENGTH).collect();
    short.push_str("...");
    short
}

fn summarize_lines(lines: &[usize]) -> String {
    const MAX_LISTED: usize = 10;
    let mut listed: Vec<String> = lines
        .iter()
        .take(MAX_LISTED)
        .map(ToString::to_string)
        .collect();
    if lines.len() > MAX_LISTED {
        listed.push("...".to_string());
    }
    listed.join(", ")
}
