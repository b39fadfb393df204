//! ISA table reader: tokenize, classify and build a view in one call.

use std::path::Path;

use isa_ingest::{
    MAX_FILE_SIZE, SourceRow, TokenizerOptions, critical_for, into_rows, read_file, tokenize,
};
use isa_model::{ColumnDescriptor, ParserMessage, ParserReport, TableView};
use serde::{Deserialize, Serialize};

use crate::classify::classify_columns;
use crate::error::Result;
use crate::profile::HeaderProfile;
use crate::view::{TableQuery, TableRegistries, build_table_view};

/// Kind of ISA table, recognised from its file name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsaTableType {
    /// `s_*.txt`
    Sample,
    /// `a_*.txt`
    Assay,
    /// `m_*.tsv`
    Assignment,
}

impl IsaTableType {
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let name = Path::new(file_name)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(file_name);
        if name.starts_with("s_") {
            Some(Self::Sample)
        } else if name.starts_with("a_") {
            Some(Self::Assay)
        } else if name.starts_with("m_") {
            Some(Self::Assignment)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sample => "sample",
            Self::Assay => "assay",
            Self::Assignment => "assignment",
        }
    }

    /// Embedded header profile for this table type.
    pub fn default_profile(&self) -> Result<HeaderProfile> {
        match self {
            Self::Sample => HeaderProfile::sample(),
            Self::Assay => HeaderProfile::assay(),
            Self::Assignment => HeaderProfile::assignment(),
        }
    }
}

/// Outcome of reading one ISA table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IsaTableResult {
    /// `None` when the file could not be tokenized.
    pub view: Option<TableView>,
    /// Classification of every header column.
    pub columns: Vec<ColumnDescriptor>,
    pub report: ParserReport,
}

/// Reads only the header row of a table file.
pub fn read_table_headers(path: &Path) -> Result<Vec<String>> {
    let text = read_file(path, MAX_FILE_SIZE)?;
    let (rows, _) = tokenize(&text, &TokenizerOptions::table());
    Ok(rows.into_iter().next().map(|row| row.cells).unwrap_or_default())
}

/// Reads, classifies and queries a table file.
///
/// Caller mistakes (invalid profile, unknown columns, unregistered
/// operations) are errors. File problems are reported in the result.
pub fn read_isa_table(
    path: &Path,
    profile: &HeaderProfile,
    query: &TableQuery,
    registries: &TableRegistries,
) -> Result<IsaTableResult> {
    let section = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let text = match read_file(path, MAX_FILE_SIZE) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read ISA table");
            let mut report = ParserReport::new();
            report.push(critical_for(path, &err));
            return Ok(IsaTableResult {
                report,
                ..IsaTableResult::default()
            });
        }
    };

    let result = read_isa_table_str(&text, profile, query, registries)?;
    tracing::info!(
        path = %path.display(),
        columns = result.columns.len(),
        rows = result.view.as_ref().map_or(0, |view| view.total_row_count),
        messages = result.report.len(),
        "read ISA table"
    );
    Ok(with_section(result, &section))
}

/// Same as [`read_isa_table`] over text already in memory.
pub fn read_isa_table_str(
    text: &str,
    profile: &HeaderProfile,
    query: &TableQuery,
    registries: &TableRegistries,
) -> Result<IsaTableResult> {
    let patterns = profile.compile()?;
    let (rows, mut report) = tokenize(text, &TokenizerOptions::table());
    if report.has_critical() {
        return Ok(IsaTableResult {
            report,
            ..IsaTableResult::default()
        });
    }

    let mut rows = rows.into_iter();
    let Some(SourceRow { cells: headers, .. }) = rows.next() else {
        report.push(ParserMessage::critical(
            "missing header row",
            "table has no header row",
        ));
        return Ok(IsaTableResult {
            report,
            ..IsaTableResult::default()
        });
    };

    let (columns, classification) = classify_columns(&headers, &patterns);
    report.extend(classification);

    let data = into_rows(rows.collect());
    let (view, build_report) = build_table_view(&columns, &data, query, registries)?;
    report.extend(build_report);

    Ok(IsaTableResult {
        view: Some(view),
        columns,
        report,
    })
}

fn with_section(mut result: IsaTableResult, section: &str) -> IsaTableResult {
    result.report = result
        .report
        .into_messages()
        .into_iter()
        .map(|message| match message.section {
            Some(_) => message,
            None => message.with_section(section),
        })
        .collect();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_type_from_file_name() {
        assert_eq!(
            IsaTableType::from_file_name("s_MTBLS1.txt"),
            Some(IsaTableType::Sample)
        );
        assert_eq!(
            IsaTableType::from_file_name("/data/a_assay_ms.txt"),
            Some(IsaTableType::Assay)
        );
        assert_eq!(
            IsaTableType::from_file_name("m_MTBLS1_maf.tsv"),
            Some(IsaTableType::Assignment)
        );
        assert_eq!(IsaTableType::from_file_name("i_Investigation.txt"), None);
    }

    #[test]
    fn test_empty_text_has_no_view() {
        let profile = HeaderProfile::sample().unwrap();
        let result = read_isa_table_str(
            "",
            &profile,
            &TableQuery::new(),
            &TableRegistries::default(),
        )
        .unwrap();
        assert!(result.view.is_none());
        assert!(result.report.has_critical());
    }
}
