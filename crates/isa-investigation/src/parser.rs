//! Investigation file parser.
//!
//! Logical lines are routed into section blocks by a small state machine
//! (before any section, initial sections, study blocks). Each block maps its
//! row keys to lines. Population then reads every section's field table
//! against its block and fills the document tree.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use isa_ingest::{
    LineKind, LogicalLine, SourceRow, TokenizerOptions, group_logical_lines, line_kind,
    tokenize_bytes_with, tokenize_file_with, tokenize_with,
};
use isa_model::{
    Comment, Investigation, InvestigationContacts, InvestigationPublications, MessageType,
    OntologyAnnotation, OntologySourceReferences, ParserMessage, ParserReport, Study,
    StudyAssays, StudyContacts, StudyDesignDescriptors, StudyFactors, StudyProtocols,
    StudyPublications,
};
use regex::Regex;

use crate::record::{FieldValue, Record, prune_trailing, split_list, zip_ontology};
use crate::vocabulary::{
    FieldKind, FieldSpec, INVESTIGATION, INVESTIGATION_CONTACTS, INVESTIGATION_PUBLICATIONS,
    ONTOLOGY_SOURCE_REFERENCE, STUDY, STUDY_ASSAYS, STUDY_CONTACTS, STUDY_DESIGN_DESCRIPTORS,
    STUDY_FACTORS, STUDY_HEADER, STUDY_PROTOCOLS, STUDY_PUBLICATIONS, SectionScope, SectionSpec,
    TERM_ACCESSION_SUFFIX, TERM_SOURCE_SUFFIX, section_of_key, section_spec,
};

static SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Z0-9 ]+[A-Z0-9]$").expect("Invalid section header regex")
});

static COMMENT_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Comment\s*\[\s*(.*?)\s*\]$").expect("Invalid comment key regex")
});

/// Options for parsing an investigation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvestigationParseOptions {
    pub tokenizer: TokenizerOptions,
}

impl Default for InvestigationParseOptions {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerOptions::investigation(),
        }
    }
}

impl InvestigationParseOptions {
    #[must_use]
    pub fn with_tokenizer(mut self, tokenizer: TokenizerOptions) -> Self {
        self.tokenizer = tokenizer;
        self
    }
}

/// Parses investigation text already in memory.
pub fn parse_investigation_str(
    text: &str,
    options: &InvestigationParseOptions,
) -> (Investigation, ParserReport) {
    let (rows, report) = tokenize_with(text, &options.tokenizer, starts_logical_line);
    parse_rows(rows, report)
}

/// Decodes and parses raw investigation bytes.
pub fn parse_investigation_bytes(
    bytes: &[u8],
    options: &InvestigationParseOptions,
) -> (Investigation, ParserReport) {
    let (rows, report) = tokenize_bytes_with(bytes, &options.tokenizer, starts_logical_line);
    parse_rows(rows, report)
}

/// Reads and parses an investigation file.
///
/// Messages without a section are attributed to the file name.
pub fn parse_investigation_file(
    path: &Path,
    options: &InvestigationParseOptions,
) -> (Investigation, ParserReport) {
    let (rows, report) = tokenize_file_with(path, &options.tokenizer, starts_logical_line);
    let (investigation, report) = parse_rows(rows, report);

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let report: ParserReport = report
        .into_messages()
        .into_iter()
        .map(|message| match message.section {
            Some(_) => message,
            None => message.with_section(file_name.as_str()),
        })
        .collect();

    tracing::info!(
        path = %path.display(),
        studies = investigation.studies.len(),
        messages = report.len(),
        "parsed investigation file"
    );
    (investigation, report)
}

fn parse_rows(rows: Vec<SourceRow>, mut report: ParserReport) -> (Investigation, ParserReport) {
    if report.has_critical() {
        return (Investigation::default(), report);
    }

    let (lines, grouping) = group_logical_lines(rows, classify_key);
    report.extend(grouping);

    let mut router = SectionRouter::default();
    for line in lines {
        router.route(line);
    }
    report.extend(router.report);

    let mut builder = DocumentBuilder {
        report: &mut report,
    };
    let investigation = builder.build(&router.initial, &router.studies);

    for message in report.iter().filter(|m| m.message_type == MessageType::Critical) {
        tracing::warn!(
            section = message.section.as_deref().unwrap_or(""),
            detail = %message.detail,
            "investigation section unusable"
        );
    }
    tracing::debug!(
        studies = investigation.studies.len(),
        messages = report.len(),
        "built investigation document"
    );
    (investigation, report)
}

/// Quoted values never run into a line opened by a key, section or comment.
fn starts_logical_line(first_cell: &str) -> bool {
    line_kind(first_cell, &classify_key) != LineKind::Unknown
}

fn classify_key(key: &str) -> LineKind {
    if SECTION_HEADER.is_match(key) {
        LineKind::Section
    } else if section_of_key(key).is_some() {
        LineKind::Key
    } else {
        LineKind::Unknown
    }
}

// === Routing ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    BeforeSection,
    InInitialSections,
    InStudySection,
}

/// Lines of one section occurrence, keyed by row key.
#[derive(Debug)]
struct SectionBlock {
    spec: &'static SectionSpec,
    line: usize,
    rows: HashMap<String, LogicalLine>,
    comments: Vec<Comment>,
}

impl SectionBlock {
    fn new(spec: &'static SectionSpec, line: usize) -> Self {
        Self {
            spec,
            line,
            rows: HashMap::new(),
            comments: Vec::new(),
        }
    }

    fn values(&self, key: &str) -> &[String] {
        self.rows
            .get(key)
            .map(LogicalLine::values)
            .unwrap_or_default()
    }

    fn cell(&self, key: &str, index: usize) -> String {
        self.values(key).get(index).cloned().unwrap_or_default()
    }
}

fn find_block<'b>(blocks: &'b [SectionBlock], spec: &SectionSpec) -> Option<&'b SectionBlock> {
    blocks.iter().find(|block| block.spec.header == spec.header)
}

struct SectionRouter {
    state: ParserState,
    initial: Vec<SectionBlock>,
    studies: Vec<Vec<SectionBlock>>,
    /// Index of the open block in the active block list.
    current: Option<usize>,
    report: ParserReport,
}

impl Default for SectionRouter {
    fn default() -> Self {
        Self {
            state: ParserState::BeforeSection,
            initial: Vec::new(),
            studies: Vec::new(),
            current: None,
            report: ParserReport::new(),
        }
    }
}

impl SectionRouter {
    fn route(&mut self, line: LogicalLine) {
        match line.kind {
            LineKind::Section => self.open_section(&line),
            LineKind::Key => self.add_row(line),
            LineKind::Comment => self.add_comment(&line),
            LineKind::FileComment => self.report.push(
                ParserMessage::info("file comment", format!("skipped '{}'", line.key()))
                    .with_line(line.line),
            ),
            LineKind::Unknown => self.report.push(
                ParserMessage::error(
                    "invalid line",
                    format!("'{}' is not an investigation row key; row skipped", line.key()),
                )
                .with_line(line.line),
            ),
        }
    }

    fn active_blocks(&mut self) -> Option<&mut Vec<SectionBlock>> {
        match self.state {
            ParserState::BeforeSection => None,
            ParserState::InInitialSections => Some(&mut self.initial),
            ParserState::InStudySection => self.studies.last_mut(),
        }
    }

    fn current_block(&mut self) -> Option<&mut SectionBlock> {
        let index = self.current?;
        self.active_blocks()?.get_mut(index)
    }

    fn open_section(&mut self, line: &LogicalLine) {
        let header = line.key();
        self.current = None;
        let Ok(spec) = section_spec(header) else {
            self.report.push(
                ParserMessage::error(
                    "invalid line",
                    format!("unknown section header '{header}'; its rows are skipped"),
                )
                .with_line(line.line),
            );
            return;
        };

        if spec.header == STUDY_HEADER {
            self.studies.push(Vec::new());
            self.state = ParserState::InStudySection;
        }
        match (self.state, spec.scope) {
            (ParserState::BeforeSection | ParserState::InInitialSections, SectionScope::Initial) => {
                self.state = ParserState::InInitialSections;
            }
            (ParserState::InStudySection, SectionScope::Study) => {}
            (_, scope) => {
                let place = match scope {
                    SectionScope::Study => "before the first STUDY section",
                    SectionScope::Initial => "inside a STUDY block",
                };
                self.report.push(
                    ParserMessage::error(
                        "unexpected line in section",
                        format!("section {header} appears {place}; its rows are skipped"),
                    )
                    .with_section(header)
                    .with_line(line.line),
                );
                return;
            }
        }

        let Some(blocks) = self.active_blocks() else {
            return;
        };
        let (index, duplicate) =
            match blocks.iter().position(|block| block.spec.header == spec.header) {
                Some(index) => (index, true),
                None => {
                    blocks.push(SectionBlock::new(spec, line.line));
                    (blocks.len() - 1, false)
                }
            };
        self.current = Some(index);
        if duplicate {
            self.report.push(
                ParserMessage::warning(
                    "duplicate section",
                    format!("section {header} is repeated; its rows are merged into the first occurrence"),
                )
                .with_section(header)
                .with_line(line.line),
            );
        }
    }

    fn add_row(&mut self, line: LogicalLine) {
        let key = line.key().to_string();
        let owner = section_of_key(&key).map_or("", |spec| spec.header);
        let Some(block) = self.current_block() else {
            self.report.push(
                ParserMessage::error(
                    "unexpected line in section",
                    format!("'{key}' belongs to section {owner} but no such section is open; row skipped"),
                )
                .with_line(line.line),
            );
            return;
        };

        let header = block.spec.header;
        if header != owner {
            self.report.push(
                ParserMessage::error(
                    "unexpected line in section",
                    format!("'{key}' belongs to section {owner}, not {header}; row skipped"),
                )
                .with_section(header)
                .with_line(line.line),
            );
            return;
        }

        if let Some(first) = block.rows.get(&key) {
            let first_line = first.line;
            self.report.push(
                ParserMessage::warning(
                    "duplicate line",
                    format!("'{key}' repeats line {first_line}; the first occurrence is kept"),
                )
                .with_section(header)
                .with_line(line.line),
            );
            return;
        }
        block.rows.insert(key, line);
    }

    fn add_comment(&mut self, line: &LogicalLine) {
        let key = line.key();
        let Some(name) = COMMENT_KEY
            .captures(key)
            .and_then(|captures| captures.get(1))
            .map(|name| name.as_str())
            .filter(|name| !name.is_empty())
        else {
            self.report.push(
                ParserMessage::warning(
                    "invalid comment",
                    format!("'{key}' is not of the form Comment[name]; row dropped"),
                )
                .with_line(line.line),
            );
            return;
        };

        let comment = Comment::new(name, line.values().to_vec());
        match self.current_block() {
            Some(block) => block.comments.push(comment),
            None => self.report.push(
                ParserMessage::error(
                    "unexpected line in section",
                    format!("'{key}' appears outside of any section; row skipped"),
                )
                .with_line(line.line),
            ),
        }
    }
}

// === Population ===

struct DocumentBuilder<'r> {
    report: &'r mut ParserReport,
}

impl DocumentBuilder<'_> {
    fn build(&mut self, initial: &[SectionBlock], studies: &[Vec<SectionBlock>]) -> Investigation {
        let mut investigation = Investigation::default();

        let (references, comments) = self.repeated(initial, &ONTOLOGY_SOURCE_REFERENCE);
        investigation.ontology_source_references = OntologySourceReferences {
            references,
            comments,
        };

        investigation.comments = self.single(initial, &INVESTIGATION, &mut investigation);

        let (publications, comments) = self.repeated(initial, &INVESTIGATION_PUBLICATIONS);
        investigation.publications = InvestigationPublications {
            publications,
            comments,
        };

        let (people, comments) = self.repeated(initial, &INVESTIGATION_CONTACTS);
        investigation.contacts = InvestigationContacts { people, comments };

        investigation.studies = studies.iter().map(|blocks| self.study(blocks)).collect();
        investigation
    }

    fn study(&mut self, blocks: &[SectionBlock]) -> Study {
        let mut study = Study::default();
        study.comments = self.single(blocks, &STUDY, &mut study);

        let (design_types, comments) =
            self.repeated::<OntologyAnnotation>(blocks, &STUDY_DESIGN_DESCRIPTORS);
        study.design_descriptors = StudyDesignDescriptors {
            design_types,
            comments,
        };

        let (publications, comments) = self.repeated(blocks, &STUDY_PUBLICATIONS);
        study.publications = StudyPublications {
            publications,
            comments,
        };

        let (factors, comments) = self.repeated(blocks, &STUDY_FACTORS);
        study.factors = StudyFactors { factors, comments };

        let (assays, comments) = self.repeated(blocks, &STUDY_ASSAYS);
        study.assays = StudyAssays { assays, comments };

        let (protocols, comments) = self.repeated(blocks, &STUDY_PROTOCOLS);
        study.protocols = StudyProtocols {
            protocols,
            comments,
        };

        let (people, comments) = self.repeated(blocks, &STUDY_CONTACTS);
        study.contacts = StudyContacts { people, comments };

        study
    }

    /// Fills `target` from a one-record section and returns its comments.
    fn single<R: Record>(
        &mut self,
        blocks: &[SectionBlock],
        spec: &SectionSpec,
        target: &mut R,
    ) -> Vec<Comment> {
        let Some(block) = self.block(blocks, spec) else {
            return Vec::new();
        };
        self.check_fields(block, None);
        for field in spec.fields {
            target.assign(field.name, read_field(block, field, 0));
        }
        block.comments.clone()
    }

    /// Reads one record per value cell of the section's search row.
    fn repeated<R: Record>(
        &mut self,
        blocks: &[SectionBlock],
        spec: &SectionSpec,
    ) -> (Vec<R>, Vec<Comment>) {
        let Some(block) = self.block(blocks, spec) else {
            return (Vec::new(), Vec::new());
        };
        let Some(search_key) = spec.search_key() else {
            return (Vec::new(), Vec::new());
        };
        if !block.rows.contains_key(&search_key) {
            self.report.push(
                ParserMessage::critical(
                    "missing row",
                    format!(
                        "'{search_key}' is missing from section {}; the section is left empty",
                        spec.header
                    ),
                )
                .with_section(spec.header)
                .with_line(block.line),
            );
            return (Vec::new(), Vec::new());
        }
        self.check_fields(block, Some(&search_key));

        let count = block.values(&search_key).len();
        let mut records: Vec<R> = (0..count)
            .map(|index| {
                let mut record = R::default();
                for field in spec.fields {
                    record.assign(field.name, read_field(block, field, index));
                }
                record
            })
            .collect();
        prune_trailing(&mut records);
        (records, block.comments.clone())
    }

    fn block<'b>(
        &mut self,
        blocks: &'b [SectionBlock],
        spec: &SectionSpec,
    ) -> Option<&'b SectionBlock> {
        let block = find_block(blocks, spec);
        if block.is_none() {
            self.report.push(
                ParserMessage::critical(
                    "missing section",
                    format!("section {} is missing; default values are used", spec.header),
                )
                .with_section(spec.header),
            );
        }
        block
    }

    fn check_fields(&mut self, block: &SectionBlock, skip: Option<&String>) {
        for key in block.spec.row_keys() {
            if Some(&key) == skip || block.rows.contains_key(&key) {
                continue;
            }
            self.report.push(
                ParserMessage::warning(
                    "missing field",
                    format!(
                        "'{key}' is missing from section {}; the default value is used",
                        block.spec.header
                    ),
                )
                .with_section(block.spec.header)
                .with_line(block.line),
            );
        }
    }
}

fn read_field(block: &SectionBlock, field: &FieldSpec, index: usize) -> FieldValue {
    let key = format!("{} {}", block.spec.prefix, field.label);
    let accession = || block.cell(&format!("{key} {TERM_ACCESSION_SUFFIX}"), index);
    let source = || block.cell(&format!("{key} {TERM_SOURCE_SUFFIX}"), index);
    match field.kind {
        FieldKind::Scalar => FieldValue::Text(block.cell(&key, index)),
        FieldKind::RepeatedScalarList => FieldValue::TextList(split_list(&block.cell(&key, index))),
        FieldKind::OntologyRef => FieldValue::Ontology(OntologyAnnotation::new(
            block.cell(&key, index),
            accession(),
            source(),
        )),
        FieldKind::OntologyRefList => FieldValue::OntologyList(zip_ontology(
            split_list(&block.cell(&key, index)),
            split_list(&accession()),
            split_list(&source()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> (Investigation, ParserReport) {
        parse_investigation_str(text, &InvestigationParseOptions::default())
    }

    fn shorts(report: &ParserReport) -> Vec<(&str, MessageType)> {
        report
            .iter()
            .map(|message| (message.short.as_str(), message.message_type))
            .collect()
    }

    #[test]
    fn test_section_header_pattern() {
        assert_eq!(classify_key("STUDY"), LineKind::Section);
        assert_eq!(classify_key("STUDY PROTOCOLS"), LineKind::Section);
        assert_eq!(classify_key("Study Title"), LineKind::Key);
        assert_eq!(classify_key("Study title"), LineKind::Unknown);
        assert_eq!(classify_key("ST"), LineKind::Unknown);
    }

    #[test]
    fn test_study_key_before_study_section_is_error() {
        let (_, report) = parse("INVESTIGATION\nInvestigation Title\tT\nStudy Title\tX\n");
        let unexpected: Vec<_> = report
            .iter()
            .filter(|message| message.short == "unexpected line in section")
            .collect();
        assert_eq!(unexpected.len(), 1);
        assert_eq!(unexpected[0].line, Some(3));
        assert_eq!(unexpected[0].message_type, MessageType::Error);
    }

    #[test]
    fn test_comments_and_file_comments() {
        let (investigation, report) = parse(
            "# exported by a tool\n\
             INVESTIGATION\n\
             Investigation Identifier\tMTBLS1\n\
             Comment[Created With Configuration]\tMetaboLightsConfig\n\
             Comment[\tbroken\n",
        );
        assert_eq!(investigation.identifier, "MTBLS1");
        assert_eq!(
            investigation.comments,
            vec![Comment::new(
                "Created With Configuration",
                vec!["MetaboLightsConfig".to_string()]
            )]
        );
        let found = shorts(&report);
        assert!(found.contains(&("file comment", MessageType::Info)));
        assert!(found.contains(&("invalid comment", MessageType::Warning)));
    }

    #[test]
    fn test_duplicate_key_keeps_first() {
        let (investigation, report) = parse(
            "INVESTIGATION\nInvestigation Title\tFirst\nInvestigation Title\tSecond\n",
        );
        assert_eq!(investigation.title, "First");
        assert_eq!(
            report
                .iter()
                .filter(|message| message.short == "duplicate line")
                .count(),
            1
        );
    }

    #[test]
    fn test_missing_sections_are_critical() {
        let (investigation, report) = parse("INVESTIGATION\nInvestigation Title\tT\n");
        assert_eq!(investigation.title, "T");
        assert!(investigation.studies.is_empty());
        let missing: Vec<_> = report
            .iter()
            .filter(|message| message.short == "missing section")
            .filter_map(|message| message.section.as_deref())
            .collect();
        assert_eq!(
            missing,
            vec![
                "ONTOLOGY SOURCE REFERENCE",
                "INVESTIGATION PUBLICATIONS",
                "INVESTIGATION CONTACTS"
            ]
        );
    }

    #[test]
    fn test_repeated_records_are_pruned_from_the_end() {
        let (investigation, _) = parse(
            "STUDY\n\
             STUDY FACTORS\n\
             Study Factor Name\tDose\t\t\n\
             Study Factor Type\tdose\t\t\n\
             Study Factor Type Term Accession Number\thttp://efo/dose\t\t\n\
             Study Factor Type Term Source REF\tEFO\t\t\n",
        );
        let factors = &investigation.studies[0].factors.factors;
        assert_eq!(factors.len(), 1);
        assert_eq!(factors[0].factor_type.term_source_ref, "EFO");
    }

    #[test]
    fn test_second_study_header_opens_new_study() {
        let (investigation, _) = parse(
            "STUDY\nStudy Identifier\tMTBLS1\nSTUDY\nStudy Identifier\tMTBLS2\n",
        );
        let identifiers: Vec<_> = investigation
            .studies
            .iter()
            .map(|study| study.identifier.as_str())
            .collect();
        assert_eq!(identifiers, vec!["MTBLS1", "MTBLS2"]);
    }

    #[test]
    fn test_missing_search_row_leaves_section_empty() {
        let (investigation, report) = parse(
            "STUDY\nSTUDY ASSAYS\nStudy Assay Technology Platform\tBruker\n",
        );
        assert!(investigation.studies[0].assays.assays.is_empty());
        assert!(report.iter().any(|message| message.short == "missing row"
            && message.message_type == MessageType::Critical));
    }

    #[test]
    fn test_initial_section_inside_study_is_error() {
        let (_, report) = parse("STUDY\nINVESTIGATION\nInvestigation Title\tLate\n");
        let errors: Vec<_> = report
            .iter()
            .filter(|message| message.short == "unexpected line in section")
            .collect();
        // the header and its orphaned row
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_undecodable_bytes_give_default_document() {
        let (investigation, report) = parse_investigation_bytes(
            &[b'S', 0xC3, 0x28],
            &InvestigationParseOptions::default(),
        );
        assert_eq!(investigation, Investigation::default());
        assert!(report.has_critical());
    }
}
