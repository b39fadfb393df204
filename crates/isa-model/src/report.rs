//! Severity-classified parser messages.
//!
//! Parsing never raises data problems to the caller. Every anomaly is turned
//! into a [`ParserMessage`] and collected into the [`ParserReport`] returned
//! alongside the (possibly partial) result.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Message severity.
///
/// Ordered from least to most severe so `max()` over a report yields the
/// worst message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// Pure diagnostic, no action needed.
    Info,
    /// A value was normalized or a field defaulted.
    Warning,
    /// Structural anomaly; the unit of work was skipped and processing continued.
    Error,
    /// The file or section could not be used; a default value was returned.
    Critical,
}

impl MessageType {
    /// Returns the upper-case label used in rendered reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Info => "INFO",
            MessageType::Warning => "WARNING",
            MessageType::Error => "ERROR",
            MessageType::Critical => "CRITICAL",
        }
    }

    /// Returns true for everything above INFO.
    pub fn is_actionable(&self) -> bool {
        *self > MessageType::Info
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic with optional location context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Short, stable summary ("invalid line", "removed empty lines").
    pub short: String,
    /// Human-readable detail.
    pub detail: String,
    /// Section name, column name or file name the message refers to.
    pub section: Option<String>,
    /// 1-based line number.
    pub line: Option<usize>,
    /// 1-based column number.
    pub column: Option<usize>,
}

impl ParserMessage {
    pub fn new(
        message_type: MessageType,
        short: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            message_type,
            short: short.into(),
            detail: detail.into(),
            section: None,
            line: None,
            column: None,
        }
    }

    pub fn info(short: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(MessageType::Info, short, detail)
    }

    pub fn warning(short: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(MessageType::Warning, short, detail)
    }

    pub fn error(short: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(MessageType::Error, short, detail)
    }

    pub fn critical(short: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(MessageType::Critical, short, detail)
    }

    #[must_use]
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    #[must_use]
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }
}

impl fmt::Display for ParserMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.message_type)?;
        if let Some(section) = &self.section {
            write!(f, " {section}")?;
        }
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(f, " (line {line}, column {column})")?,
            (Some(line), None) => write!(f, " (line {line})")?,
            (None, Some(column)) => write!(f, " (column {column})")?,
            (None, None) => {}
        }
        write!(f, ": {}", self.short)?;
        if !self.detail.is_empty() {
            write!(f, " - {}", self.detail)?;
        }
        Ok(())
    }
}

/// Ordered collection of messages produced by one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserReport {
    messages: Vec<ParserMessage>,
}

impl ParserReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ParserMessage) {
        self.messages.push(message);
    }

    /// Appends all messages of another report, keeping their order.
    pub fn extend(&mut self, other: ParserReport) {
        self.messages.extend(other.messages);
    }

    pub fn messages(&self) -> &[ParserMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<ParserMessage> {
        self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of messages of exactly the given severity.
    pub fn count(&self, message_type: MessageType) -> usize {
        self.messages
            .iter()
            .filter(|message| message.message_type == message_type)
            .count()
    }

    /// True if any ERROR or CRITICAL message is present.
    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|message| message.message_type >= MessageType::Error)
    }

    pub fn has_critical(&self) -> bool {
        self.messages
            .iter()
            .any(|message| message.message_type == MessageType::Critical)
    }

    pub fn max_severity(&self) -> Option<MessageType> {
        self.messages
            .iter()
            .map(|message| message.message_type)
            .max()
    }

    /// Messages above INFO, in insertion order.
    pub fn actionable(&self) -> impl Iterator<Item = &ParserMessage> {
        self.messages
            .iter()
            .filter(|message| message.message_type.is_actionable())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParserMessage> {
        self.messages.iter()
    }
}

impl Extend<ParserMessage> for ParserReport {
    fn extend<I: IntoIterator<Item = ParserMessage>>(&mut self, iter: I) {
        self.messages.extend(iter);
    }
}

impl FromIterator<ParserMessage> for ParserReport {
    fn from_iter<I: IntoIterator<Item = ParserMessage>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ParserReport {
    type Item = &'a ParserMessage;
    type IntoIter = std::slice::Iter<'a, ParserMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl fmt::Display for ParserReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for message in &self.messages {
            writeln!(f, "{message}")?;
        }
        write!(
            f,
            "Summary: {} critical, {} errors, {} warnings, {} info",
            self.count(MessageType::Critical),
            self.count(MessageType::Error),
            self.count(MessageType::Warning),
            self.count(MessageType::Info)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(MessageType::Info < MessageType::Warning);
        assert!(MessageType::Error < MessageType::Critical);
        assert!(!MessageType::Info.is_actionable());
        assert!(MessageType::Warning.is_actionable());
    }

    #[test]
    fn report_counts() {
        let mut report = ParserReport::new();
        report.push(ParserMessage::info("undefined column", "Column X"));
        report.push(ParserMessage::warning("removed empty lines", ""));
        report.push(ParserMessage::critical("invalid multi column", "Sample Name"));

        assert_eq!(report.len(), 3);
        assert_eq!(report.count(MessageType::Warning), 1);
        assert!(report.has_errors());
        assert!(report.has_critical());
        assert_eq!(report.max_severity(), Some(MessageType::Critical));
        assert_eq!(report.actionable().count(), 2);
    }

    #[test]
    fn empty_report_has_no_errors() {
        let report = ParserReport::new();
        assert!(!report.has_errors());
        assert_eq!(report.max_severity(), None);
    }

    #[test]
    fn message_display_includes_location() {
        let message = ParserMessage::error("invalid line", "Foo Bar")
            .with_section("STUDY")
            .with_line(12);
        assert_eq!(
            message.to_string(),
            "[ERROR] STUDY (line 12): invalid line - Foo Bar"
        );
    }
}
