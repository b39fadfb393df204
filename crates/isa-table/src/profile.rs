//! Header profiles: the expected header vocabulary of a table type.
//!
//! A profile is an ordered list of `(pattern, category)` entries. Default
//! profiles for sample, assay and metabolite assignment tables are embedded at
//! compile time; callers can load their own from TOML.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};

/// Sample table profile (`s_*.txt`).
pub const SAMPLE_PROFILE: &str = include_str!("../data/profiles/sample.toml");

/// Assay table profile (`a_*.txt`).
pub const ASSAY_PROFILE: &str = include_str!("../data/profiles/assay.toml");

/// Metabolite assignment table profile (`m_*.tsv`).
pub const ASSIGNMENT_PROFILE: &str = include_str!("../data/profiles/assignment.toml");

/// One expected header entry as written in a profile file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternEntry {
    /// Regex with exactly one capture group, matched against the cleaned header.
    pub pattern: String,
    pub category: String,
}

/// Ordered header vocabulary of one table type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderProfile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub patterns: Vec<PatternEntry>,
}

/// A compiled profile entry.
#[derive(Debug, Clone)]
pub struct ExpectedPattern {
    pub regex: Regex,
    pub category: String,
}

impl ExpectedPattern {
    /// Compiles `pattern`, which must contain exactly one capture group.
    pub fn new(pattern: &str, category: impl Into<String>) -> Result<Self> {
        let category = category.into();
        let regex = Regex::new(pattern).map_err(|err| TableError::InvalidPattern {
            pattern: pattern.to_string(),
            category: category.clone(),
            reason: err.to_string(),
        })?;
        // group 0 is the whole match
        if regex.captures_len() != 2 {
            return Err(TableError::InvalidPattern {
                pattern: pattern.to_string(),
                category,
                reason: format!(
                    "expected exactly one capture group, found {}",
                    regex.captures_len() - 1
                ),
            });
        }
        Ok(Self { regex, category })
    }

    /// Returns the captured qualifier when `header` matches.
    pub fn capture<'h>(&self, header: &'h str) -> Option<&'h str> {
        self.regex
            .captures(header)
            .and_then(|captures| captures.get(1))
            .map(|group| group.as_str())
    }
}

impl HeaderProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            patterns: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>, category: impl Into<String>) -> Self {
        self.patterns.push(PatternEntry {
            pattern: pattern.into(),
            category: category.into(),
        });
        self
    }

    /// Parses a profile from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Self::parse_named(text, "<inline>")
    }

    /// Loads a profile from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| TableError::ProfileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let profile = Self::parse_named(&text, &path.display().to_string())?;
        tracing::debug!(
            path = %path.display(),
            profile = %profile.name,
            patterns = profile.patterns.len(),
            "loaded header profile"
        );
        Ok(profile)
    }

    /// Embedded sample table profile.
    pub fn sample() -> Result<Self> {
        Self::parse_named(SAMPLE_PROFILE, "sample.toml")
    }

    /// Embedded assay table profile.
    pub fn assay() -> Result<Self> {
        Self::parse_named(ASSAY_PROFILE, "assay.toml")
    }

    /// Embedded metabolite assignment table profile.
    pub fn assignment() -> Result<Self> {
        Self::parse_named(ASSIGNMENT_PROFILE, "assignment.toml")
    }

    /// Compiles every entry, failing on the first invalid pattern.
    pub fn compile(&self) -> Result<Vec<ExpectedPattern>> {
        self.patterns
            .iter()
            .map(|entry| ExpectedPattern::new(&entry.pattern, entry.category.clone()))
            .collect()
    }

    fn parse_named(text: &str, name: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| TableError::ProfileParse {
            name: name.to_string(),
            source,
        })
    }
}
