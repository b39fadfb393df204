//! File-level entry points: size ceiling, reading, tokenizing.

use std::path::Path;

use isa_model::{ParserMessage, ParserReport};

use crate::decode::decode_bytes;
use crate::error::{IngestError, Result};
use crate::tokenizer::{SourceRow, TokenizerOptions, tokenize_with};

/// Largest file accepted by [`read_file`] by default (500 MB).
pub const MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Fails with [`IngestError::FileTooLarge`] when `path` exceeds `max_size` bytes.
pub fn check_file_size(path: &Path, max_size: u64) -> Result<u64> {
    let size = std::fs::metadata(path)
        .map_err(|source| IngestError::read(path, source))?
        .len();
    if size > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            max_size,
        });
    }
    Ok(size)
}

/// Reads and decodes a text file after checking its size.
pub fn read_file(path: &Path, max_size: u64) -> Result<String> {
    let size = check_file_size(path, max_size)?;
    let bytes = std::fs::read(path).map_err(|source| IngestError::read(path, source))?;
    tracing::debug!(path = %path.display(), size, "read input file");
    decode_bytes(&bytes)
}

/// Reads and tokenizes a file.
///
/// I/O and decoding failures do not escape: they become a single CRITICAL
/// message and no rows, so callers always get a report.
pub fn tokenize_file(path: &Path, options: &TokenizerOptions) -> (Vec<SourceRow>, ParserReport) {
    tokenize_file_with(path, options, |_| false)
}

/// [`tokenize_file`] with a row start predicate, see
/// [`tokenize_with`](crate::tokenize_with).
pub fn tokenize_file_with<F>(
    path: &Path,
    options: &TokenizerOptions,
    is_row_start: F,
) -> (Vec<SourceRow>, ParserReport)
where
    F: Fn(&str) -> bool,
{
    match read_file(path, MAX_FILE_SIZE) {
        Ok(text) => tokenize_with(&text, options, is_row_start),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read input file");
            let mut report = ParserReport::new();
            report.push(critical_for(path, &err));
            (Vec::new(), report)
        }
    }
}

/// CRITICAL message describing a failed file read.
pub fn critical_for(path: &Path, err: &IngestError) -> ParserMessage {
    let short = match err {
        IngestError::FileNotFound { .. } => "file not found",
        IngestError::FileTooLarge { .. } => "file too large",
        IngestError::FileRead { .. } | IngestError::Undecodable { .. } => "unreadable file",
    };
    let section = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    ParserMessage::critical(short, err.to_string()).with_section(section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use isa_model::MessageType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_file_respects_size_ceiling() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"Sample Name\tProtocol REF\n").unwrap();
        assert!(read_file(file.path(), MAX_FILE_SIZE).is_ok());

        let err = read_file(file.path(), 4).unwrap_err();
        assert!(matches!(err, IngestError::FileTooLarge { max_size: 4, .. }));
    }

    #[test]
    fn test_tokenize_missing_file_is_critical() {
        let (rows, report) = tokenize_file(
            Path::new("/nonexistent/i_Investigation.txt"),
            &TokenizerOptions::investigation(),
        );
        assert!(rows.is_empty());
        assert_eq!(report.len(), 1);
        let message = &report.messages()[0];
        assert_eq!(message.message_type, MessageType::Critical);
        assert_eq!(message.short, "file not found");
        assert_eq!(message.section.as_deref(), Some("i_Investigation.txt"));
    }
}
