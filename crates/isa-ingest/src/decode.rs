//! Byte decoding and line-ending normalization.

use encoding_rs::{Encoding, UTF_8};

use crate::error::{IngestError, Result};

/// Decodes raw file bytes into text.
///
/// A UTF-8 or UTF-16 byte-order mark selects the encoding and is dropped;
/// without one the input must be strict UTF-8. Malformed sequences are an
/// error, never replaced.
pub fn decode_bytes(bytes: &[u8]) -> Result<String> {
    let (encoding, bom_length) = Encoding::for_bom(bytes).unwrap_or((UTF_8, 0));
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_length..])
        .map(std::borrow::Cow::into_owned)
        .ok_or(IngestError::Undecodable {
            encoding: encoding.name(),
        })
}

/// Converts `\r\n` and lone `\r` line breaks to `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}
