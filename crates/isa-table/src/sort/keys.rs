//! Synthetic sort key payloads.
//!
//! Each payload is a string whose lexicographic order matches the natural
//! order of the value it encodes. Numbers are mapped to unsigned integers and
//! zero-padded to a fixed width.

use chrono::NaiveDateTime;

/// Prefix of string payloads, above every ASCII letter and digit.
pub const STRING_SENTINEL: char = '~';

/// Width of a zero-padded `u64`.
const NUMERIC_WIDTH: usize = 20;

const SIGN_BIT: u64 = 1 << 63;

pub fn integer_payload(value: i64) -> String {
    // flipping the sign bit maps i64 order onto u64 order
    let shifted = (value as u64) ^ SIGN_BIT;
    format!("{shifted:0width$}", width = NUMERIC_WIDTH)
}

/// Payload for a finite float; negative zero sorts as zero.
pub fn float_payload(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    let bits = value.to_bits();
    let ordered = if value.is_sign_negative() {
        !bits
    } else {
        bits | SIGN_BIT
    };
    format!("{ordered:0width$}", width = NUMERIC_WIDTH)
}

pub fn datetime_payload(value: NaiveDateTime) -> String {
    integer_payload(value.and_utc().timestamp_micros())
}

/// `~` followed by the (optionally lower-cased) value, right-padded with
/// spaces to `min_length` characters.
pub fn string_payload(value: &str, case_sensitive: bool, min_length: usize) -> String {
    let mut payload = String::with_capacity(value.len().max(min_length) + 1);
    payload.push(STRING_SENTINEL);
    if case_sensitive {
        payload.push_str(value);
    } else {
        payload.push_str(&value.to_lowercase());
    }
    let length = payload.chars().count();
    if length < min_length {
        payload.extend(std::iter::repeat_n(' ', min_length - length));
    }
    payload
}
