//! Cell value coercion for typed filters and sorts.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use isa_model::{DataType, FilterValue};

/// Datetime layouts tried when no explicit pattern is given.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Date-only layouts tried when no explicit pattern is given.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// A cell value after successful coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    Integer(i64),
    Float(f64),
    Datetime(NaiveDateTime),
    Text(String),
}

impl Coerced {
    /// Compares two values of the same kind. Mixed kinds are unordered.
    pub fn partial_cmp_same(&self, other: &Coerced) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Coerced::Integer(a), Coerced::Integer(b)) => Some(a.cmp(b)),
            (Coerced::Float(a), Coerced::Float(b)) => a.partial_cmp(b),
            (Coerced::Datetime(a), Coerced::Datetime(b)) => Some(a.cmp(b)),
            (Coerced::Text(a), Coerced::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

pub fn parse_integer(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

/// Finite floating point value.
pub fn parse_float(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Parses with `pattern` (strftime) when given, else the ISO forms and `DD/MM/YYYY`.
///
/// Date-only input resolves to midnight.
pub fn parse_datetime(value: &str, pattern: Option<&str>) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match pattern {
        Some(pattern) => NaiveDateTime::parse_from_str(value, pattern)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(value, pattern)
                    .ok()
                    .map(|date| date.and_time(NaiveTime::MIN))
            }),
        None => DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .or_else(|| {
                DATE_FORMATS
                    .iter()
                    .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                    .map(|date| date.and_time(NaiveTime::MIN))
            }),
    }
}

/// Coerces a cell to `data_type`. `Auto` is treated as text.
pub fn coerce(value: &str, data_type: DataType, pattern: Option<&str>) -> Option<Coerced> {
    match data_type {
        DataType::Integer => parse_integer(value).map(Coerced::Integer),
        DataType::Float => parse_float(value).map(Coerced::Float),
        DataType::Datetime => parse_datetime(value, pattern).map(Coerced::Datetime),
        DataType::String | DataType::Auto => Some(Coerced::Text(value.to_string())),
    }
}

/// Coerces a filter parameter, accepting numeric variants for numeric types.
pub fn coerce_parameter(
    parameter: &FilterValue,
    data_type: DataType,
    pattern: Option<&str>,
) -> Option<Coerced> {
    match (parameter, data_type) {
        (FilterValue::Integer(value), DataType::Integer) => Some(Coerced::Integer(*value)),
        (FilterValue::Integer(value), DataType::Float) => Some(Coerced::Float(*value as f64)),
        (FilterValue::Float(value), DataType::Float) => Some(Coerced::Float(*value)),
        (FilterValue::Float(value), DataType::Integer) if value.fract() == 0.0 => {
            Some(Coerced::Integer(*value as i64))
        }
        (other, data_type) => coerce(&other.as_text(), data_type, pattern),
    }
}
