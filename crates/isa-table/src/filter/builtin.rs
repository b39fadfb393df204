//! Built-in filter operations.

use std::cmp::Ordering;

use isa_model::{DataType, FilterOperation, FilterOption};
use regex::RegexBuilder;

use super::{CellPredicate, fold_case};
use crate::coerce::{Coerced, coerce, coerce_parameter};
use crate::error::{Result, TableError};

/// Builds the predicate of a non-custom operation.
pub(super) fn compile(option: &FilterOption) -> Result<CellPredicate> {
    let case_sensitive = option.case_sensitive;
    match option.operation {
        FilterOperation::Contains => {
            let needle = fold_case(&option.parameter.as_text(), case_sensitive);
            Ok(Box::new(move |value: &str| {
                Some(fold_case(value, case_sensitive).contains(&needle))
            }))
        }
        FilterOperation::StartsWith => {
            let prefix = fold_case(&option.parameter.as_text(), case_sensitive);
            Ok(Box::new(move |value: &str| {
                Some(fold_case(value, case_sensitive).starts_with(&prefix))
            }))
        }
        FilterOperation::EndsWith => {
            let suffix = fold_case(&option.parameter.as_text(), case_sensitive);
            Ok(Box::new(move |value: &str| {
                Some(fold_case(value, case_sensitive).ends_with(&suffix))
            }))
        }
        FilterOperation::Regex => {
            let pattern = option.parameter.as_text();
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(|source| TableError::InvalidRegex { pattern, source })?;
            Ok(Box::new(move |value: &str| Some(regex.is_match(value))))
        }
        FilterOperation::Empty => Ok(Box::new(|value: &str| Some(value.trim().is_empty()))),
        FilterOperation::Equal
        | FilterOperation::Greater
        | FilterOperation::GreaterEqual
        | FilterOperation::Less
        | FilterOperation::LessEqual => compile_relational(option),
        FilterOperation::Custom => Err(TableError::MissingCustomName { kind: "filter" }),
    }
}

fn compile_relational(option: &FilterOption) -> Result<CellPredicate> {
    let data_type = option.effective_type();
    let pattern = option.datetime_pattern.clone();
    let case_sensitive = option.case_sensitive;
    let accepts: fn(Ordering) -> bool = match option.operation {
        FilterOperation::Equal => Ordering::is_eq,
        FilterOperation::Greater => Ordering::is_gt,
        FilterOperation::GreaterEqual => Ordering::is_ge,
        FilterOperation::Less => Ordering::is_lt,
        _ => Ordering::is_le,
    };

    let expected = match coerce_parameter(&option.parameter, data_type, pattern.as_deref()) {
        Some(Coerced::Text(text)) => Coerced::Text(fold_case(&text, case_sensitive)),
        Some(coerced) => coerced,
        None => {
            return Err(TableError::InvalidParameter {
                parameter: option.parameter.as_text(),
                data_type: type_label(data_type),
            });
        }
    };

    Ok(Box::new(move |value: &str| {
        let actual = match coerce(value, data_type, pattern.as_deref())? {
            Coerced::Text(text) => Coerced::Text(fold_case(&text, case_sensitive)),
            coerced => coerced,
        };
        actual.partial_cmp_same(&expected).map(accepts)
    }))
}

fn type_label(data_type: DataType) -> &'static str {
    match data_type {
        DataType::Integer => "integer",
        DataType::Float => "float",
        DataType::Datetime => "datetime",
        DataType::String | DataType::Auto => "string",
    }
}
