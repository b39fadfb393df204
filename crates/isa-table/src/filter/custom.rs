//! Custom filters registered by default.

use std::collections::HashMap;

use isa_model::FilterOption;
use serde_json::Value;

use super::{CellPredicate, CustomFilter, fold_case};
use crate::coerce::{parse_datetime, parse_float};
use crate::error::{Result, TableError};

/// Keeps cells holding a finite number.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericValid;

impl CustomFilter for NumericValid {
    fn name(&self) -> &'static str {
        "numeric-valid"
    }

    fn description(&self) -> &'static str {
        "Cell parses as a number"
    }

    fn compile(&self, _option: &FilterOption) -> Result<CellPredicate> {
        Ok(Box::new(|value: &str| Some(parse_float(value).is_some())))
    }
}

/// Keeps cells holding a date or datetime (`datetime_pattern` honoured).
#[derive(Debug, Clone, Copy, Default)]
pub struct DatetimeValid;

impl CustomFilter for DatetimeValid {
    fn name(&self) -> &'static str {
        "datetime-valid"
    }

    fn description(&self) -> &'static str {
        "Cell parses as a date or datetime"
    }

    fn compile(&self, option: &FilterOption) -> Result<CellPredicate> {
        let pattern = option.datetime_pattern.clone();
        Ok(Box::new(move |value: &str| {
            Some(parse_datetime(value, pattern.as_deref()).is_some())
        }))
    }
}

/// Maps the cell through `custom_args.values` (value to label) and keeps it
/// when the label contains the parameter. Unmapped cells never match.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumContains;

impl CustomFilter for EnumContains {
    fn name(&self) -> &'static str {
        "enum-contains"
    }

    fn description(&self) -> &'static str {
        "Enumeration label contains the parameter"
    }

    fn compile(&self, option: &FilterOption) -> Result<CellPredicate> {
        let case_sensitive = option.case_sensitive;
        let entries = option
            .custom_args
            .get("values")
            .and_then(Value::as_object)
            .ok_or_else(|| invalid_args(self.name(), "expected an object at 'values'"))?;

        let mut labels = HashMap::with_capacity(entries.len());
        for (value, label) in entries {
            let label = label
                .as_str()
                .ok_or_else(|| invalid_args(self.name(), format!("label of '{value}' is not a string")))?;
            labels.insert(
                fold_case(value, case_sensitive),
                fold_case(label, case_sensitive),
            );
        }
        let needle = fold_case(&option.parameter.as_text(), case_sensitive);

        Ok(Box::new(move |value: &str| {
            Some(
                labels
                    .get(&fold_case(value, case_sensitive))
                    .is_some_and(|label| label.contains(&needle)),
            )
        }))
    }
}

/// Inclusive range check on `custom_args.min` / `custom_args.max`.
///
/// Numeric when both bounds are numbers (or numeric strings), otherwise a
/// string comparison honouring `case_sensitive`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BetweenEqual;

impl CustomFilter for BetweenEqual {
    fn name(&self) -> &'static str {
        "between-equal"
    }

    fn description(&self) -> &'static str {
        "Cell lies within [min, max]"
    }

    fn compile(&self, option: &FilterOption) -> Result<CellPredicate> {
        let min = bound(self.name(), &option.custom_args, "min")?;
        let max = bound(self.name(), &option.custom_args, "max")?;

        if let (Some(low), Some(high)) = (parse_float(&min), parse_float(&max)) {
            return Ok(Box::new(move |value: &str| {
                parse_float(value).map(|number| low <= number && number <= high)
            }));
        }

        let case_sensitive = option.case_sensitive;
        let low = fold_case(&min, case_sensitive);
        let high = fold_case(&max, case_sensitive);
        Ok(Box::new(move |value: &str| {
            if value.trim().is_empty() {
                return None;
            }
            let value = fold_case(value, case_sensitive);
            Some(low <= value && value <= high)
        }))
    }
}

fn bound(name: &str, args: &Value, key: &str) -> Result<String> {
    match args.get(key) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(Value::Number(number)) => Ok(number.to_string()),
        _ => Err(invalid_args(
            name,
            format!("expected a string or number at '{key}'"),
        )),
    }
}

fn invalid_args(name: &str, reason: impl Into<String>) -> TableError {
    TableError::InvalidCustomArgs {
        name: name.to_string(),
        reason: reason.into(),
    }
}
