//! Custom sorters registered by default.

use std::collections::HashMap;

use isa_model::SortOption;
use serde_json::Value;

use super::keys::integer_payload;
use super::{CustomSorter, ValueKey};
use crate::error::{Result, TableError};

/// Orders cells by the ordinal `custom_args.order` assigns to them.
///
/// Cells missing from the map are invalid and placed by the option's value
/// order.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumSorter;

impl CustomSorter for EnumSorter {
    fn name(&self) -> &'static str {
        "enum-sorter"
    }

    fn description(&self) -> &'static str {
        "Ordinal position in a caller-supplied enumeration"
    }

    fn compile(&self, option: &SortOption) -> Result<ValueKey> {
        let case_sensitive = option.case_sensitive;
        let fold = move |value: &str| {
            if case_sensitive {
                value.to_string()
            } else {
                value.to_lowercase()
            }
        };

        let entries = option
            .custom_args
            .get("order")
            .and_then(Value::as_object)
            .ok_or_else(|| invalid_args("expected an object at 'order'"))?;

        let mut ordinals = HashMap::with_capacity(entries.len());
        for (value, ordinal) in entries {
            let ordinal = ordinal
                .as_i64()
                .or_else(|| ordinal.as_str().and_then(|text| text.trim().parse().ok()))
                .ok_or_else(|| invalid_args(format!("ordinal of '{value}' is not an integer")))?;
            ordinals.insert(fold(value), ordinal);
        }

        Ok(Box::new(move |value: &str| {
            ordinals.get(&fold(value)).copied().map(integer_payload)
        }))
    }
}

fn invalid_args(reason: impl Into<String>) -> TableError {
    TableError::InvalidCustomArgs {
        name: EnumSorter.name().to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enum_sorter_payloads() {
        let option = SortOption::custom("Dose", "enum-sorter")
            .with_custom_args(json!({"order": {"low": 1, "medium": "2", "HIGH": 3}}));
        let key = EnumSorter.compile(&option).unwrap();
        assert!(key("Low") < key("medium"));
        assert!(key("medium") < key("high"));
        assert_eq!(key("extreme"), None);
    }

    #[test]
    fn test_enum_sorter_rejects_bad_ordinals() {
        let option = SortOption::custom("Dose", "enum-sorter")
            .with_custom_args(json!({"order": {"low": "first"}}));
        assert!(matches!(
            EnumSorter.compile(&option),
            Err(TableError::InvalidCustomArgs { .. })
        ));
    }
}
