//! Filter and sort options consumed by the table view builder.
//!
//! Options are plain configuration values. They are validated eagerly when
//! compiled against a table (unknown columns, unregistered operations), never
//! while rows are being scanned.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Target type for value coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    /// Infer from the runtime type of the filter parameter.
    #[default]
    Auto,
    Integer,
    Float,
    Datetime,
    String,
}

impl FromStr for DataType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AUTO" => Ok(DataType::Auto),
            "INTEGER" | "INT" => Ok(DataType::Integer),
            "FLOAT" | "DOUBLE" => Ok(DataType::Float),
            "DATETIME" | "DATE" => Ok(DataType::Datetime),
            "STRING" | "STR" => Ok(DataType::String),
            _ => Err(ModelError::UnknownDataType {
                value: s.to_string(),
            }),
        }
    }
}

/// Built-in filter operations plus the open `Custom` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperation {
    Contains,
    #[serde(rename = "startswith")]
    StartsWith,
    #[serde(rename = "endswith")]
    EndsWith,
    Equal,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Regex,
    Empty,
    /// Dispatched by [`FilterOption::custom_name`] to a caller-registered evaluator.
    Custom,
}

impl FilterOperation {
    pub const ALL: [FilterOperation; 11] = [
        FilterOperation::Contains,
        FilterOperation::StartsWith,
        FilterOperation::EndsWith,
        FilterOperation::Equal,
        FilterOperation::Greater,
        FilterOperation::GreaterEqual,
        FilterOperation::Less,
        FilterOperation::LessEqual,
        FilterOperation::Regex,
        FilterOperation::Empty,
        FilterOperation::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperation::Contains => "contains",
            FilterOperation::StartsWith => "startswith",
            FilterOperation::EndsWith => "endswith",
            FilterOperation::Equal => "equal",
            FilterOperation::Greater => "greater",
            FilterOperation::GreaterEqual => "greater_equal",
            FilterOperation::Less => "less",
            FilterOperation::LessEqual => "less_equal",
            FilterOperation::Regex => "regex",
            FilterOperation::Empty => "empty",
            FilterOperation::Custom => "custom",
        }
    }

    /// True for operations that compare coerced values.
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            FilterOperation::Equal
                | FilterOperation::Greater
                | FilterOperation::GreaterEqual
                | FilterOperation::Less
                | FilterOperation::LessEqual
        )
    }
}

impl fmt::Display for FilterOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperation {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        FilterOperation::ALL
            .into_iter()
            .find(|operation| operation.as_str() == normalized)
            .ok_or_else(|| ModelError::UnknownFilterOperation {
                value: s.to_string(),
            })
    }
}

/// Runtime-typed filter parameter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FilterValue {
    /// Type implied by the variant when the option's data type is `AUTO`.
    pub fn inferred_type(&self) -> DataType {
        match self {
            FilterValue::Integer(_) => DataType::Integer,
            FilterValue::Float(_) => DataType::Float,
            FilterValue::Null | FilterValue::Bool(_) | FilterValue::Text(_) => DataType::String,
        }
    }

    /// Textual form used for string operations.
    pub fn as_text(&self) -> String {
        match self {
            FilterValue::Null => String::new(),
            FilterValue::Bool(value) => value.to_string(),
            FilterValue::Integer(value) => value.to_string(),
            FilterValue::Float(value) => value.to_string(),
            FilterValue::Text(value) => value.clone(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Float(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

/// One conjunct of a table filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOption {
    /// Columns searched; empty means every column.
    pub search_columns: Vec<String>,
    /// Columns excluded from the search.
    pub search_ignore_columns: Vec<String>,
    pub operation: FilterOperation,
    pub parameter: FilterValue,
    #[serde(rename = "data_type")]
    pub parameter_type: DataType,
    pub case_sensitive: bool,
    pub negate_result: bool,
    /// strftime-style pattern for datetime coercion.
    pub datetime_pattern: Option<String>,
    pub custom_name: Option<String>,
    pub custom_args: serde_json::Value,
}

impl Default for FilterOption {
    fn default() -> Self {
        Self {
            search_columns: Vec::new(),
            search_ignore_columns: Vec::new(),
            operation: FilterOperation::Contains,
            parameter: FilterValue::Null,
            parameter_type: DataType::Auto,
            case_sensitive: true,
            negate_result: false,
            datetime_pattern: None,
            custom_name: None,
            custom_args: serde_json::Value::Null,
        }
    }
}

impl FilterOption {
    pub fn new(operation: FilterOperation, parameter: impl Into<FilterValue>) -> Self {
        Self {
            operation,
            parameter: parameter.into(),
            ..Self::default()
        }
    }

    /// Builds a `custom` filter dispatched to the evaluator registered as `name`.
    pub fn custom(name: impl Into<String>, parameter: impl Into<FilterValue>) -> Self {
        Self {
            operation: FilterOperation::Custom,
            parameter: parameter.into(),
            custom_name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_ignored_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_ignore_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.parameter_type = data_type;
        self
    }

    #[must_use]
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    #[must_use]
    pub fn negated(mut self) -> Self {
        self.negate_result = !self.negate_result;
        self
    }

    #[must_use]
    pub fn with_datetime_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.datetime_pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn with_custom_args(mut self, args: serde_json::Value) -> Self {
        self.custom_args = args;
        self
    }

    /// Data type after resolving `AUTO` against the parameter.
    pub fn effective_type(&self) -> DataType {
        match self.parameter_type {
            DataType::Auto => self.parameter.inferred_type(),
            other => other,
        }
    }
}

/// Built-in sort key families plus the open `Custom` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortType {
    #[default]
    String,
    Integer,
    Float,
    Datetime,
    Custom,
}

impl SortType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortType::String => "string",
            SortType::Integer => "integer",
            SortType::Float => "float",
            SortType::Datetime => "datetime",
            SortType::Custom => "custom",
        }
    }
}

impl fmt::Display for SortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" | "str" => Ok(SortType::String),
            "integer" | "int" => Ok(SortType::Integer),
            "float" => Ok(SortType::Float),
            "datetime" | "date" => Ok(SortType::Datetime),
            "custom" => Ok(SortType::Custom),
            _ => Err(ModelError::UnknownSortType {
                value: s.to_string(),
            }),
        }
    }
}

/// Class of a cell value with respect to a sort type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueClass {
    Empty,
    /// Non-empty value that failed to coerce.
    Invalid,
    /// Value that coerced successfully.
    Valid,
}

/// Relative placement of empty, invalid and valid values within a sort.
///
/// Each variant lists the classes in the order they appear in an ascending sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueOrder {
    EmptyInvalidValid,
    EmptyValidInvalid,
    InvalidEmptyValid,
    InvalidValidEmpty,
    ValidEmptyInvalid,
    #[default]
    ValidInvalidEmpty,
}

impl ValueOrder {
    pub const ALL: [ValueOrder; 6] = [
        ValueOrder::EmptyInvalidValid,
        ValueOrder::EmptyValidInvalid,
        ValueOrder::InvalidEmptyValid,
        ValueOrder::InvalidValidEmpty,
        ValueOrder::ValidEmptyInvalid,
        ValueOrder::ValidInvalidEmpty,
    ];

    /// Three octal digits holding the 1-based rank of empty, invalid and valid values.
    pub fn code(&self) -> u16 {
        match self {
            ValueOrder::EmptyInvalidValid => 0o123,
            ValueOrder::EmptyValidInvalid => 0o132,
            ValueOrder::InvalidEmptyValid => 0o213,
            ValueOrder::InvalidValidEmpty => 0o312,
            ValueOrder::ValidEmptyInvalid => 0o231,
            ValueOrder::ValidInvalidEmpty => 0o321,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        ValueOrder::ALL
            .into_iter()
            .find(|order| order.code() == code)
    }

    /// 1-based position of `class` in an ascending sort.
    pub fn rank_of(&self, class: ValueClass) -> u8 {
        let code = self.code();
        let digit = match class {
            ValueClass::Empty => code >> 6,
            ValueClass::Invalid => code >> 3,
            ValueClass::Valid => code,
        };
        (digit & 0o7) as u8
    }
}

impl FromStr for ValueOrder {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        match normalized.as_str() {
            "EMPTY_INVALID_VALID" => Ok(ValueOrder::EmptyInvalidValid),
            "EMPTY_VALID_INVALID" => Ok(ValueOrder::EmptyValidInvalid),
            "INVALID_EMPTY_VALID" => Ok(ValueOrder::InvalidEmptyValid),
            "INVALID_VALID_EMPTY" => Ok(ValueOrder::InvalidValidEmpty),
            "VALID_EMPTY_INVALID" => Ok(ValueOrder::ValidEmptyInvalid),
            "VALID_INVALID_EMPTY" => Ok(ValueOrder::ValidInvalidEmpty),
            _ => Err(ModelError::UnknownValueOrder {
                value: s.to_string(),
            }),
        }
    }
}

/// One key of a multi-key table sort. The first declared option is the primary key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortOption {
    pub column_name: String,
    pub reverse: bool,
    pub sort_type: SortType,
    pub case_sensitive: bool,
    pub datetime_pattern: Option<String>,
    pub value_order: ValueOrder,
    pub custom_name: Option<String>,
    pub custom_args: serde_json::Value,
    /// Minimum width of generated string keys.
    pub min_key_length: usize,
}

impl Default for SortOption {
    fn default() -> Self {
        Self {
            column_name: String::new(),
            reverse: false,
            sort_type: SortType::String,
            case_sensitive: false,
            datetime_pattern: None,
            value_order: ValueOrder::default(),
            custom_name: None,
            custom_args: serde_json::Value::Null,
            min_key_length: 0,
        }
    }
}

impl SortOption {
    pub fn new(column_name: impl Into<String>, sort_type: SortType) -> Self {
        Self {
            column_name: column_name.into(),
            sort_type,
            ..Self::default()
        }
    }

    /// Builds a `custom` sort dispatched to the sorter registered as `name`.
    pub fn custom(column_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            sort_type: SortType::Custom,
            custom_name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.reverse = !self.reverse;
        self
    }

    #[must_use]
    pub fn with_value_order(mut self, value_order: ValueOrder) -> Self {
        self.value_order = value_order;
        self
    }

    #[must_use]
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    #[must_use]
    pub fn with_datetime_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.datetime_pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn with_custom_args(mut self, args: serde_json::Value) -> Self {
        self.custom_args = args;
        self
    }

    #[must_use]
    pub fn with_min_key_length(mut self, min_key_length: usize) -> Self {
        self.min_key_length = min_key_length;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_order_codes_are_permutations() {
        for order in ValueOrder::ALL {
            let mut ranks = [
                order.rank_of(ValueClass::Empty),
                order.rank_of(ValueClass::Invalid),
                order.rank_of(ValueClass::Valid),
            ];
            ranks.sort_unstable();
            assert_eq!(ranks, [1, 2, 3], "{order:?}");
            assert_eq!(ValueOrder::from_code(order.code()), Some(order));
        }
    }

    #[test]
    fn value_order_rank_lookup() {
        let order = ValueOrder::InvalidValidEmpty;
        assert_eq!(order.rank_of(ValueClass::Invalid), 1);
        assert_eq!(order.rank_of(ValueClass::Valid), 2);
        assert_eq!(order.rank_of(ValueClass::Empty), 3);
    }

    #[test]
    fn filter_operation_from_str() {
        assert_eq!(
            "greater_equal".parse::<FilterOperation>().unwrap(),
            FilterOperation::GreaterEqual
        );
        assert_eq!(
            "StartsWith".parse::<FilterOperation>().unwrap(),
            FilterOperation::StartsWith
        );
        assert!("between".parse::<FilterOperation>().is_err());
    }

    #[test]
    fn auto_type_follows_parameter() {
        let option = FilterOption::new(FilterOperation::Greater, 50_i64);
        assert_eq!(option.effective_type(), DataType::Integer);
        let option = FilterOption::new(FilterOperation::Greater, 2.5);
        assert_eq!(option.effective_type(), DataType::Float);
        let option = FilterOption::new(FilterOperation::Greater, "b");
        assert_eq!(option.effective_type(), DataType::String);
        let option = option.with_data_type(DataType::Datetime);
        assert_eq!(option.effective_type(), DataType::Datetime);
    }

    #[test]
    fn filter_option_deserializes_with_defaults() {
        let option: FilterOption = serde_json::from_str(
            r#"{"operation": "greater_equal", "parameter": 50, "data_type": "INTEGER"}"#,
        )
        .unwrap();
        assert_eq!(option.operation, FilterOperation::GreaterEqual);
        assert_eq!(option.parameter, FilterValue::Integer(50));
        assert_eq!(option.parameter_type, DataType::Integer);
        assert!(option.case_sensitive);
        assert!(option.search_columns.is_empty());
    }
}
