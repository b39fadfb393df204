//! Sort engine.
//!
//! Every sort option is compiled into a function producing a synthetic key
//! string per cell. The key starts with one rank digit placing the value's
//! class (empty, invalid, valid) according to the option's [`ValueOrder`],
//! followed by a payload that orders values within the class.
//!
//! Several options compose into one multi-key sort by applying stable passes
//! from the last option to the first, so the first option is the primary key.

mod custom;
pub mod keys;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use isa_model::{Row, SortOption, SortType, ValueClass, ValueOrder};

use crate::coerce::{parse_datetime, parse_float, parse_integer};
use crate::error::{Result, TableError};
use crate::index::ColumnIndex;

pub use custom::EnumSorter;

/// Payload of a valid cell, or `None` when the cell does not coerce.
pub type ValueKey = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Key builder behind the `custom` sort type.
pub trait CustomSorter: Send + Sync {
    /// Name matched against [`SortOption::custom_name`].
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        "Custom sorter"
    }

    /// Validates the option and builds its payload function.
    fn compile(&self, option: &SortOption) -> Result<ValueKey>;
}

/// Custom sorters available to a query, keyed by name.
pub struct SortRegistry {
    sorters: HashMap<&'static str, Box<dyn CustomSorter>>,
}

impl SortRegistry {
    /// Registry without any custom sorters.
    pub fn empty() -> Self {
        Self {
            sorters: HashMap::new(),
        }
    }

    /// Registers a sorter, replacing one with the same name.
    pub fn register(&mut self, sorter: Box<dyn CustomSorter>) {
        self.sorters.insert(sorter.name(), sorter);
    }

    #[must_use]
    pub fn with(mut self, sorter: Box<dyn CustomSorter>) -> Self {
        self.register(sorter);
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn CustomSorter> {
        self.sorters.get(name).map(|sorter| sorter.as_ref())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.sorters.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for SortRegistry {
    /// `enum-sorter`.
    fn default() -> Self {
        Self::empty().with(Box::new(EnumSorter))
    }
}

impl fmt::Debug for SortRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortRegistry")
            .field("sorters", &self.names())
            .finish()
    }
}

/// A sort option bound to a column position.
pub struct CompiledSort {
    column: usize,
    reverse: bool,
    value_order: ValueOrder,
    payload: ValueKey,
}

impl CompiledSort {
    /// Synthetic key of one cell.
    pub fn sort_key(&self, value: &str) -> String {
        let value = value.trim();
        if value.is_empty() {
            return self.rank(ValueClass::Empty).to_string();
        }
        match (self.payload)(value) {
            Some(payload) => format!("{}{payload}", self.rank(ValueClass::Valid)),
            // invalid cells keep their text as a tiebreaker
            None => format!("{}{value}", self.rank(ValueClass::Invalid)),
        }
    }

    fn rank(&self, class: ValueClass) -> char {
        char::from(b'0' + self.value_order.rank_of(class))
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        if self.reverse { b.cmp(a) } else { a.cmp(b) }
    }
}

impl fmt::Debug for CompiledSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSort")
            .field("column", &self.column)
            .field("reverse", &self.reverse)
            .field("value_order", &self.value_order)
            .finish_non_exhaustive()
    }
}

/// Compiles every option in declaration order.
pub fn compile_sorts(
    options: &[SortOption],
    columns: &ColumnIndex,
    registry: &SortRegistry,
) -> Result<Vec<CompiledSort>> {
    let names: Vec<&str> = options
        .iter()
        .map(|option| option.column_name.as_str())
        .collect();
    let positions = columns.resolve_all(&names)?;

    options
        .iter()
        .zip(positions)
        .map(|(option, column)| -> Result<CompiledSort> {
            Ok(CompiledSort {
                column,
                reverse: option.reverse,
                value_order: option.value_order,
                payload: compile_payload(option, registry)?,
            })
        })
        .collect()
}

fn compile_payload(option: &SortOption, registry: &SortRegistry) -> Result<ValueKey> {
    let case_sensitive = option.case_sensitive;
    let min_length = option.min_key_length;
    match option.sort_type {
        SortType::String => Ok(Box::new(move |value: &str| {
            Some(keys::string_payload(value, case_sensitive, min_length))
        })),
        SortType::Integer => Ok(Box::new(|value: &str| {
            parse_integer(value).map(keys::integer_payload)
        })),
        SortType::Float => Ok(Box::new(|value: &str| {
            parse_float(value).map(keys::float_payload)
        })),
        SortType::Datetime => {
            let pattern = option.datetime_pattern.clone();
            Ok(Box::new(move |value: &str| {
                parse_datetime(value, pattern.as_deref()).map(keys::datetime_payload)
            }))
        }
        SortType::Custom => {
            let name = option
                .custom_name
                .as_deref()
                .ok_or(TableError::MissingCustomName { kind: "sort" })?;
            registry
                .get(name)
                .ok_or_else(|| TableError::UnknownCustomSorter {
                    name: name.to_string(),
                })?
                .compile(option)
        }
    }
}

/// Orders `indices` (positions into `rows`) by `sorts`, first sort primary.
pub fn apply_sorts(indices: &mut [usize], rows: &[Row], sorts: &[CompiledSort]) {
    for sort in sorts.iter().rev() {
        let mut keyed: Vec<(String, usize)> = indices
            .iter()
            .map(|&index| {
                let value = rows[index]
                    .get(sort.column)
                    .map(String::as_str)
                    .unwrap_or("");
                (sort.sort_key(value), index)
            })
            .collect();
        keyed.sort_by(|a, b| sort.compare(&a.0, &b.0));
        for (slot, (_, index)) in indices.iter_mut().zip(keyed) {
            *slot = index;
        }
    }
}
