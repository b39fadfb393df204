//! Filter engine.
//!
//! Built-in operations are compiled directly from their [`FilterOperation`].
//! The `custom` operation is dispatched by name to a [`CustomFilter`] held in
//! a [`FilterRegistry`]. Compilation happens once per query, before any row is
//! scanned, so every caller mistake surfaces as an error up front.
//!
//! # Row semantics
//!
//! A compiled filter tests each of its columns with a cell predicate that
//! answers match, no match, or invalid (the cell could not be coerced). The
//! filter matches when any column matches. `negate_result` inverts that
//! verdict, except that a row whose cells were all invalid never passes.

mod builtin;
mod custom;

use std::collections::HashMap;
use std::fmt;

use isa_model::{FilterOperation, FilterOption};

use crate::error::{Result, TableError};
use crate::index::ColumnIndex;

pub use custom::{BetweenEqual, DatetimeValid, EnumContains, NumericValid};

/// Per-cell test. `None` means the cell could not be coerced.
pub type CellPredicate = Box<dyn Fn(&str) -> Option<bool> + Send + Sync>;

/// Evaluator behind the `custom` filter operation.
///
/// Implementors are stateless factories: `compile` binds one
/// [`FilterOption`] and returns the cell predicate used for every row.
pub trait CustomFilter: Send + Sync {
    /// Name matched against [`FilterOption::custom_name`].
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        "Custom filter"
    }

    /// Validates the option and builds its predicate.
    fn compile(&self, option: &FilterOption) -> Result<CellPredicate>;
}

/// Custom filters available to a query, keyed by name.
pub struct FilterRegistry {
    filters: HashMap<&'static str, Box<dyn CustomFilter>>,
}

impl FilterRegistry {
    /// Registry without any custom filters.
    pub fn empty() -> Self {
        Self {
            filters: HashMap::new(),
        }
    }

    /// Registers a filter, replacing one with the same name.
    pub fn register(&mut self, filter: Box<dyn CustomFilter>) {
        self.filters.insert(filter.name(), filter);
    }

    #[must_use]
    pub fn with(mut self, filter: Box<dyn CustomFilter>) -> Self {
        self.register(filter);
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn CustomFilter> {
        self.filters.get(name).map(|filter| filter.as_ref())
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.filters.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for FilterRegistry {
    /// `numeric-valid`, `datetime-valid`, `enum-contains`, `between-equal`.
    fn default() -> Self {
        Self::empty()
            .with(Box::new(NumericValid))
            .with(Box::new(DatetimeValid))
            .with(Box::new(EnumContains))
            .with(Box::new(BetweenEqual))
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.names())
            .finish()
    }
}

/// A filter bound to column positions.
pub struct CompiledFilter {
    columns: Vec<usize>,
    restricted: bool,
    negate: bool,
    predicate: CellPredicate,
}

impl CompiledFilter {
    /// True when the filter names its columns explicitly.
    pub fn is_restricted(&self) -> bool {
        self.restricted
    }

    pub fn matches(&self, row: &[String]) -> bool {
        let mut coerced_any = false;
        for &column in &self.columns {
            let value = row.get(column).map(String::as_str).unwrap_or("");
            match (self.predicate)(value) {
                Some(true) => return !self.negate,
                Some(false) => coerced_any = true,
                None => {}
            }
        }
        coerced_any && self.negate
    }
}

impl fmt::Debug for CompiledFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFilter")
            .field("columns", &self.columns)
            .field("restricted", &self.restricted)
            .field("negate", &self.negate)
            .finish_non_exhaustive()
    }
}

/// Compiles every option, restricted filters first.
pub fn compile_filters(
    options: &[FilterOption],
    columns: &ColumnIndex,
    column_count: usize,
    registry: &FilterRegistry,
) -> Result<Vec<CompiledFilter>> {
    let mut compiled = options
        .iter()
        .map(|option| compile_filter(option, columns, column_count, registry))
        .collect::<Result<Vec<_>>>()?;
    // stable: declaration order kept within each group
    compiled.sort_by_key(|filter| !filter.restricted);
    Ok(compiled)
}

fn compile_filter(
    option: &FilterOption,
    columns: &ColumnIndex,
    column_count: usize,
    registry: &FilterRegistry,
) -> Result<CompiledFilter> {
    let ignored = columns.resolve_all(&option.search_ignore_columns)?;
    let restricted = !option.search_columns.is_empty();
    let targets = if restricted {
        columns.resolve_all(&option.search_columns)?
    } else {
        (0..column_count).collect()
    };
    let targets = targets
        .into_iter()
        .filter(|column| !ignored.contains(column))
        .collect();

    let predicate = match option.operation {
        FilterOperation::Custom => {
            let name = option
                .custom_name
                .as_deref()
                .ok_or(TableError::MissingCustomName { kind: "filter" })?;
            registry
                .get(name)
                .ok_or_else(|| TableError::UnknownCustomFilter {
                    name: name.to_string(),
                })?
                .compile(option)?
        }
        _ => builtin::compile(option)?,
    };

    Ok(CompiledFilter {
        columns: targets,
        restricted,
        negate: option.negate_result,
        predicate,
    })
}

/// Lower-cases `value` unless the comparison is case sensitive.
pub(crate) fn fold_case(value: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        value.to_string()
    } else {
        value.to_lowercase()
    }
}
