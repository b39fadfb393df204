//! Column name lookup for a classified table.

use std::collections::HashMap;

use isa_model::ColumnDescriptor;

use crate::error::{Result, TableError};

/// Maps unique column names to header positions.
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    pub fn new(columns: &[ColumnDescriptor]) -> Self {
        let positions = columns
            .iter()
            .map(|column| (column.column_name.clone(), column.index))
            .collect();
        Self { positions }
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Resolves every name, reporting all unknown names in one error.
    pub fn resolve_all<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>> {
        let mut positions = Vec::with_capacity(names.len());
        let mut unknown = Vec::new();
        for name in names {
            match self.get(name.as_ref()) {
                Some(position) => positions.push(position),
                None => unknown.push(name.as_ref().to_string()),
            }
        }
        if unknown.is_empty() {
            Ok(positions)
        } else {
            Err(TableError::UnknownColumns { columns: unknown })
        }
    }
}
