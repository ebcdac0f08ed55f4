//! Table information and metadata structures.

use crate::catalog::column_info::ColumnInfo;
use serde::{Deserialize, Serialize};

/// A table definition. The order of `columns` is the on-disk field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub table_name: String,
    pub columns: Vec<ColumnInfo>,
}

impl TableInfo {
    /// Size in bytes of one encoded row frame.
    pub fn row_size(&self) -> usize {
        self.columns.iter().map(|c| c.length).sum()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.column_name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.column_name.clone()).collect()
    }
}
