use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares an equality index on one column of one table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexInfo {
    pub table_name: String,
    pub column_name: String,
}

impl IndexInfo {
    pub fn new(table_name: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            column_name: column_name.into(),
        }
    }

    /// Name of the snapshot file holding this index. Table and column names
    /// never contain '.', so distinct indexes never share a file.
    pub fn file_name(&self) -> String {
        format!("{}.{}.index", self.table_name, self.column_name)
    }
}

impl fmt::Display for IndexInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table_name, self.column_name)
    }
}

impl FromStr for IndexInfo {
    type Err = String;

    /// Parses `table.column`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((table, column)) if !table.is_empty() && !column.is_empty() => {
                Ok(IndexInfo::new(table, column))
            }
            _ => Err(format!("expected TABLE.COLUMN, got '{}'", s)),
        }
    }
}
