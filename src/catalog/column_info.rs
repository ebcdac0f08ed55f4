//! Column information and metadata structures.

use serde::{Deserialize, Serialize};

/// Storage kind of a column. Every column is stored as fixed-width text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Text,
}

impl ColumnType {
    /// Resolve a declared type name (`varchar`, `text`, `char`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "varchar" | "text" | "char" => Some(ColumnType::Text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub column_name: String,
    pub column_type: ColumnType,
    /// Width of the column in bytes.
    pub length: usize,
}

impl ColumnInfo {
    pub fn new(column_name: impl Into<String>, length: usize) -> Self {
        Self {
            column_name: column_name.into(),
            column_type: ColumnType::Text,
            length,
        }
    }
}
