//! Schema catalog: table definitions keyed by name.
//!
//! The catalog lives in memory for the lifetime of the process. It is loaded
//! once at startup from a single snapshot file and written back as a whole at
//! shutdown.

pub mod column_info;
pub mod index_info;
pub mod table_info;

pub use column_info::{ColumnInfo, ColumnType};
pub use index_info::IndexInfo;
pub use table_info::TableInfo;

use crate::error::{DbError, DbResult};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Catalog {
    tables: HashMap<String, TableInfo>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the catalog snapshot at `path`, or an empty catalog if there is none.
    pub fn load(path: &Path) -> DbResult<Self> {
        if !path.exists() {
            info!("No catalog snapshot at {:?}, starting fresh", path);
            return Ok(Self::new());
        }

        let reader = BufReader::new(File::open(path)?);
        let catalog: Catalog = bincode::deserialize_from(reader)?;
        info!(
            "Loaded catalog with {} table(s) from {:?}",
            catalog.tables.len(),
            path
        );
        Ok(catalog)
    }

    /// Write the whole catalog to `path`.
    pub fn save(&self, path: &Path) -> DbResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        info!("Saved catalog with {} table(s) to {:?}", self.tables.len(), path);
        Ok(())
    }

    /// Register a new table. Column order is preserved as given.
    pub fn create_table(&mut self, name: &str, columns: Vec<ColumnInfo>) -> DbResult<TableInfo> {
        if self.tables.contains_key(name) {
            return Err(DbError::DuplicateTable(name.to_string()));
        }

        if !is_valid_name(name) {
            return Err(DbError::invalid_column(
                name,
                "",
                "table names may only use a-z, 0-9 and '_'",
            ));
        }

        if columns.is_empty() {
            return Err(DbError::invalid_column(name, "", "table has no columns"));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !is_valid_name(&column.column_name) {
                return Err(DbError::invalid_column(
                    name,
                    &column.column_name,
                    "column names may only use a-z, 0-9 and '_'",
                ));
            }
            if column.length == 0 {
                return Err(DbError::invalid_column(
                    name,
                    &column.column_name,
                    "length must be positive",
                ));
            }
            if !seen.insert(column.column_name.as_str()) {
                return Err(DbError::invalid_column(
                    name,
                    &column.column_name,
                    "duplicate column name",
                ));
            }
        }

        let table_info = TableInfo {
            table_name: name.to_string(),
            columns,
        };
        self.tables.insert(name.to_string(), table_info.clone());

        Ok(table_info)
    }

    pub fn get_table(&self, name: &str) -> DbResult<&TableInfo> {
        self.tables
            .get(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Table names, sorted for stable output.
    pub fn list_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Names end up in file names, so they are limited to `[a-z0-9_]+`.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}
