//! Database configuration.

use crate::catalog::IndexInfo;
use crate::executor::TimelineSpec;
use std::path::{Path, PathBuf};

/// Name of the catalog snapshot inside the data directory.
pub const CATALOG_FILE_NAME: &str = "catalog.data";

/// Default data directory.
pub const DEFAULT_DATA_DIR: &str = "./framedb_data";

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the catalog, table files and index snapshots.
    pub data_dir: PathBuf,
    /// Declared equality indexes.
    pub indexes: Vec<IndexInfo>,
    /// Whether to fsync a table file after every append.
    pub sync_on_append: bool,
    /// Whether to write index snapshots after every insert.
    pub persist_index_on_insert: bool,
    /// Tables and columns used by the timeline query.
    pub timeline: TimelineSpec,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            indexes: vec![IndexInfo::new("posts", "user")],
            sync_on_append: false,
            persist_index_on_insert: true,
            timeline: TimelineSpec::default(),
        }
    }
}

impl Config {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Config {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_indexes(mut self, indexes: Vec<IndexInfo>) -> Self {
        self.indexes = indexes;
        self
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(CATALOG_FILE_NAME)
    }
}
