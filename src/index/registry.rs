//! Registry of declared equality indexes and their load state.

use crate::access::decode_row;
use crate::catalog::{IndexInfo, TableInfo};
use crate::error::{DbError, DbResult};
use crate::index::equality::EqualityIndex;
use crate::storage::TableStore;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Load state of one declared index.
#[derive(Debug)]
enum IndexState {
    /// Declared but not yet read from its snapshot.
    Unloaded,
    /// Complete and usable for lookups.
    Ready(EqualityIndex),
    /// Cannot be trusted; queries fall back to a full scan.
    Unavailable(String),
}

/// Owns every declared index, keyed by `(table, column)`.
///
/// Indexes are loaded lazily, the first time they are looked up or prepared
/// for an insert. A missing snapshot is only trusted when the table has no
/// rows yet; otherwise the index is unavailable until [`IndexRegistry::rebuild`]
/// is run.
pub struct IndexRegistry {
    data_dir: PathBuf,
    indexes: HashMap<IndexInfo, IndexState>,
}

impl IndexRegistry {
    pub fn new(data_dir: &Path, definitions: impl IntoIterator<Item = IndexInfo>) -> Self {
        let indexes = definitions
            .into_iter()
            .map(|info| (info, IndexState::Unloaded))
            .collect();
        Self {
            data_dir: data_dir.to_path_buf(),
            indexes,
        }
    }

    /// Declared index definitions, sorted by table then column.
    pub fn definitions(&self) -> Vec<&IndexInfo> {
        let mut defs: Vec<&IndexInfo> = self.indexes.keys().collect();
        defs.sort_by(|a, b| {
            (&a.table_name, &a.column_name).cmp(&(&b.table_name, &b.column_name))
        });
        defs
    }

    pub fn is_defined(&self, table: &str, column: &str) -> bool {
        self.indexes.contains_key(&IndexInfo::new(table, column))
    }

    /// Indexed column names of `table`.
    pub fn indexed_columns(&self, table: &str) -> Vec<String> {
        self.definitions()
            .into_iter()
            .filter(|info| info.table_name == table)
            .map(|info| info.column_name.clone())
            .collect()
    }

    pub fn is_ready(&self, table: &str, column: &str) -> bool {
        matches!(
            self.indexes.get(&IndexInfo::new(table, column)),
            Some(IndexState::Ready(_))
        )
    }

    pub fn snapshot_path(&self, info: &IndexInfo) -> PathBuf {
        self.data_dir.join(info.file_name())
    }

    /// Mark every index of a freshly created table as complete and empty.
    pub fn reset_table(&mut self, table: &str) {
        for (info, state) in self.indexes.iter_mut() {
            if info.table_name == table {
                debug!("Index {} starts empty", info);
                *state = IndexState::Ready(EqualityIndex::new());
            }
        }
    }

    /// Load the index if needed and return it.
    pub fn ensure_loaded(
        &mut self,
        table: &str,
        column: &str,
        store: &TableStore,
    ) -> DbResult<&mut EqualityIndex> {
        let info = IndexInfo::new(table, column);
        let path = self.snapshot_path(&info);
        let state = self
            .indexes
            .get_mut(&info)
            .ok_or_else(|| DbError::IndexUnavailable {
                table: table.to_string(),
                column: column.to_string(),
                reason: "no index is defined".to_string(),
            })?;

        if matches!(state, IndexState::Unloaded) {
            *state = load_state(&info, &path, store);
        }

        match state {
            IndexState::Ready(index) => Ok(index),
            IndexState::Unavailable(reason) => Err(DbError::IndexUnavailable {
                table: table.to_string(),
                column: column.to_string(),
                reason: reason.clone(),
            }),
            IndexState::Unloaded => Err(DbError::IndexUnavailable {
                table: table.to_string(),
                column: column.to_string(),
                reason: "not loaded".to_string(),
            }),
        }
    }

    /// Offsets of rows in `table` whose `column` equals `value`.
    pub fn lookup(
        &mut self,
        table: &str,
        column: &str,
        value: &str,
        store: &TableStore,
    ) -> DbResult<Vec<u64>> {
        let index = self.ensure_loaded(table, column, store)?;
        Ok(index.lookup(value).to_vec())
    }

    /// Record a new row offset. Only a loaded, ready index is updated; the
    /// return value tells whether the offset was recorded.
    pub fn record(&mut self, table: &str, column: &str, value: &str, offset: u64) -> bool {
        match self.indexes.get_mut(&IndexInfo::new(table, column)) {
            Some(IndexState::Ready(index)) => {
                index.record(value, offset);
                true
            }
            _ => false,
        }
    }

    /// Write the snapshot of one index. Indexes that are not ready are skipped.
    pub fn persist(&self, table: &str, column: &str) -> DbResult<()> {
        let info = IndexInfo::new(table, column);
        match self.indexes.get(&info) {
            Some(IndexState::Ready(index)) => {
                index.save(&self.snapshot_path(&info))?;
                debug!("Persisted index {} ({} entries)", info, index.len());
                Ok(())
            }
            _ => {
                debug!("Index {} is not ready, skipping persist", info);
                Ok(())
            }
        }
    }

    /// Drop the in-memory copy and read the snapshot again.
    pub fn reload(&mut self, table: &str, column: &str, store: &TableStore) -> DbResult<()> {
        if let Some(state) = self.indexes.get_mut(&IndexInfo::new(table, column)) {
            *state = IndexState::Unloaded;
        }
        self.ensure_loaded(table, column, store).map(|_| ())
    }

    pub fn persist_all(&self) -> DbResult<()> {
        for info in self.definitions() {
            self.persist(&info.table_name, &info.column_name)?;
        }
        Ok(())
    }

    /// Rebuild an index from the rows already stored in the table, then
    /// persist it. Returns the number of rows indexed.
    pub fn rebuild(
        &mut self,
        table_info: &TableInfo,
        column: &str,
        store: &TableStore,
    ) -> DbResult<usize> {
        let table = table_info.table_name.as_str();
        let info = IndexInfo::new(table, column);
        if !self.indexes.contains_key(&info) {
            return Err(DbError::IndexUnavailable {
                table: table.to_string(),
                column: column.to_string(),
                reason: "no index is defined".to_string(),
            });
        }
        if !table_info.has_column(column) {
            return Err(DbError::invalid_column(table, column, "no such column"));
        }

        let mut index = EqualityIndex::new();
        let mut rows = 0;
        for frame in store.scan(table, table_info.row_size())? {
            let (offset, data) = frame?;
            let row = decode_row(&data, table_info)?;
            if let Some(value) = row.get(column) {
                index.record(value, offset);
            }
            rows += 1;
        }

        self.indexes.insert(info.clone(), IndexState::Ready(index));
        self.persist(table, column)?;
        info!("Rebuilt index {} from {} row(s)", info, rows);
        Ok(rows)
    }
}

fn load_state(info: &IndexInfo, path: &Path, store: &TableStore) -> IndexState {
    if path.exists() {
        return match EqualityIndex::load(path) {
            Ok(index) => {
                info!(
                    "Loaded index {} ({} distinct values)",
                    info,
                    index.distinct_values()
                );
                IndexState::Ready(index)
            }
            Err(e) => {
                warn!("Index {} snapshot is unreadable: {}", info, e);
                IndexState::Unavailable(format!("unreadable snapshot: {}", e))
            }
        };
    }

    match store.len(&info.table_name) {
        Ok(0) | Err(DbError::TableNotFound(_)) => {
            debug!("No snapshot for index {}, table is empty", info);
            IndexState::Ready(EqualityIndex::new())
        }
        Ok(len) => {
            warn!(
                "No snapshot for index {} but table holds {} bytes; rebuild required",
                info, len
            );
            IndexState::Unavailable("snapshot missing for a non-empty table".to_string())
        }
        Err(e) => IndexState::Unavailable(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{encode_row, Row};
    use crate::catalog::ColumnInfo;
    use anyhow::Result;
    use tempfile::tempdir;

    fn posts() -> TableInfo {
        TableInfo {
            table_name: "posts".to_string(),
            columns: vec![ColumnInfo::new("user", 10), ColumnInfo::new("text", 20)],
        }
    }

    fn append_post(store: &TableStore, user: &str, text: &str) -> Result<u64> {
        let row = Row::from_pairs([("user", user), ("text", text)]);
        Ok(store.append("posts", &encode_row(&row, &posts())?)?)
    }

    #[test]
    fn test_missing_snapshot_on_empty_table_is_ready() -> Result<()> {
        let dir = tempdir()?;
        let store = TableStore::new(dir.path(), false)?;
        store.create("posts")?;
        let mut registry = IndexRegistry::new(dir.path(), [IndexInfo::new("posts", "user")]);

        assert!(registry.lookup("posts", "user", "a", &store)?.is_empty());
        assert!(registry.is_ready("posts", "user"));

        Ok(())
    }

    #[test]
    fn test_missing_snapshot_on_populated_table_is_unavailable() -> Result<()> {
        let dir = tempdir()?;
        let store = TableStore::new(dir.path(), false)?;
        append_post(&store, "a", "hello")?;
        let mut registry = IndexRegistry::new(dir.path(), [IndexInfo::new("posts", "user")]);

        let result = registry.lookup("posts", "user", "a", &store);
        assert!(matches!(result, Err(DbError::IndexUnavailable { .. })));
        assert!(!registry.record("posts", "user", "a", 30));

        Ok(())
    }

    #[test]
    fn test_persist_and_reload() -> Result<()> {
        let dir = tempdir()?;
        let store = TableStore::new(dir.path(), false)?;
        store.create("posts")?;
        let mut registry = IndexRegistry::new(dir.path(), [IndexInfo::new("posts", "user")]);
        registry.reset_table("posts");

        let first = append_post(&store, "a", "one")?;
        assert!(registry.record("posts", "user", "a", first));
        let second = append_post(&store, "a", "two")?;
        assert!(registry.record("posts", "user", "a", second));
        registry.persist("posts", "user")?;

        let mut reopened = IndexRegistry::new(dir.path(), [IndexInfo::new("posts", "user")]);
        assert_eq!(reopened.lookup("posts", "user", "a", &store)?, vec![0, 30]);

        reopened.reload("posts", "user", &store)?;
        assert_eq!(reopened.lookup("posts", "user", "a", &store)?, vec![0, 30]);

        Ok(())
    }

    #[test]
    fn test_corrupt_snapshot_is_unavailable() -> Result<()> {
        let dir = tempdir()?;
        let store = TableStore::new(dir.path(), false)?;
        store.create("posts")?;
        std::fs::write(dir.path().join("posts.user.index"), [1u8, 2, 3])?;
        let mut registry = IndexRegistry::new(dir.path(), [IndexInfo::new("posts", "user")]);

        assert!(matches!(
            registry.ensure_loaded("posts", "user", &store),
            Err(DbError::IndexUnavailable { .. })
        ));

        Ok(())
    }

    #[test]
    fn test_rebuild_from_storage() -> Result<()> {
        let dir = tempdir()?;
        let store = TableStore::new(dir.path(), false)?;
        append_post(&store, "a", "one")?;
        append_post(&store, "b", "two")?;
        append_post(&store, "a", "three")?;
        let mut registry = IndexRegistry::new(dir.path(), [IndexInfo::new("posts", "user")]);

        assert_eq!(registry.rebuild(&posts(), "user", &store)?, 3);
        assert_eq!(registry.lookup("posts", "user", "a", &store)?, vec![0, 60]);
        assert!(registry.snapshot_path(&IndexInfo::new("posts", "user")).exists());

        Ok(())
    }

    #[test]
    fn test_lookup_undefined_index() -> Result<()> {
        let dir = tempdir()?;
        let store = TableStore::new(dir.path(), false)?;
        let mut registry = IndexRegistry::new(dir.path(), Vec::new());

        assert!(!registry.is_defined("posts", "user"));
        assert!(registry.lookup("posts", "user", "a", &store).is_err());

        Ok(())
    }

    #[test]
    fn test_indexed_columns() {
        let dir = tempdir().unwrap();
        let registry = IndexRegistry::new(
            dir.path(),
            [
                IndexInfo::new("posts", "user"),
                IndexInfo::new("follows", "follower"),
                IndexInfo::new("posts", "text"),
            ],
        );
        assert_eq!(registry.indexed_columns("posts"), vec!["text", "user"]);
        assert_eq!(registry.indexed_columns("users"), Vec::<String>::new());
    }
}
