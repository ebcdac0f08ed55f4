use crate::access::Row;
use crate::catalog::{Catalog, ColumnInfo, TableInfo};
use crate::config::Config;
use crate::error::DbResult;
use crate::executor::insert::row_from_values;
use crate::executor::{
    ExecutionContext, InsertExecutor, Predicate, RowStream, Timeline, TimelineExecutor,
    TimelineSpec,
};
use crate::index::IndexRegistry;
use crate::planner::{Planner, ScanPlan};
use crate::storage::TableStore;
use log::{info, warn};

/// High-level database interface that integrates all layers
pub struct Database {
    config: Config,
    catalog: Catalog,
    store: TableStore,
    indexes: IndexRegistry,
    closed: bool,
}

impl Database {
    /// Open the database in `config.data_dir`, creating the directory if needed.
    pub fn open(config: Config) -> DbResult<Self> {
        let store = TableStore::new(&config.data_dir, config.sync_on_append)?;
        let catalog = Catalog::load(&config.catalog_path())?;
        let indexes = IndexRegistry::new(&config.data_dir, config.indexes.iter().cloned());

        info!(
            "Opened database at {:?} with {} declared index(es)",
            config.data_dir,
            config.indexes.len()
        );

        Ok(Self {
            config,
            catalog,
            store,
            indexes,
            closed: false,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register a table and materialize its empty storage file.
    pub fn create_table(&mut self, name: &str, columns: Vec<ColumnInfo>) -> DbResult<TableInfo> {
        let table_info = self.catalog.create_table(name, columns)?;
        self.store.create(name)?;
        self.indexes.reset_table(name);

        if self.config.persist_index_on_insert {
            for column in self.indexes.indexed_columns(name) {
                self.indexes.persist(name, &column)?;
            }
        }

        info!("Created table '{}' ({} bytes per row)", name, table_info.row_size());
        Ok(table_info)
    }

    pub fn get_table(&self, name: &str) -> DbResult<&TableInfo> {
        self.catalog.get_table(name)
    }

    pub fn list_tables(&self) -> Vec<String> {
        self.catalog.list_tables()
    }

    /// Insert a row given as column/value pairs; returns its offset.
    pub fn insert(&mut self, table: &str, row: Row) -> DbResult<u64> {
        let offsets = self.insert_rows(table, vec![row])?;
        Ok(offsets[0])
    }

    /// Insert a row given as values in table column order; returns its offset.
    pub fn insert_values(&mut self, table: &str, values: Vec<String>) -> DbResult<u64> {
        let row = row_from_values(self.catalog.get_table(table)?, values)?;
        self.insert(table, row)
    }

    pub fn insert_rows(&mut self, table: &str, rows: Vec<Row>) -> DbResult<Vec<u64>> {
        let context = ExecutionContext::new(&self.catalog, &self.store);
        InsertExecutor::new(table, rows, context, &mut self.indexes)
            .persist_indexes(self.config.persist_index_on_insert)
            .execute()
    }

    /// Choose how a select on `table` would run.
    pub fn plan(&mut self, table: &str, predicate: Option<Predicate>) -> DbResult<ScanPlan> {
        Planner::new(&self.catalog, &self.store, &mut self.indexes).plan(table, predicate)
    }

    /// Rows of `table`, optionally restricted to `predicate`, as a lazy stream.
    pub fn select(&mut self, table: &str, predicate: Option<Predicate>) -> DbResult<RowStream<'_>> {
        let plan = self.plan(table, predicate)?;
        let context = ExecutionContext::new(&self.catalog, &self.store);
        RowStream::new(plan.into_executor(context))
    }

    /// Offsets recorded by the index on `table.column` for `value`.
    pub fn index_lookup(&mut self, table: &str, column: &str, value: &str) -> DbResult<Vec<u64>> {
        self.indexes.lookup(table, column, value, &self.store)
    }

    /// Timeline of `user` over the configured tables.
    pub fn timeline(&self, user: &str) -> DbResult<Timeline> {
        self.timeline_with(self.config.timeline.clone(), user)
    }

    pub fn timeline_with(&self, spec: TimelineSpec, user: &str) -> DbResult<Timeline> {
        let context = ExecutionContext::new(&self.catalog, &self.store);
        TimelineExecutor::new(spec, context).execute(user)
    }

    /// Rebuild the index on `table.column` from stored rows.
    pub fn rebuild_index(&mut self, table: &str, column: &str) -> DbResult<usize> {
        let table_info = self.catalog.get_table(table)?;
        self.indexes.rebuild(table_info, column, &self.store)
    }

    pub fn persist_index(&self, table: &str, column: &str) -> DbResult<()> {
        self.indexes.persist(table, column)
    }

    pub fn reload_index(&mut self, table: &str, column: &str) -> DbResult<()> {
        self.indexes.reload(table, column, &self.store)
    }

    /// Save the catalog and every ready index.
    pub fn flush(&mut self) -> DbResult<()> {
        self.catalog.save(&self.config.catalog_path())?;
        self.indexes.persist_all()
    }

    pub fn close(mut self) -> DbResult<()> {
        self.flush()?;
        self.closed = true;
        info!("Closed database at {:?}", self.config.data_dir);
        Ok(())
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if !self.closed {
            // Best effort flush on drop
            if let Err(e) = self.flush() {
                warn!("Failed to flush database at {:?}: {}", self.config.data_dir, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::IndexInfo;
    use crate::error::DbError;
    use anyhow::Result;
    use tempfile::tempdir;

    fn values(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_create_table_materializes_file() -> Result<()> {
        let dir = tempdir()?;
        let mut db = Database::open(Config::new(dir.path()))?;

        db.create_table("t", vec![ColumnInfo::new("name", 10), ColumnInfo::new("age", 3)])?;

        assert!(dir.path().join("t.db").exists());
        assert_eq!(db.list_tables(), vec!["t"]);
        assert_eq!(db.select("t", None)?.count(), 0);

        Ok(())
    }

    #[test]
    fn test_create_duplicate_table() -> Result<()> {
        let dir = tempdir()?;
        let mut db = Database::open(Config::new(dir.path()))?;
        db.create_table("t", vec![ColumnInfo::new("a", 1)])?;

        let result = db.create_table("t", vec![ColumnInfo::new("a", 1)]);
        assert!(matches!(result, Err(DbError::DuplicateTable(_))));

        Ok(())
    }

    #[test]
    fn test_create_table_stays_inside_data_dir() -> Result<()> {
        let dir = tempdir()?;
        let data_dir = dir.path().join("data");
        let mut db = Database::open(Config::new(&data_dir))?;

        let result = db.create_table("../evil", vec![ColumnInfo::new("a", 1)]);
        assert!(matches!(result, Err(DbError::InvalidColumn { .. })));
        assert!(!dir.path().join("evil.db").exists());
        assert!(db.list_tables().is_empty());

        Ok(())
    }

    #[test]
    fn test_insert_values_and_select() -> Result<()> {
        let dir = tempdir()?;
        let mut db = Database::open(Config::new(dir.path()))?;
        db.create_table("t", vec![ColumnInfo::new("name", 10), ColumnInfo::new("age", 3)])?;

        db.insert_values("t", values(&["amy", "30"]))?;
        db.insert_values("t", values(&["ben", "25"]))?;

        let rows = db
            .select("t", Some(Predicate::new("age", "25")))?
            .collect::<DbResult<Vec<_>>>()?;
        assert_eq!(rows, vec![Row::from_pairs([("name", "ben"), ("age", "25")])]);

        Ok(())
    }

    #[test]
    fn test_insert_into_missing_table() -> Result<()> {
        let dir = tempdir()?;
        let mut db = Database::open(Config::new(dir.path()))?;

        assert!(matches!(
            db.insert_values("nope", values(&["x"])),
            Err(DbError::TableNotFound(_))
        ));
        assert!(matches!(
            db.insert("nope", Row::from_pairs([("a", "x")])),
            Err(DbError::TableNotFound(_))
        ));

        Ok(())
    }

    #[test]
    fn test_persistence_across_reopen() -> Result<()> {
        let dir = tempdir()?;

        {
            let mut db = Database::open(Config::new(dir.path()))?;
            db.create_table(
                "posts",
                vec![ColumnInfo::new("user", 10), ColumnInfo::new("text", 20)],
            )?;
            db.insert_values("posts", values(&["a", "first"]))?;
            db.insert_values("posts", values(&["b", "second"]))?;
            db.close()?;
        }

        let mut db = Database::open(Config::new(dir.path()))?;
        assert_eq!(db.list_tables(), vec!["posts"]);
        assert!(db.plan("posts", Some(Predicate::new("user", "b")))?.is_indexed());

        let rows = db
            .select("posts", Some(Predicate::new("user", "b")))?
            .collect::<DbResult<Vec<_>>>()?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("text"), Some("second"));

        Ok(())
    }

    #[test]
    fn test_drop_flushes_catalog() -> Result<()> {
        let dir = tempdir()?;

        {
            let mut db = Database::open(Config::new(dir.path()))?;
            db.create_table("t", vec![ColumnInfo::new("a", 4)])?;
        }

        let db = Database::open(Config::new(dir.path()))?;
        assert_eq!(db.list_tables(), vec!["t"]);

        Ok(())
    }

    #[test]
    fn test_index_added_later_needs_rebuild() -> Result<()> {
        let dir = tempdir()?;

        {
            let mut db = Database::open(Config::new(dir.path()).with_indexes(Vec::new()))?;
            db.create_table("t", vec![ColumnInfo::new("k", 4), ColumnInfo::new("v", 4)])?;
            db.insert_values("t", values(&["x", "1"]))?;
            db.insert_values("t", values(&["y", "2"]))?;
            db.insert_values("t", values(&["x", "3"]))?;
            db.close()?;
        }

        let config = Config::new(dir.path()).with_indexes(vec![IndexInfo::new("t", "k")]);
        let mut db = Database::open(config)?;

        // No snapshot for a populated table: lookups fall back to a scan.
        assert!(matches!(
            db.index_lookup("t", "k", "x"),
            Err(DbError::IndexUnavailable { .. })
        ));
        assert!(!db.plan("t", Some(Predicate::new("k", "x")))?.is_indexed());
        assert_eq!(db.select("t", Some(Predicate::new("k", "x")))?.count(), 2);

        assert_eq!(db.rebuild_index("t", "k")?, 3);
        assert_eq!(db.index_lookup("t", "k", "x")?, vec![0, 16]);
        assert!(db.plan("t", Some(Predicate::new("k", "x")))?.is_indexed());

        Ok(())
    }

    #[test]
    fn test_reload_index_discards_unpersisted_entries() -> Result<()> {
        let dir = tempdir()?;
        let mut config = Config::new(dir.path());
        config.persist_index_on_insert = false;
        let mut db = Database::open(config)?;
        db.create_table(
            "posts",
            vec![ColumnInfo::new("user", 10), ColumnInfo::new("text", 20)],
        )?;

        db.insert_values("posts", values(&["a", "one"]))?;
        db.persist_index("posts", "user")?;
        db.insert_values("posts", values(&["a", "two"]))?;
        assert_eq!(db.index_lookup("posts", "user", "a")?, vec![0, 30]);

        db.reload_index("posts", "user")?;
        assert_eq!(db.index_lookup("posts", "user", "a")?, vec![0]);

        Ok(())
    }
}
