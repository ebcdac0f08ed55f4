//! Sequential scan executor implementation.

use crate::access::{decode_row, Row};
use crate::catalog::{ColumnInfo, TableInfo};
use crate::error::DbResult;
use crate::executor::{ExecutionContext, Executor};
use crate::storage::TableScanner;
use log::debug;

/// Executor that decodes every frame of a table, in storage order
pub struct SeqScanExecutor<'a> {
    table_name: String,
    context: ExecutionContext<'a>,
    table_info: Option<TableInfo>,
    scanner: Option<TableScanner>,
}

impl<'a> SeqScanExecutor<'a> {
    pub fn new(table_name: impl Into<String>, context: ExecutionContext<'a>) -> Self {
        Self {
            table_name: table_name.into(),
            context,
            table_info: None,
            scanner: None,
        }
    }
}

impl Executor for SeqScanExecutor<'_> {
    fn init(&mut self) -> DbResult<()> {
        if self.table_info.is_some() {
            return Ok(());
        }

        let table_info = self.context.catalog.get_table(&self.table_name)?.clone();
        self.scanner = Some(
            self.context
                .store
                .scan(&self.table_name, table_info.row_size())?,
        );
        debug!("Full scan of '{}'", self.table_name);
        self.table_info = Some(table_info);
        Ok(())
    }

    fn next(&mut self) -> DbResult<Option<Row>> {
        let (Some(table_info), Some(scanner)) = (&self.table_info, self.scanner.as_mut()) else {
            return Ok(None);
        };

        match scanner.next() {
            Some(frame) => {
                let (_, data) = frame?;
                Ok(Some(decode_row(&data, table_info)?))
            }
            None => Ok(None),
        }
    }

    fn output_schema(&self) -> &[ColumnInfo] {
        self.table_info
            .as_ref()
            .map(|t| t.columns.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::executor::test_support::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_seq_scan_empty_table() -> Result<()> {
        let dir = tempdir()?;
        let (catalog, store) = people_fixture(dir.path())?;

        let mut executor = SeqScanExecutor::new("people", ExecutionContext::new(&catalog, &store));
        executor.init()?;

        let schema = executor.output_schema();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema[0].column_name, "name");
        assert_eq!(schema[1].column_name, "age");
        assert!(executor.next()?.is_none());

        Ok(())
    }

    #[test]
    fn test_seq_scan_with_data() -> Result<()> {
        let dir = tempdir()?;
        let (catalog, store) = people_fixture(dir.path())?;
        append(&catalog, &store, "people", &[("name", "amy"), ("age", "30")])?;

        let mut executor = SeqScanExecutor::new("people", ExecutionContext::new(&catalog, &store));
        executor.init()?;

        let row = executor.next()?.expect("one row");
        assert_eq!(row, Row::from_pairs([("name", "amy"), ("age", "30")]));
        assert!(executor.next()?.is_none());

        Ok(())
    }

    #[test]
    fn test_seq_scan_unknown_table() -> Result<()> {
        let dir = tempdir()?;
        let (catalog, store) = people_fixture(dir.path())?;

        let mut executor = SeqScanExecutor::new("ghosts", ExecutionContext::new(&catalog, &store));
        assert!(matches!(executor.init(), Err(DbError::TableNotFound(_))));

        Ok(())
    }

    #[test]
    fn test_seq_scan_missing_file() -> Result<()> {
        let dir = tempdir()?;
        let (catalog, store) = people_fixture(dir.path())?;
        std::fs::remove_file(store.table_path("people"))?;

        let mut executor = SeqScanExecutor::new("people", ExecutionContext::new(&catalog, &store));
        assert!(matches!(executor.init(), Err(DbError::TableNotFound(_))));

        Ok(())
    }
}
