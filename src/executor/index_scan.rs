//! Index scan executor: reads rows at offsets produced by an equality index.

use crate::access::{decode_row, Row};
use crate::catalog::{ColumnInfo, TableInfo};
use crate::error::DbResult;
use crate::executor::{ExecutionContext, Executor};
use log::debug;

/// Executor that fetches rows by offset, in the order given
pub struct IndexScanExecutor<'a> {
    table_name: String,
    offsets: Vec<u64>,
    context: ExecutionContext<'a>,
    table_info: Option<TableInfo>,
    position: usize,
}

impl<'a> IndexScanExecutor<'a> {
    pub fn new(
        table_name: impl Into<String>,
        offsets: Vec<u64>,
        context: ExecutionContext<'a>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            offsets,
            context,
            table_info: None,
            position: 0,
        }
    }
}

impl Executor for IndexScanExecutor<'_> {
    fn init(&mut self) -> DbResult<()> {
        if self.table_info.is_some() {
            return Ok(());
        }

        self.table_info = Some(self.context.catalog.get_table(&self.table_name)?.clone());
        debug!(
            "Index scan of '{}' over {} offset(s)",
            self.table_name,
            self.offsets.len()
        );
        Ok(())
    }

    fn next(&mut self) -> DbResult<Option<Row>> {
        let Some(table_info) = &self.table_info else {
            return Ok(None);
        };
        let Some(&offset) = self.offsets.get(self.position) else {
            return Ok(None);
        };
        self.position += 1;

        let data = self
            .context
            .store
            .read_at(&self.table_name, offset, table_info.row_size())?;
        Ok(Some(decode_row(&data, table_info)?))
    }

    fn output_schema(&self) -> &[ColumnInfo] {
        self.table_info
            .as_ref()
            .map(|t| t.columns.as_slice())
            .unwrap_or(&[])
    }
}
