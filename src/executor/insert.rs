//! Insert executor implementation.

use crate::access::{decode_row, encode_row, Row};
use crate::catalog::TableInfo;
use crate::error::{DbError, DbResult};
use crate::executor::ExecutionContext;
use crate::index::IndexRegistry;
use log::{debug, warn};

/// Build a row from values given in table column order.
pub fn row_from_values(table_info: &TableInfo, values: Vec<String>) -> DbResult<Row> {
    if values.len() > table_info.columns.len() {
        return Err(DbError::ValueCount {
            table: table_info.table_name.clone(),
            expected: table_info.columns.len(),
            actual: values.len(),
        });
    }
    if let Some(missing) = table_info.columns.get(values.len()) {
        return Err(DbError::MissingField {
            table: table_info.table_name.clone(),
            column: missing.column_name.clone(),
        });
    }

    let mut row = Row::with_capacity(table_info.columns.len());
    for (column, value) in table_info.columns.iter().zip(values) {
        row.set(column.column_name.clone(), value);
    }
    Ok(row)
}

/// Executor that appends rows to a table and keeps its indexes current
pub struct InsertExecutor<'a> {
    table_name: String,
    rows: Vec<Row>,
    context: ExecutionContext<'a>,
    indexes: &'a mut IndexRegistry,
    persist_indexes: bool,
}

impl<'a> InsertExecutor<'a> {
    pub fn new(
        table_name: impl Into<String>,
        rows: Vec<Row>,
        context: ExecutionContext<'a>,
        indexes: &'a mut IndexRegistry,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            rows,
            context,
            indexes,
            persist_indexes: false,
        }
    }

    /// Write index snapshots after the rows are recorded.
    pub fn persist_indexes(mut self, persist: bool) -> Self {
        self.persist_indexes = persist;
        self
    }

    /// Insert all rows and return their offsets, in order.
    ///
    /// Every row is encoded before anything is written, so a row with a
    /// missing field leaves the table untouched.
    pub fn execute(self) -> DbResult<Vec<u64>> {
        let Self {
            table_name,
            rows,
            context,
            indexes,
            persist_indexes,
        } = self;
        let table_name = table_name.as_str();
        let store = context.store;
        let table_info = context.catalog.get_table(table_name)?;

        let frames = rows
            .iter()
            .map(|row| encode_row(row, table_info))
            .collect::<DbResult<Vec<_>>>()?;
        // Index keys are the values as stored, after truncation and trimming,
        // so that lookups agree with a scan of the same frames.
        let stored = frames
            .iter()
            .map(|frame| decode_row(frame, table_info))
            .collect::<DbResult<Vec<_>>>()?;

        // Indexes must be loaded before the table grows, otherwise a missing
        // snapshot cannot be told apart from an incomplete one.
        let mut indexed = Vec::new();
        for column in indexes.indexed_columns(table_name) {
            if !table_info.has_column(&column) {
                warn!("Index {}.{} names an unknown column", table_name, column);
                continue;
            }
            match indexes.ensure_loaded(table_name, &column, store) {
                Ok(_) => indexed.push(column),
                Err(DbError::IndexUnavailable { reason, .. }) => {
                    warn!(
                        "Not maintaining index {}.{}: {}",
                        table_name, column, reason
                    );
                }
                Err(e) => return Err(e),
            }
        }

        let mut offsets = Vec::with_capacity(frames.len());
        for (row, frame) in stored.iter().zip(&frames) {
            let offset = store.append(table_name, frame)?;
            for column in &indexed {
                if let Some(value) = row.get(column) {
                    indexes.record(table_name, column, value, offset);
                }
            }
            offsets.push(offset);
        }

        if persist_indexes && !offsets.is_empty() {
            for column in &indexed {
                indexes.persist(table_name, column)?;
            }
        }

        debug!("Inserted {} row(s) into '{}'", offsets.len(), table_name);
        Ok(offsets)
    }
}
