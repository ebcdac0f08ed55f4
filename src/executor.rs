//! Executor layer for query execution.
//!
//! This module implements the Volcano-style iterator model. Each executor
//! produces rows one at a time via `next()`, so a select is a single lazy pass
//! over storage.

use crate::access::Row;
use crate::catalog::{Catalog, ColumnInfo};
use crate::error::DbResult;
use crate::storage::TableStore;

pub mod filter;
pub mod index_scan;
pub mod insert;
pub mod seq_scan;
pub mod timeline;

pub use filter::{FilterExecutor, Predicate, RowFilter};
pub use index_scan::IndexScanExecutor;
pub use insert::InsertExecutor;
pub use seq_scan::SeqScanExecutor;
pub use timeline::{Timeline, TimelineExecutor, TimelineSpec};

/// Trait for all row-producing executors
pub trait Executor {
    /// Initialize the executor. This must be called before `next()`.
    fn init(&mut self) -> DbResult<()>;

    /// Get the next row from the executor.
    /// Returns None when there are no more rows.
    fn next(&mut self) -> DbResult<Option<Row>>;

    /// Columns of the rows this executor produces
    fn output_schema(&self) -> &[ColumnInfo];
}

/// Shared read-only resources for executors
#[derive(Clone, Copy)]
pub struct ExecutionContext<'a> {
    pub catalog: &'a Catalog,
    pub store: &'a TableStore,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(catalog: &'a Catalog, store: &'a TableStore) -> Self {
        Self { catalog, store }
    }
}

/// A one-pass, lazy sequence of rows backed by an executor tree.
pub struct RowStream<'a> {
    executor: Box<dyn Executor + 'a>,
}

impl<'a> RowStream<'a> {
    /// Initialize `executor` and wrap it.
    pub fn new(mut executor: Box<dyn Executor + 'a>) -> DbResult<Self> {
        executor.init()?;
        Ok(Self { executor })
    }

    pub fn schema(&self) -> &[ColumnInfo] {
        self.executor.output_schema()
    }
}

impl Iterator for RowStream<'_> {
    type Item = DbResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.executor.next().transpose()
    }
}
