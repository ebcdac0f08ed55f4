//! Query planning: index lookup when one is available, full scan otherwise.

use crate::catalog::Catalog;
use crate::error::{DbError, DbResult};
use crate::executor::{
    ExecutionContext, Executor, FilterExecutor, IndexScanExecutor, Predicate, RowFilter,
    SeqScanExecutor,
};
use crate::index::IndexRegistry;
use crate::storage::TableStore;
use log::{debug, warn};

/// Physical plan for a single-table select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPlan {
    /// Read the rows at offsets taken from an equality index. The offsets are
    /// exact matches, so no filter runs on top.
    IndexedLookup {
        table_name: String,
        predicate: Predicate,
        offsets: Vec<u64>,
    },
    /// Decode every frame and keep the rows matching the optional predicate.
    FullScan {
        table_name: String,
        predicate: Option<Predicate>,
    },
}

impl ScanPlan {
    pub fn table_name(&self) -> &str {
        match self {
            ScanPlan::IndexedLookup { table_name, .. } | ScanPlan::FullScan { table_name, .. } => {
                table_name
            }
        }
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self, ScanPlan::IndexedLookup { .. })
    }

    /// Build the executor tree for this plan.
    pub fn into_executor<'a>(self, context: ExecutionContext<'a>) -> Box<dyn Executor + 'a> {
        match self {
            ScanPlan::IndexedLookup {
                table_name,
                offsets,
                ..
            } => Box::new(IndexScanExecutor::new(table_name, offsets, context)),
            ScanPlan::FullScan {
                table_name,
                predicate,
            } => {
                let scan: Box<dyn Executor + 'a> =
                    Box::new(SeqScanExecutor::new(table_name, context));
                match predicate {
                    Some(predicate) => {
                        Box::new(FilterExecutor::new(scan, RowFilter::Equals(predicate)))
                    }
                    None => scan,
                }
            }
        }
    }
}

pub struct Planner<'a> {
    catalog: &'a Catalog,
    store: &'a TableStore,
    indexes: &'a mut IndexRegistry,
}

impl<'a> Planner<'a> {
    pub fn new(
        catalog: &'a Catalog,
        store: &'a TableStore,
        indexes: &'a mut IndexRegistry,
    ) -> Self {
        Self {
            catalog,
            store,
            indexes,
        }
    }

    /// Choose a plan for `table_name` with an optional equality predicate.
    pub fn plan(&mut self, table_name: &str, predicate: Option<Predicate>) -> DbResult<ScanPlan> {
        let table_info = self.catalog.get_table(table_name)?;

        let Some(predicate) = predicate else {
            return Ok(ScanPlan::FullScan {
                table_name: table_name.to_string(),
                predicate: None,
            });
        };

        if !table_info.has_column(&predicate.column) {
            return Err(DbError::invalid_column(
                table_name,
                &predicate.column,
                "no such column",
            ));
        }

        if self.indexes.is_defined(table_name, &predicate.column) {
            match self.indexes.lookup(
                table_name,
                &predicate.column,
                &predicate.value,
                self.store,
            ) {
                Ok(offsets) => {
                    debug!(
                        "Indexed lookup on {}.{} = '{}': {} offset(s)",
                        table_name,
                        predicate.column,
                        predicate.value,
                        offsets.len()
                    );
                    return Ok(ScanPlan::IndexedLookup {
                        table_name: table_name.to_string(),
                        predicate,
                        offsets,
                    });
                }
                Err(DbError::IndexUnavailable { reason, .. }) => {
                    warn!(
                        "Index {}.{} unavailable ({}), falling back to full scan",
                        table_name, predicate.column, reason
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Ok(ScanPlan::FullScan {
            table_name: table_name.to_string(),
            predicate: Some(predicate),
        })
    }
}
