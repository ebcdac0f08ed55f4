//! Filter executor implementation.
//!
//! Passes through the rows of a child executor that satisfy a [`RowFilter`].
//! Comparison is exact string equality on decoded values, so it sees values
//! after the codec has stripped padding and trailing whitespace.

use crate::access::Row;
use crate::catalog::ColumnInfo;
use crate::error::{DbError, DbResult};
use crate::executor::Executor;
use std::collections::HashSet;

/// `column = value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: String,
    pub value: String,
}

impl Predicate {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RowFilter {
    /// Column equals a single value
    Equals(Predicate),
    /// Column equals any value of the set
    OneOf {
        column: String,
        values: HashSet<String>,
    },
}

impl RowFilter {
    pub fn column(&self) -> &str {
        match self {
            RowFilter::Equals(predicate) => &predicate.column,
            RowFilter::OneOf { column, .. } => column,
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        match self {
            RowFilter::Equals(predicate) => {
                row.get(&predicate.column) == Some(predicate.value.as_str())
            }
            RowFilter::OneOf { column, values } => {
                row.get(column).is_some_and(|value| values.contains(value))
            }
        }
    }
}

/// Executor that filters rows of its child
pub struct FilterExecutor<'a> {
    child: Box<dyn Executor + 'a>,
    filter: RowFilter,
    initialized: bool,
}

impl<'a> FilterExecutor<'a> {
    pub fn new(child: Box<dyn Executor + 'a>, filter: RowFilter) -> Self {
        Self {
            child,
            filter,
            initialized: false,
        }
    }
}

impl Executor for FilterExecutor<'_> {
    fn init(&mut self) -> DbResult<()> {
        if self.initialized {
            return Ok(());
        }

        self.child.init()?;

        let column = self.filter.column();
        if !self
            .child
            .output_schema()
            .iter()
            .any(|c| c.column_name == column)
        {
            return Err(DbError::invalid_column("", column, "not in scanned table"));
        }

        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> DbResult<Option<Row>> {
        if !self.initialized {
            return Ok(None);
        }

        while let Some(row) = self.child.next()? {
            if self.filter.matches(&row) {
                return Ok(Some(row));
            }
        }

        Ok(None)
    }

    fn output_schema(&self) -> &[ColumnInfo] {
        self.child.output_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::test_support::*;
    use crate::executor::{ExecutionContext, RowStream, SeqScanExecutor};
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_equals_filter() -> Result<()> {
        let dir = tempdir()?;
        let (catalog, store) = people_fixture(dir.path())?;
        append(&catalog, &store, "people", &[("name", "amy"), ("age", "30")])?;
        append(&catalog, &store, "people", &[("name", "ben"), ("age", "25")])?;
        append(&catalog, &store, "people", &[("name", "cat"), ("age", "25")])?;

        let context = ExecutionContext::new(&catalog, &store);
        let scan = Box::new(SeqScanExecutor::new("people", context));
        let filter = FilterExecutor::new(scan, RowFilter::Equals(Predicate::new("age", "25")));

        let names = RowStream::new(Box::new(filter))?
            .map(|row| row.map(|r| r.get("name").unwrap_or_default().to_string()))
            .collect::<DbResult<Vec<_>>>()?;
        assert_eq!(names, vec!["ben", "cat"]);

        Ok(())
    }

    #[test]
    fn test_one_of_filter() {
        let filter = RowFilter::OneOf {
            column: "user".to_string(),
            values: ["bob", "carol"].into_iter().map(String::from).collect(),
        };
        assert!(filter.matches(&Row::from_pairs([("user", "bob")])));
        assert!(!filter.matches(&Row::from_pairs([("user", "dave")])));
        assert!(!filter.matches(&Row::from_pairs([("name", "bob")])));
    }

    #[test]
    fn test_unknown_filter_column() -> Result<()> {
        let dir = tempdir()?;
        let (catalog, store) = people_fixture(dir.path())?;

        let context = ExecutionContext::new(&catalog, &store);
        let scan = Box::new(SeqScanExecutor::new("people", context));
        let mut filter =
            FilterExecutor::new(scan, RowFilter::Equals(Predicate::new("email", "x")));

        assert!(matches!(filter.init(), Err(DbError::InvalidColumn { .. })));
        Ok(())
    }
}
