//! Error types shared by the catalog, storage, index and executor layers.

use thiserror::Error;

/// Errors that can occur while defining, storing or querying tables.
///
/// Every variant is recoverable: the caller decides whether to report the
/// failure and carry on.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Table '{0}' already exists")]
    DuplicateTable(String),

    #[error("Invalid column '{column}' in table '{table}': {reason}")]
    InvalidColumn {
        table: String,
        column: String,
        reason: String,
    },

    #[error("Missing value for column '{column}' in table '{table}'")]
    MissingField { table: String, column: String },

    #[error("Too many values for table '{table}': expected {expected}, got {actual}")]
    ValueCount {
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error("Corrupt read from '{table}' at offset {offset}: wanted {expected} bytes, got {actual}")]
    CorruptRead {
        table: String,
        offset: u64,
        expected: usize,
        actual: usize,
    },

    #[error("Frame size mismatch for table '{table}': expected {expected} bytes, got {actual}")]
    FrameSize {
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error("Index on {table}.{column} is unavailable: {reason}")]
    IndexUnavailable {
        table: String,
        column: String,
        reason: String,
    },

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DbError {
    pub(crate) fn invalid_column(
        table: impl Into<String>,
        column: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DbError::InvalidColumn {
            table: table.into(),
            column: column.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
