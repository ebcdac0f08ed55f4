use crate::catalog::ColumnInfo;
use crate::executor::Predicate;

/// A parsed command, ready to be executed by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    CreateTable {
        table: String,
        columns: Vec<ColumnInfo>,
    },
    /// Values are positional, in table column order.
    Insert { table: String, values: Vec<String> },
    Select {
        table: String,
        predicate: Option<Predicate>,
    },
    Meta(MetaCommand),
}

/// Dot-commands that are not table statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    /// `.tables`
    Tables,
    /// `.timeline <user>`
    Timeline(String),
    /// `.reindex <table> <column>`
    Reindex { table: String, column: String },
    /// `.exit`
    Exit,
}
