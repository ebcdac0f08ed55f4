//! Session: executes parsed statements against a database and reports results.

use crate::access::Row;
use crate::database::Database;
use crate::error::DbResult;
use crate::executor::Timeline;
use crate::sql::{MetaCommand, Parser, Statement};
use anyhow::Result;
use std::fmt;

/// Result of executing one statement. `Display` renders it for the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    TableCreated(String),
    Inserted { table: String, offset: u64 },
    Rows(Vec<Row>),
    Tables(Vec<String>),
    Timeline { user: String, timeline: Timeline },
    Reindexed { table: String, column: String, rows: usize },
    Exit,
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::TableCreated(table) => write!(f, "Table {} created.", table),
            QueryResult::Inserted { table, .. } => write!(f, "Inserted 1 row into {}", table),
            QueryResult::Rows(rows) if rows.is_empty() => write!(f, "No rows found."),
            QueryResult::Rows(rows) => write_rows(f, rows),
            QueryResult::Tables(tables) => write!(f, "{}", tables.join("\n")),
            QueryResult::Timeline { user, timeline } => match timeline {
                Timeline::NoFollowees => write!(f, "{} is not following anyone.", user),
                Timeline::NoPosts { .. } => write!(f, "No posts from followed users."),
                Timeline::Posts(rows) => write_rows(f, rows),
            },
            QueryResult::Reindexed {
                table,
                column,
                rows,
            } => write!(f, "Rebuilt index {}.{} from {} row(s)", table, column, rows),
            QueryResult::Exit => Ok(()),
        }
    }
}

fn write_rows(f: &mut fmt::Formatter<'_>, rows: &[Row]) -> fmt::Result {
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            writeln!(f)?;
        }
        write!(f, "{}", row)?;
    }
    Ok(())
}

/// Owns a database for the duration of an interactive session.
pub struct Session {
    database: Database,
}

impl Session {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub fn database(&mut self) -> &mut Database {
        &mut self.database
    }

    /// Parse and execute one command line.
    pub fn execute_line(&mut self, line: &str) -> Result<QueryResult> {
        let statement = Parser::new(line).parse()?;
        Ok(self.execute(statement)?)
    }

    pub fn execute(&mut self, statement: Statement) -> DbResult<QueryResult> {
        match statement {
            Statement::CreateTable { table, columns } => {
                self.database.create_table(&table, columns)?;
                Ok(QueryResult::TableCreated(table))
            }
            Statement::Insert { table, values } => {
                let offset = self.database.insert_values(&table, values)?;
                Ok(QueryResult::Inserted { table, offset })
            }
            Statement::Select { table, predicate } => {
                let rows = self
                    .database
                    .select(&table, predicate)?
                    .collect::<DbResult<Vec<_>>>()?;
                Ok(QueryResult::Rows(rows))
            }
            Statement::Meta(MetaCommand::Tables) => {
                Ok(QueryResult::Tables(self.database.list_tables()))
            }
            Statement::Meta(MetaCommand::Timeline(user)) => {
                let timeline = self.database.timeline(&user)?;
                Ok(QueryResult::Timeline { user, timeline })
            }
            Statement::Meta(MetaCommand::Reindex { table, column }) => {
                let rows = self.database.rebuild_index(&table, &column)?;
                Ok(QueryResult::Reindexed {
                    table,
                    column,
                    rows,
                })
            }
            Statement::Meta(MetaCommand::Exit) => Ok(QueryResult::Exit),
        }
    }

    /// Flush and close the underlying database.
    pub fn close(self) -> DbResult<()> {
        self.database.close()
    }
}
