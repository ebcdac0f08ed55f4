// Statement parser - splits a command line on whitespace and builds a Statement

use super::statement::{MetaCommand, Statement};
use crate::catalog::{ColumnInfo, ColumnType};
use crate::executor::Predicate;
use anyhow::{bail, Context, Result};

pub struct Parser {
    tokens: Vec<String>,
    position: usize,
}

impl Parser {
    /// Input is lower-cased before tokenizing, so names and values are
    /// case-insensitive.
    pub fn new(input: &str) -> Self {
        let tokens = input
            .trim()
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        Parser {
            tokens,
            position: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Statement> {
        let Some(first) = self.current_token().map(str::to_string) else {
            bail!("Empty command");
        };

        if first.starts_with('.') {
            return self.parse_meta();
        }

        match first.as_str() {
            "create" => self.parse_create(),
            "insert" => self.parse_insert(),
            "select" => self.parse_select(),
            _ => bail!("Unsupported command."),
        }
    }

    /// `.tables`, `.timeline <user>`, `.reindex <table> <column>`, `.exit`
    fn parse_meta(&mut self) -> Result<Statement> {
        let command = self.advance().unwrap_or_default();
        let meta = match command.as_str() {
            ".exit" => MetaCommand::Exit,
            ".tables" => MetaCommand::Tables,
            ".timeline" => {
                let user = self.advance().context("Usage: .timeline <username>")?;
                MetaCommand::Timeline(user)
            }
            ".reindex" => {
                let table = self.advance().context("Usage: .reindex <table> <column>")?;
                let column = self.advance().context("Usage: .reindex <table> <column>")?;
                MetaCommand::Reindex { table, column }
            }
            other => bail!("Unrecognized command '{}'", other),
        };
        self.expect_end()?;
        Ok(Statement::Meta(meta))
    }

    /// `create table <name> (<column> <type> <length>)+`
    fn parse_create(&mut self) -> Result<Statement> {
        self.expect_keyword("create")?;
        self.expect_keyword("table")?;
        let table = self.advance().context("Expected table name")?;

        let mut columns = Vec::new();
        while let Some(name) = self.advance() {
            let type_name = self
                .advance()
                .with_context(|| format!("Expected type for column '{}'", name))?;
            let length = self
                .advance()
                .with_context(|| format!("Expected length for column '{}'", name))?;

            let column_type = ColumnType::from_name(&type_name)
                .with_context(|| format!("Unsupported column type '{}'", type_name))?;
            let length: usize = length
                .parse()
                .with_context(|| format!("Invalid length '{}' for column '{}'", length, name))?;

            columns.push(ColumnInfo {
                column_name: name,
                column_type,
                length,
            });
        }

        if columns.is_empty() {
            bail!("Expected at least one column definition");
        }

        Ok(Statement::CreateTable { table, columns })
    }

    /// `insert into <table> <value>...`
    fn parse_insert(&mut self) -> Result<Statement> {
        self.expect_keyword("insert")?;
        self.expect_keyword("into")?;
        let table = self.advance().context("Expected table name")?;

        let mut values = Vec::new();
        while let Some(value) = self.advance() {
            values.push(value);
        }

        Ok(Statement::Insert { table, values })
    }

    /// `select * from <table> [where <column> = <value>]`
    fn parse_select(&mut self) -> Result<Statement> {
        self.expect_keyword("select")?;
        self.expect_keyword("*")?;
        self.expect_keyword("from")?;
        let table = self.advance().context("Expected table name")?;

        let predicate = if self.current_token().is_some() {
            self.expect_keyword("where")?;
            let column = self.advance().context("Expected column after WHERE")?;
            self.expect_keyword("=")?;
            let value = self.advance().context("Expected value after '='")?;
            self.expect_end()?;
            Some(Predicate::new(column, value))
        } else {
            None
        };

        Ok(Statement::Select { table, predicate })
    }

    fn current_token(&self) -> Option<&str> {
        self.tokens.get(self.position).map(String::as_str)
    }

    fn advance(&mut self) -> Option<String> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        match self.advance() {
            Some(token) if token == keyword => Ok(()),
            Some(token) => bail!("Expected '{}', found '{}'", keyword, token),
            None => bail!("Expected '{}', found end of input", keyword),
        }
    }

    fn expect_end(&self) -> Result<()> {
        match self.current_token() {
            None => Ok(()),
            Some(token) => bail!("Unexpected token '{}'", token),
        }
    }
}
