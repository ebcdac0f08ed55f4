//! framedb - interactive shell over a fixed-width record store

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use framedb::catalog::IndexInfo;
use framedb::session::{QueryResult, Session};
use framedb::{Config, Database};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// framedb - a minimal record store with equality indexes
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Data directory
    #[arg(short = 'D', long, default_value = framedb::config::DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Declare an equality index as TABLE.COLUMN (repeatable, replaces the default posts.user)
    #[arg(short, long = "index", value_name = "TABLE.COLUMN")]
    indexes: Vec<IndexInfo>,

    /// Start without the default posts.user index
    #[arg(long, conflicts_with = "indexes")]
    no_default_index: bool,

    /// Fsync table files after every insert
    #[arg(long)]
    sync: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::new(&self.data_dir);
        if self.no_default_index {
            config.indexes.clear();
        } else if !self.indexes.is_empty() {
            config.indexes = self.indexes.clone();
        }
        config.sync_on_append = self.sync;
        config
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = args.config();
    let database = Database::open(config)
        .with_context(|| format!("Failed to open database in {:?}", args.data_dir))?;
    let mut session = Session::new(database);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        print!("framedb > ");
        stdout.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        match session.execute_line(&line) {
            Ok(QueryResult::Exit) => break,
            Ok(result) => println!("{}", result),
            Err(e) => println!("Error: {}", e),
        }
    }

    session.close().context("Failed to save database")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_flags() {
        let args = Args::try_parse_from(["framedb", "-i", "follows.follower"]).unwrap();
        assert_eq!(
            args.config().indexes,
            vec![IndexInfo::new("follows", "follower")]
        );

        let args = Args::try_parse_from(["framedb", "--no-default-index"]).unwrap();
        assert!(args.config().indexes.is_empty());

        let args = Args::try_parse_from(["framedb"]).unwrap();
        assert_eq!(args.config().indexes, vec![IndexInfo::new("posts", "user")]);
    }

    #[test]
    fn test_index_conflicts_with_no_default_index() {
        let result =
            Args::try_parse_from(["framedb", "--index", "posts.user", "--no-default-index"]);
        assert!(result.is_err());
    }
}
