pub mod access;
pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod executor;
pub mod index;
pub mod planner;
pub mod session;
pub mod sql;
pub mod storage;

pub use config::Config;
pub use database::Database;
pub use error::{DbError, DbResult};
