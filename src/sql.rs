// Statement module - command-line statements and their parser

pub mod parser;
pub mod statement;

pub use parser::Parser;
pub use statement::{MetaCommand, Statement};
