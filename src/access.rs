//! Access layer for row-oriented operations.
//!
//! This module sits between the raw byte frames kept by the storage layer and
//! the executors:
//!
//! - **Row**: Ordered column-name to text-value mapping
//! - **codec**: Fixed-width encoding of a row against its table layout
//!
//! Every column is stored as UTF-8 text padded with zero bytes to the column
//! width, so each table has a constant frame size.

pub mod codec;
pub mod row;

pub use codec::{decode_row, encode_row, row_size};
pub use row::Row;
