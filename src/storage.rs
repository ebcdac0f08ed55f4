//! Storage layer implementation for framedb.
//!
//! Each table is backed by one append-only file holding concatenated
//! fixed-size row frames. There is no header, row count or deletion marker:
//! the file length is the only length signal, and a frame's byte offset is
//! its stable identity.
//!
//! - **TableStore**: Creates table files, appends frames, reads by offset
//! - **TableScanner**: Sequential frame iterator over one table file

pub mod scan;
pub mod table_store;

pub use scan::TableScanner;
pub use table_store::TableStore;
