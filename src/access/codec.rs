//! Fixed-width row codec.
//!
//! Each column occupies exactly `length` bytes: the value's UTF-8 bytes,
//! zero-padded on the right. A value longer than its column is cut at the
//! byte boundary `length` without error. On decode, each field is read as
//! UTF-8 (an incomplete trailing character left by the cut becomes U+FFFD)
//! and trailing padding and whitespace are stripped, so trailing spaces in the
//! original value do not survive a round trip.

use crate::access::row::Row;
use crate::catalog::TableInfo;
use crate::error::{DbError, DbResult};

/// Size in bytes of one row frame for `table`.
pub fn row_size(table: &TableInfo) -> usize {
    table.row_size()
}

/// Encode `row` into a frame of exactly `row_size(table)` bytes.
pub fn encode_row(row: &Row, table: &TableInfo) -> DbResult<Vec<u8>> {
    let mut data = Vec::with_capacity(table.row_size());

    for column in &table.columns {
        let value = row
            .get(&column.column_name)
            .ok_or_else(|| DbError::MissingField {
                table: table.table_name.clone(),
                column: column.column_name.clone(),
            })?;

        let bytes = value.as_bytes();
        let len = bytes.len().min(column.length);
        data.extend_from_slice(&bytes[..len]);
        data.resize(data.len() + column.length - len, 0);
    }

    Ok(data)
}

/// Decode a frame produced by [`encode_row`].
pub fn decode_row(data: &[u8], table: &TableInfo) -> DbResult<Row> {
    let expected = table.row_size();
    if data.len() != expected {
        return Err(DbError::FrameSize {
            table: table.table_name.clone(),
            expected,
            actual: data.len(),
        });
    }

    let mut row = Row::with_capacity(table.columns.len());
    let mut offset = 0;

    for column in &table.columns {
        let field = &data[offset..offset + column.length];
        let text = String::from_utf8_lossy(field);
        row.set(column.column_name.clone(), strip_padding(&text));
        offset += column.length;
    }

    Ok(row)
}

fn strip_padding(text: &str) -> &str {
    text.trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
}
