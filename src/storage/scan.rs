//! Sequential frame scanning over a table file.

use crate::error::{DbError, DbResult};
use std::fs::File;
use std::io::{BufReader, Read};

/// Iterator over the fixed-size frames of one table file, in file order.
///
/// Yields `(offset, frame)` pairs. The end of the scan is fixed when the
/// scanner is created; frames appended afterwards are not visited. A partial
/// frame at the tail of the file is reported as [`DbError::CorruptRead`] and
/// ends the scan.
pub struct TableScanner {
    table_name: String,
    reader: BufReader<File>,
    row_size: usize,
    offset: u64,
    end: u64,
    done: bool,
}

impl TableScanner {
    pub fn new(table_name: &str, file: File, row_size: usize) -> DbResult<Self> {
        let end = file.metadata()?.len();
        Ok(Self {
            table_name: table_name.to_string(),
            reader: BufReader::new(file),
            row_size,
            offset: 0,
            end,
            done: row_size == 0,
        })
    }

    fn try_next_frame(&mut self) -> DbResult<Option<(u64, Vec<u8>)>> {
        if self.done || self.offset >= self.end {
            return Ok(None);
        }

        let remaining = self.end - self.offset;
        if remaining < self.row_size as u64 {
            self.done = true;
            return Err(DbError::CorruptRead {
                table: self.table_name.clone(),
                offset: self.offset,
                expected: self.row_size,
                actual: remaining as usize,
            });
        }

        let mut frame = vec![0u8; self.row_size];
        if let Err(e) = self.reader.read_exact(&mut frame) {
            self.done = true;
            return Err(DbError::Io(e));
        }

        let offset = self.offset;
        self.offset += self.row_size as u64;
        Ok(Some((offset, frame)))
    }
}

impl Iterator for TableScanner {
    type Item = DbResult<(u64, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.try_next_frame().transpose()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::storage::TableStore;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_scan_in_append_order() -> Result<()> {
        let dir = tempdir()?;
        let store = TableStore::new(dir.path(), false)?;
        for frame in [b"one_", b"two_", b"thr_"] {
            store.append("t", frame)?;
        }

        let frames = store.scan("t", 4)?.collect::<Result<Vec<_>, _>>()?;
        assert_eq!(
            frames,
            vec![
                (0, b"one_".to_vec()),
                (4, b"two_".to_vec()),
                (8, b"thr_".to_vec()),
            ]
        );

        Ok(())
    }

    #[test]
    fn test_scan_truncated_tail() -> Result<()> {
        let dir = tempdir()?;
        let store = TableStore::new(dir.path(), false)?;
        store.append("t", b"abcdef")?;

        let mut scanner = store.scan("t", 4)?;
        assert_eq!(scanner.next().transpose()?, Some((0, b"abcd".to_vec())));
        assert!(matches!(
            scanner.next(),
            Some(Err(DbError::CorruptRead {
                offset: 4,
                actual: 2,
                ..
            }))
        ));
        assert!(scanner.next().is_none());

        Ok(())
    }

    #[test]
    fn test_scan_ignores_later_appends() -> Result<()> {
        let dir = tempdir()?;
        let store = TableStore::new(dir.path(), false)?;
        store.append("t", b"ab")?;

        let scanner = store.scan("t", 2)?;
        store.append("t", b"cd")?;

        assert_eq!(scanner.count(), 1);
        Ok(())
    }
}
