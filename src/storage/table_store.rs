use crate::error::{DbError, DbResult};
use crate::storage::scan::TableScanner;
use log::debug;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// File extension of table storage files.
pub const TABLE_FILE_EXTENSION: &str = "db";

/// Append-only storage for all tables under one data directory.
pub struct TableStore {
    data_dir: PathBuf,
    sync_on_append: bool,
}

impl TableStore {
    pub fn new(data_dir: &Path, sync_on_append: bool) -> DbResult<Self> {
        fs::create_dir_all(data_dir)?;
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            sync_on_append,
        })
    }

    pub fn table_path(&self, table_name: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", table_name, TABLE_FILE_EXTENSION))
    }

    /// Materialize an empty storage file for a newly created table.
    pub fn create(&self, table_name: &str) -> DbResult<()> {
        let path = self.table_path(table_name);
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        debug!("Created table file {:?}", path);
        Ok(())
    }

    pub fn exists(&self, table_name: &str) -> bool {
        self.table_path(table_name).is_file()
    }

    /// Current size of the table file in bytes.
    pub fn len(&self, table_name: &str) -> DbResult<u64> {
        let file = self.open_for_read(table_name)?;
        Ok(file.metadata()?.len())
    }

    /// Append `data` at the end of the table file and return the offset it
    /// was written at. The file is created if it does not exist.
    pub fn append(&self, table_name: &str, data: &[u8]) -> DbResult<u64> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(self.table_path(table_name))?;

        let offset = file.metadata()?.len();
        file.write_all(data)?;
        if self.sync_on_append {
            file.sync_all()?;
        }

        debug!(
            "Appended {} bytes to '{}' at offset {}",
            data.len(),
            table_name,
            offset
        );
        Ok(offset)
    }

    /// Read exactly `length` bytes starting at `offset`.
    pub fn read_at(&self, table_name: &str, offset: u64, length: usize) -> DbResult<Vec<u8>> {
        let mut file = self.open_for_read(table_name)?;
        file.seek(SeekFrom::Start(offset))?;

        let mut buf = Vec::with_capacity(length);
        file.take(length as u64).read_to_end(&mut buf)?;

        if buf.len() < length {
            return Err(DbError::CorruptRead {
                table: table_name.to_string(),
                offset,
                expected: length,
                actual: buf.len(),
            });
        }

        Ok(buf)
    }

    /// Sequentially scan the table in frames of `row_size` bytes.
    pub fn scan(&self, table_name: &str, row_size: usize) -> DbResult<TableScanner> {
        let file = self.open_for_read(table_name)?;
        TableScanner::new(table_name, file, row_size)
    }

    fn open_for_read(&self, table_name: &str) -> DbResult<File> {
        File::open(self.table_path(table_name)).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DbError::TableNotFound(table_name.to_string()),
            _ => DbError::Io(e),
        })
    }
}
