use crate::error::DbResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// In-memory value-to-offsets mapping for one indexed column.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EqualityIndex {
    entries: HashMap<String, Vec<u64>>,
}

impl EqualityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `offset` to the list for `value`.
    pub fn record(&mut self, value: &str, offset: u64) {
        self.entries.entry(value.to_string()).or_default().push(offset);
    }

    /// Offsets recorded for `value`, in insertion order.
    pub fn lookup(&self, value: &str) -> &[u64] {
        self.entries.get(value).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct values.
    pub fn distinct_values(&self) -> usize {
        self.entries.len()
    }

    /// Total number of recorded offsets.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn load(path: &Path) -> DbResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(reader)?)
    }

    pub fn save(&self, path: &Path) -> DbResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_record_and_lookup() {
        let mut index = EqualityIndex::new();
        index.record("a", 0);
        index.record("b", 30);
        index.record("a", 60);

        assert_eq!(index.lookup("a"), &[0, 60]);
        assert_eq!(index.lookup("b"), &[30]);
        assert!(index.lookup("c").is_empty());
        assert_eq!(index.distinct_values(), 2);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_snapshot_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("posts.user.index");

        let mut index = EqualityIndex::new();
        index.record("alice", 0);
        index.record("alice", 60);
        index.save(&path)?;

        let loaded = EqualityIndex::load(&path)?;
        assert_eq!(loaded, index);
        assert_eq!(loaded.lookup("alice"), &[0, 60]);

        Ok(())
    }
}
