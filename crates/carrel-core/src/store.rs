//! Flat two-column attribute store
//!
//! One CSV file per record, columns `attribute name` / `attribute data`.
//! Writes are full replacements; reads return rows in file order so the
//! relation rows keep their original append order.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Header of the name column.
pub const COL_NAME: &str = "attribute name";

/// Header of the data column.
pub const COL_DATA: &str = "attribute data";

/// One row of the attribute store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrRow {
    #[serde(rename = "attribute name")]
    pub name: String,
    #[serde(rename = "attribute data")]
    pub value: String,
}

impl AttrRow {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A record's private attribute store location.
#[derive(Debug, Clone)]
pub struct AttributeStore {
    path: PathBuf,
}

impl AttributeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty store (header only) if none exists yet.
    pub fn ensure_exists(&self) -> Result<(), RecordError> {
        if !self.path.exists() {
            self.write_rows(&[])?;
        }
        Ok(())
    }

    /// Full-replace write of the record's rows.
    pub fn write_rows(&self, rows: &[AttrRow]) -> Result<(), RecordError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;
        writer.write_record([COL_NAME, COL_DATA])?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read every row, in file order.
    pub fn read_rows(&self) -> Result<Vec<AttrRow>, RecordError> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let rows = reader
            .deserialize()
            .collect::<Result<Vec<AttrRow>, csv::Error>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_round_trip_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttributeStore::new(dir.path().join("1.csv"));
        let rows = vec![
            AttrRow::new("paper_id", "1"),
            AttrRow::new("relations", "2_cites_first"),
            AttrRow::new("relations", "3_cites_second"),
            AttrRow::new("title", "A Paper"),
        ];
        store.write_rows(&rows).unwrap();
        assert_eq!(store.read_rows().unwrap(), rows);
    }

    #[test]
    fn write_is_full_replace() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttributeStore::new(dir.path().join("1.csv"));
        store.write_rows(&[AttrRow::new("title", "Old")]).unwrap();
        store.write_rows(&[AttrRow::new("title", "New")]).unwrap();
        assert_eq!(store.read_rows().unwrap(), vec![AttrRow::new("title", "New")]);
    }

    #[test]
    fn empty_store_reads_back_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttributeStore::new(dir.path().join("1.csv"));
        store.ensure_exists().unwrap();
        assert!(store.read_rows().unwrap().is_empty());
    }

    #[test]
    fn values_with_embedded_newlines_survive() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttributeStore::new(dir.path().join("1.csv"));
        let bibtex = "@misc{k,\n  note = {x},\n}";
        store.write_rows(&[AttrRow::new("bibtex", bibtex)]).unwrap();
        assert_eq!(store.read_rows().unwrap()[0].value, bibtex);
    }
}
