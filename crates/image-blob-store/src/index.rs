//! Metadata index mirrored to a single JSON file
//!
//! The file holds one object keyed by filename. Records keep the order in
//! which they were inserted, both in memory and on disk, so ties on
//! `createdAt` always resolve the same way after a restart.

use crate::error::{ImageStoreError, Result};
use crate::types::ImageRecord;
use serde::de::{MapAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Deserializer, Serialize};
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// In-memory set of image records backed by an index file
#[derive(Debug, Clone)]
pub struct MetadataIndex {
    path: PathBuf,
    records: Vec<ImageRecord>,
}

impl MetadataIndex {
    /// Create an empty index that will persist to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    /// Load the index from `path`, starting empty if it is missing or unreadable
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let mut index = Self::new(path);

        match fs::read_to_string(&index.path).await {
            Ok(data) => match Self::parse(&data) {
                Ok(records) => {
                    for record in records {
                        index.insert(record);
                    }
                    debug!(path = ?index.path, records = index.len(), "Loaded metadata index");
                }
                Err(e) => {
                    warn!(path = ?index.path, error = %e, "Discarding unreadable metadata index");
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?index.path, "No metadata index yet, starting empty");
            }
            Err(e) => {
                warn!(path = ?index.path, error = %e, "Failed to read metadata index, starting empty");
            }
        }

        index
    }

    /// Parse the contents of an index file
    pub fn parse(data: &str) -> Result<Vec<ImageRecord>> {
        let entries: IndexEntries = serde_json::from_str(data)?;
        Ok(entries.0)
    }

    /// Render the full record set as index file contents
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&IndexEntriesRef(&self.records))
            .map_err(|e| ImageStoreError::IndexCorrupt(e.to_string()))
    }

    /// Overwrite the index file with the full record set
    pub async fn persist(&self) -> Result<()> {
        let json = self.to_json()?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!(path = ?self.path, records = self.len(), "Persisted metadata index");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Point every record at `dir`, dropping records whose filename is not
    /// a plain file name
    pub fn relocate(&mut self, dir: &Path) {
        self.records.retain_mut(|record| {
            if Path::new(&record.filename).file_name() != Some(OsStr::new(&record.filename)) {
                warn!(filename = %record.filename, "Dropping index entry with invalid filename");
                return false;
            }
            record.path = dir.join(&record.filename);
            true
        });
    }

    pub fn find_by_hash(&self, hash: &str) -> Option<&ImageRecord> {
        self.records.iter().find(|r| r.hash == hash)
    }

    pub fn contains_filename(&self, filename: &str) -> bool {
        self.records.iter().any(|r| r.filename == filename)
    }

    /// All records in insertion order
    pub fn all(&self) -> &[ImageRecord] {
        &self.records
    }

    /// Append a record, replacing any record with the same filename in place
    pub fn insert(&mut self, record: ImageRecord) {
        match self
            .records
            .iter_mut()
            .find(|r| r.filename == record.filename)
        {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    pub fn remove(&mut self, filename: &str) -> Option<ImageRecord> {
        let pos = self.records.iter().position(|r| r.filename == filename)?;
        Some(self.records.remove(pos))
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn total_size(&self) -> u64 {
        self.records.iter().map(|r| r.size).sum()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

struct IndexEntriesRef<'a>(&'a [ImageRecord]);

impl Serialize for IndexEntriesRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|r| (&r.filename, r)))
    }
}

struct IndexEntries(Vec<ImageRecord>);

impl<'de> Deserialize<'de> for IndexEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = IndexEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping filenames to image records")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut records = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((_filename, record)) = map.next_entry::<String, ImageRecord>()? {
                    records.push(record);
                }
                Ok(IndexEntries(records))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
