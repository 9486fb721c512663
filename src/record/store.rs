use std::collections::HashMap;
use std::io::Write;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::types::{Record, RecordId};

/// Errors from serializing the store.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode records: {0}")]
    Json(#[from] serde_json::Error),
}

/// The canonical, ordered collection of records.
///
/// Insertion order is the layout order when no filter is active. Records are
/// only ever edited in place; the store as a whole is replaced by a new
/// generation.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    positions: HashMap<RecordId, usize>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Append a record. Returns false (and keeps the store unchanged) when
    /// the id is already present.
    pub fn push(&mut self, record: Record) -> bool {
        let id = record.id();
        if self.positions.contains_key(&id) {
            return false;
        }
        self.positions.insert(id, self.records.len());
        self.records.push(record);
        true
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.positions.get(&id).map(|&pos| &self.records[pos])
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.positions.get(&id).map(|&pos| &mut self.records[pos])
    }

    /// Record at a store position.
    pub fn get_at(&self, position: usize) -> Option<&Record> {
        self.records.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// All ids in store order.
    pub fn ids(&self) -> Vec<RecordId> {
        self.records.iter().map(Record::id).collect()
    }

    /// Write the whole store as pretty JSON keyed by record id.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        let mut writer = std::io::BufWriter::new(writer);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Encode the whole store into a byte buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ExportError> {
        let mut bytes = Vec::new();
        self.write_json(&mut bytes)?;
        Ok(bytes)
    }
}

impl Serialize for RecordStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for record in &self.records {
            map.serialize_entry(&record.id(), record)?;
        }
        map.end()
    }
}
