//! In-memory queryables store

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::warn;

use super::{QueryablesStore, StoreError, check_scope};
use crate::discovery::QueryableRecord;

type RecordKey = (BTreeSet<String>, String);

/// Queryables store held in memory, optionally saved as JSON
#[derive(Debug, Clone, Default)]
pub struct MemoryQueryablesStore {
    records: BTreeMap<RecordKey, QueryableRecord>,
}

impl MemoryQueryablesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load records from an older store
    ///
    /// Unlike [`QueryablesStore::upsert`], duplicate keys in the input are
    /// reported; the last occurrence is kept.
    pub fn migrate(records: impl IntoIterator<Item = QueryableRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            if let Some(previous) = store.records.insert(record.key(), record) {
                warn!(
                    name = %previous.name,
                    collections = ?previous.collection_ids,
                    "Duplicate queryable during migration, keeping the last one"
                );
            }
        }
        store
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Parse a JSON array of records, migrating duplicates
    pub fn from_json_str(content: &str) -> Result<Self, StoreError> {
        let records: Vec<QueryableRecord> = serde_json::from_str(content)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        Ok(Self::migrate(records))
    }

    /// Render all records as a JSON array
    pub fn to_json_string(&self) -> Result<String, StoreError> {
        let records: Vec<&QueryableRecord> = self.records.values().collect();
        serde_json::to_string_pretty(&records)
            .map_err(|e| StoreError::SerializationError(e.to_string()))
    }

    /// Load records from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            StoreError::IoError(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::from_json_str(&content)
    }

    /// Save records to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let content = self.to_json_string()?;
        std::fs::write(path.as_ref(), content).map_err(|e| {
            StoreError::IoError(format!("{}: {e}", path.as_ref().display()))
        })
    }
}

impl QueryablesStore for MemoryQueryablesStore {
    fn upsert(&mut self, records: Vec<QueryableRecord>) -> Result<(), StoreError> {
        for record in records {
            self.records.insert(record.key(), record);
        }
        Ok(())
    }

    fn records(&self) -> Result<Vec<QueryableRecord>, StoreError> {
        Ok(self.records.values().cloned().collect())
    }

    fn remove_collection(&mut self, collection_id: &str) -> Result<usize, StoreError> {
        let before = self.records.len();
        self.records.retain(|(ids, _), _| {
            !(ids.len() == 1 && ids.contains(collection_id))
        });
        Ok(before - self.records.len())
    }

    fn replace_collection(
        &mut self,
        collection_id: &str,
        records: Vec<QueryableRecord>,
    ) -> Result<usize, StoreError> {
        check_scope(collection_id, &records)?;
        let removed = self.remove_collection(collection_id)?;
        self.upsert(records)?;
        Ok(removed)
    }
}
