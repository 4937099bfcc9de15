//! Queryables store abstraction
//!
//! Discovered [`QueryableRecord`]s are persisted through the
//! [`QueryablesStore`] trait and published as one JSON Schema document by
//! [`get_queryables_schema`].

use crate::discovery::QueryableRecord;

mod memory;
mod reader;

pub use memory::MemoryQueryablesStore;
pub use reader::{
    QUERYABLES_SCHEMA_DIALECT, QUERYABLES_SCHEMA_ID, QUERYABLES_TITLE, get_queryables_schema,
};

/// Error type for queryables store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Store backend error: {0}")]
    BackendError(String),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Persistence for queryable records
///
/// Records are keyed by `(collection_ids, name)`; writes overwrite.
pub trait QueryablesStore {
    /// Insert or overwrite records
    fn upsert(&mut self, records: Vec<QueryableRecord>) -> Result<(), StoreError>;

    /// All stored records
    fn records(&self) -> Result<Vec<QueryableRecord>, StoreError>;

    /// Drop every record scoped to exactly this collection
    fn remove_collection(&mut self, collection_id: &str) -> Result<usize, StoreError>;

    /// Swap the records scoped to exactly this collection for `records`
    ///
    /// Either every old record is replaced or the store is left untouched.
    /// Each new record must be scoped to `collection_id` alone. Returns the
    /// number of records removed.
    fn replace_collection(
        &mut self,
        collection_id: &str,
        records: Vec<QueryableRecord>,
    ) -> Result<usize, StoreError>;
}

/// Reject records not scoped to exactly `collection_id`
pub(crate) fn check_scope(
    collection_id: &str,
    records: &[QueryableRecord],
) -> Result<(), StoreError> {
    match records
        .iter()
        .find(|r| r.collection_ids.len() != 1 || !r.collection_ids.contains(collection_id))
    {
        Some(stray) => Err(StoreError::InvalidRecord(format!(
            "queryable {} is scoped to {:?}, not {collection_id}",
            stray.name, stray.collection_ids
        ))),
        None => Ok(()),
    }
}
