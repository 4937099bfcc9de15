//! Catalog store abstraction
//!
//! Discovery only needs a narrow view of the catalog: a sample of item
//! property bags, stored item bounding boxes and a row estimate per
//! collection, plus read/write access to collection metadata. The storage
//! engine behind these traits is not part of this crate; [`MemoryCatalog`]
//! is an in-memory implementation.

use serde_json::{Map, Value};

mod collection;
mod memory;

pub use collection::{CollectionMetadata, Extent, SpatialExtent, TemporalExtent};
pub use memory::{CatalogItem, MemoryCatalog};

/// Properties of one item
pub type PropertyBag = Map<String, Value>;

/// Stored bounding box of one item (4 or 6 numbers)
pub type Bbox = Vec<f64>;

/// Error type for catalog operations
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Catalog backend error: {0}")]
    BackendError(String),
}

/// Read access to items, as needed by discovery
///
/// Sampling is by percentage of rows; `100.0` means a full scan.
pub trait CatalogSource: Send + Sync {
    /// Ids of every collection in the catalog
    fn collection_ids(&self) -> Result<Vec<String>, CatalogError>;

    /// Check whether a collection exists
    fn collection_exists(&self, collection_id: &str) -> Result<bool, CatalogError>;

    /// Approximate item count, `None` when no estimate is available
    fn estimate_row_count(&self, collection_id: &str) -> Result<Option<u64>, CatalogError>;

    /// Property bags of a sample of the collection's items
    fn sample_item_properties<'a>(
        &'a self,
        collection_id: &str,
        sampling_percent: f64,
    ) -> Result<Box<dyn Iterator<Item = PropertyBag> + 'a>, CatalogError>;

    /// Stored bounding boxes of a sample of the collection's items
    fn fetch_bboxes<'a>(
        &'a self,
        collection_id: &str,
        sampling_percent: f64,
    ) -> Result<Box<dyn Iterator<Item = Bbox> + 'a>, CatalogError>;
}

/// Read/write access to collection metadata
pub trait CollectionMetadataStore {
    /// Load a collection's metadata
    fn collection(&self, collection_id: &str) -> Result<Option<CollectionMetadata>, CatalogError>;

    /// Replace a collection's metadata in one write
    fn put_collection(&mut self, metadata: CollectionMetadata) -> Result<(), CatalogError>;
}
