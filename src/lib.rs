//! STAC Discovery - schema inference for STAC catalogs
//!
//! Provides:
//! - Per-property JSON Schema inference from sampled item properties
//! - Queryables discovery with cast hints and a spatial `bbox` queryable
//! - Collection summaries and spatial/temporal extents
//! - Queryables persistence and the published queryables document
//!
//! The catalog storage engine is abstracted behind [`CatalogSource`] and
//! [`CollectionMetadataStore`]; [`MemoryCatalog`] keeps everything in memory.

pub mod catalog;
pub mod discovery;
pub mod schema;
pub mod store;

// Re-export commonly used types
pub use catalog::{
    CatalogError, CatalogItem, CatalogSource, CollectionMetadata, CollectionMetadataStore,
    MemoryCatalog,
};
pub use discovery::{
    CastHint, CollectionSummary, DiscoveredExtent, Discoverer, DiscoveryConfig, DiscoveryError,
    DiscoveryResult, QueryableRecord, RefreshReport, update_queryables,
    update_summaries_and_extents,
};
pub use schema::{Descriptor, JsonSchema, aggregate, clean, construct_unit, merge};
pub use store::{MemoryQueryablesStore, QueryablesStore, StoreError, get_queryables_schema};
