//! Queryables and summaries discovery
//!
//! A [`Discoverer`] reads item samples from a [`CatalogSource`] and derives:
//!
//! - **Queryables** - one [`QueryableRecord`] per property with a cast hint
//!   for filter predicates, plus a spatial `bbox` queryable
//! - **Summaries and extents** - per-property summaries and the overall
//!   bbox and interval of each collection
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use stac_discovery::catalog::{CatalogItem, MemoryCatalog};
//! use stac_discovery::discovery::Discoverer;
//!
//! let mut catalog = MemoryCatalog::new();
//! catalog.add_collection("sentinel-2");
//! for (i, cloud_cover) in [10, 55, 80].into_iter().enumerate() {
//!     catalog.add_item(
//!         "sentinel-2",
//!         CatalogItem::new(format!("item-{i}"), json!({"eo:cloud_cover": cloud_cover})),
//!     );
//! }
//!
//! let records = Discoverer::new(&catalog)
//!     .discover_queryables("sentinel-2", 100.0, false)
//!     .unwrap();
//! assert_eq!(records[0].name, "eo:cloud_cover");
//! assert_eq!(
//!     records[0].definition.to_value(),
//!     json!({"type": "number", "minimum": 10, "maximum": 80})
//! );
//! ```

pub mod config;
pub mod error;
pub mod extent;
pub mod queryables;
pub mod refresh;
pub mod summaries;

mod scan;

pub use config::{ConfigError, DiscoveryConfig, DiscoveryConfigBuilder};
pub use error::{DiscoveryError, DiscoveryResult};
pub use extent::{BBOX_QUERYABLE, BboxAccumulator, DateAccumulator};
pub use queryables::{CastHint, PropertyClass, QueryableRecord};
pub use refresh::{RefreshReport, update_queryables, update_summaries_and_extents};
pub use summaries::{CollectionSummary, DiscoveredExtent};

use crate::catalog::CatalogSource;

/// Runs discovery against a catalog source
pub struct Discoverer<'a, S: CatalogSource + ?Sized> {
    source: &'a S,
    config: DiscoveryConfig,
}

impl<'a, S: CatalogSource + ?Sized> Discoverer<'a, S> {
    /// Create a discoverer with default configuration
    pub fn new(source: &'a S) -> Self {
        Self::with_config(source, DiscoveryConfig::default())
    }

    /// Create a discoverer with custom configuration
    pub fn with_config(source: &'a S, config: DiscoveryConfig) -> Self {
        Self { source, config }
    }

    /// Get the configuration
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }
}
