//! In-memory catalog

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::{
    Bbox, CatalogError, CatalogSource, CollectionMetadata, CollectionMetadataStore, PropertyBag,
};

/// Item as stored in a [`MemoryCatalog`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Bbox>,
    #[serde(default)]
    pub properties: PropertyBag,
}

impl CatalogItem {
    /// Item with the given properties; a non-object value gives no properties
    pub fn new(id: impl Into<String>, properties: Value) -> Self {
        let properties = match properties {
            Value::Object(map) => map,
            _ => PropertyBag::new(),
        };
        Self {
            id: id.into(),
            bbox: None,
            properties,
        }
    }

    /// Set the stored bounding box
    pub fn with_bbox(mut self, bbox: impl Into<Bbox>) -> Self {
        self.bbox = Some(bbox.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
struct MemoryCollection {
    metadata: CollectionMetadata,
    items: Vec<CatalogItem>,
}

/// Catalog held in memory
///
/// Sampling is deterministic: an item is part of a `p` percent sample when
/// the first 8 bytes of the SHA-256 of its id, modulo 10 000, fall below
/// `p * 100`. Row estimates are exact item counts.
#[derive(Debug, Clone)]
pub struct MemoryCatalog {
    collections: BTreeMap<String, MemoryCollection>,
    row_estimates: bool,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self {
            collections: BTreeMap::new(),
            row_estimates: true,
        }
    }
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report no row estimates, as a store without statistics would
    pub fn without_row_estimates(mut self) -> Self {
        self.row_estimates = false;
        self
    }

    /// Add an empty collection; an existing one is left as is
    pub fn add_collection(&mut self, collection_id: &str) -> &mut Self {
        self.collections
            .entry(collection_id.to_string())
            .or_insert_with(|| MemoryCollection {
                metadata: CollectionMetadata::new(collection_id),
                items: Vec::new(),
            });
        self
    }

    /// Add an item, creating the collection when needed
    pub fn add_item(&mut self, collection_id: &str, item: CatalogItem) -> &mut Self {
        self.add_collection(collection_id);
        if let Some(collection) = self.collections.get_mut(collection_id) {
            collection.items.push(item);
        }
        self
    }

    /// Remove a collection and its items
    pub fn remove_collection(&mut self, collection_id: &str) -> bool {
        self.collections.remove(collection_id).is_some()
    }

    /// Items of a collection
    pub fn items(&self, collection_id: &str) -> Option<&[CatalogItem]> {
        self.collections
            .get(collection_id)
            .map(|c| c.items.as_slice())
    }

    fn stored_items(&self, collection_id: &str) -> Result<&[CatalogItem], CatalogError> {
        self.items(collection_id)
            .ok_or_else(|| CatalogError::CollectionNotFound(collection_id.to_string()))
    }
}

fn in_sample(item_id: &str, sampling_percent: f64) -> bool {
    if sampling_percent >= 100.0 {
        return true;
    }
    let digest = Sha256::digest(item_id.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let bucket = u64::from_be_bytes(prefix) % 10_000;
    (bucket as f64) < sampling_percent * 100.0
}

impl CatalogSource for MemoryCatalog {
    fn collection_ids(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self.collections.keys().cloned().collect())
    }

    fn collection_exists(&self, collection_id: &str) -> Result<bool, CatalogError> {
        Ok(self.collections.contains_key(collection_id))
    }

    fn estimate_row_count(&self, collection_id: &str) -> Result<Option<u64>, CatalogError> {
        let items = self.stored_items(collection_id)?;
        Ok(self.row_estimates.then_some(items.len() as u64))
    }

    fn sample_item_properties<'a>(
        &'a self,
        collection_id: &str,
        sampling_percent: f64,
    ) -> Result<Box<dyn Iterator<Item = PropertyBag> + 'a>, CatalogError> {
        let items = self.stored_items(collection_id)?;
        Ok(Box::new(
            items
                .iter()
                .filter(move |item| in_sample(&item.id, sampling_percent))
                .map(|item| item.properties.clone()),
        ))
    }

    fn fetch_bboxes<'a>(
        &'a self,
        collection_id: &str,
        sampling_percent: f64,
    ) -> Result<Box<dyn Iterator<Item = Bbox> + 'a>, CatalogError> {
        let items = self.stored_items(collection_id)?;
        Ok(Box::new(
            items
                .iter()
                .filter(move |item| in_sample(&item.id, sampling_percent))
                .filter_map(|item| item.bbox.clone()),
        ))
    }
}

impl CollectionMetadataStore for MemoryCatalog {
    fn collection(&self, collection_id: &str) -> Result<Option<CollectionMetadata>, CatalogError> {
        Ok(self
            .collections
            .get(collection_id)
            .map(|c| c.metadata.clone()))
    }

    fn put_collection(&mut self, metadata: CollectionMetadata) -> Result<(), CatalogError> {
        let collection = self.collections.entry(metadata.id.clone()).or_default();
        collection.metadata = metadata;
        Ok(())
    }
}
