//! Collection metadata touched by summaries and extent discovery

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::JsonSchema;

/// Collection metadata
///
/// Only `extent` and `summaries` are interpreted; every other member of the
/// collection document is carried through `extra` untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectionMetadata {
    pub id: String,
    #[serde(default)]
    pub extent: Extent,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub summaries: BTreeMap<String, JsonSchema>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CollectionMetadata {
    /// Empty metadata for a collection id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// STAC collection extent
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Extent {
    #[serde(default)]
    pub spatial: SpatialExtent,
    #[serde(default)]
    pub temporal: TemporalExtent,
}

/// Spatial extent; index 0 covers the whole collection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpatialExtent {
    #[serde(default)]
    pub bbox: Vec<Vec<f64>>,
}

/// Temporal extent; index 0 covers the whole collection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemporalExtent {
    #[serde(default)]
    pub interval: Vec<[Option<String>; 2]>,
}

impl Extent {
    /// Replace the overall (first) bounding box, keeping sub-extents
    pub fn set_overall_bbox(&mut self, bbox: Vec<f64>) {
        match self.spatial.bbox.first_mut() {
            Some(first) => *first = bbox,
            None => self.spatial.bbox.push(bbox),
        }
    }

    /// Replace the overall (first) interval, keeping sub-extents
    pub fn set_overall_interval(&mut self, interval: [Option<String>; 2]) {
        match self.temporal.interval.first_mut() {
            Some(first) => *first = interval,
            None => self.temporal.interval.push(interval),
        }
    }
}
