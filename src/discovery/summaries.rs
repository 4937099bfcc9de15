//! Collection summaries and extents

use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};
use uuid::Uuid;

use super::Discoverer;
use super::error::{DiscoveryError, DiscoveryResult};
use super::extent::{BboxAccumulator, DateAccumulator};
use super::scan::PropertyScan;
use crate::catalog::{CatalogSource, CollectionMetadata};
use crate::schema::{JsonSchema, clean};

const FULL_SCAN: f64 = 100.0;

/// Keys bounding the start of the temporal extent
const START_KEYS: &[&str] = &["datetime", "start_datetime"];
/// Keys bounding the end of the temporal extent
const END_KEYS: &[&str] = &["datetime", "end_datetime"];

/// Overall spatial and temporal bounds of a collection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredExtent {
    /// 4 or 6 numbers, `None` when no item carried a bbox
    pub bbox: Option<Vec<f64>>,
    /// Earliest start and latest end, each `None` when unknown
    pub interval: [Option<String>; 2],
}

/// Summaries and extent discovered for one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub collection_id: String,
    pub summaries: BTreeMap<String, JsonSchema>,
    pub extent: DiscoveredExtent,
}

impl CollectionSummary {
    /// Write the discovered values into collection metadata
    ///
    /// Only the first bbox and interval are replaced; further sub-extents
    /// are left as they are. Summaries are replaced wholesale.
    pub fn apply_to(&self, collection: &mut CollectionMetadata) {
        if let Some(bbox) = &self.extent.bbox {
            collection.extent.set_overall_bbox(bbox.clone());
        }
        collection
            .extent
            .set_overall_interval(self.extent.interval.clone());
        collection.summaries = self.summaries.clone();
    }
}

impl<S: CatalogSource + ?Sized> Discoverer<'_, S> {
    /// Discover summaries and extent for one collection from a full scan
    pub fn discover_summaries_and_extents(
        &self,
        collection_id: &str,
    ) -> DiscoveryResult<CollectionSummary> {
        let run_id = Uuid::new_v4();
        let _span = info_span!(
            "summaries_discovery",
            run_id = %run_id,
            collection = %collection_id
        )
        .entered();

        if !self.source.collection_exists(collection_id)? {
            return Err(DiscoveryError::CollectionNotFound(collection_id.to_string()));
        }

        let mut scan = PropertyScan::new(&self.config);
        let mut start = DateAccumulator::new();
        let mut end = DateAccumulator::new();
        for properties in self.source.sample_item_properties(collection_id, FULL_SCAN)? {
            for value in START_KEYS.iter().filter_map(|key| properties.get(*key)) {
                start.observe(value);
            }
            for value in END_KEYS.iter().filter_map(|key| properties.get(*key)) {
                end.observe(value);
            }
            scan.observe(&properties);
        }
        let items = scan.items_observed();

        let mut bboxes = BboxAccumulator::new();
        for bbox in self.source.fetch_bboxes(collection_id, FULL_SCAN)? {
            if !bboxes.observe(&bbox) {
                warn!(len = bbox.len(), "Skipping malformed bbox");
            }
        }

        let summaries: BTreeMap<String, JsonSchema> = scan
            .finish()
            .iter()
            .map(|(name, descriptor)| (name.clone(), clean(descriptor)))
            .collect();

        let extent = DiscoveredExtent {
            bbox: bboxes.bbox(),
            interval: [
                start.minimum().map(str::to_string),
                end.maximum().map(str::to_string),
            ],
        };

        info!(
            items,
            bboxes = bboxes.count(),
            summaries = summaries.len(),
            "Discovered summaries and extent"
        );

        Ok(CollectionSummary {
            collection_id: collection_id.to_string(),
            summaries,
            extent,
        })
    }

    /// Discover summaries and extents for every collection
    ///
    /// Collections removed while the run is in progress are skipped.
    pub fn discover_all_summaries_and_extents(&self) -> DiscoveryResult<Vec<CollectionSummary>> {
        let ids = self.source.collection_ids()?;

        #[cfg(feature = "parallel")]
        let results: Vec<_> = ids
            .par_iter()
            .map(|id| (id, self.discover_summaries_and_extents(id)))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let results: Vec<_> = ids
            .iter()
            .map(|id| (id, self.discover_summaries_and_extents(id)))
            .collect();

        let mut summaries = Vec::with_capacity(results.len());
        for (id, result) in results {
            match result {
                Ok(summary) => summaries.push(summary),
                Err(e) if e.is_not_found() => {
                    warn!(collection = %id, "Collection disappeared during discovery, skipping");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Extent, SpatialExtent, TemporalExtent};
    use serde_json::json;

    fn summary(bbox: Option<Vec<f64>>) -> CollectionSummary {
        CollectionSummary {
            collection_id: "c".to_string(),
            summaries: BTreeMap::from([(
                "platform".to_string(),
                JsonSchema {
                    enum_values: Some(vec![json!("sat-a")]),
                    ..JsonSchema::typed("string")
                },
            )]),
            extent: DiscoveredExtent {
                bbox,
                interval: [Some("2020-01-01T00:00:00Z".to_string()), None],
            },
        }
    }

    #[test]
    fn test_apply_to_rewrites_first_entries_only() {
        let mut collection = CollectionMetadata {
            extent: Extent {
                spatial: SpatialExtent {
                    bbox: vec![vec![0.0, 0.0, 1.0, 1.0], vec![0.5, 0.5, 0.6, 0.6]],
                },
                temporal: TemporalExtent {
                    interval: vec![[None, None], [None, Some("2019-01-01T00:00:00Z".into())]],
                },
            },
            summaries: BTreeMap::from([("stale".to_string(), JsonSchema::typed("string"))]),
            ..CollectionMetadata::new("c")
        };

        summary(Some(vec![-1.0, -1.0, 2.0, 2.0])).apply_to(&mut collection);

        assert_eq!(collection.extent.spatial.bbox[0], vec![-1.0, -1.0, 2.0, 2.0]);
        assert_eq!(collection.extent.spatial.bbox[1], vec![0.5, 0.5, 0.6, 0.6]);
        assert_eq!(
            collection.extent.temporal.interval[0],
            [Some("2020-01-01T00:00:00Z".to_string()), None]
        );
        assert_eq!(
            collection.extent.temporal.interval[1],
            [None, Some("2019-01-01T00:00:00Z".to_string())]
        );
        assert!(!collection.summaries.contains_key("stale"));
        assert!(collection.summaries.contains_key("platform"));
    }

    #[test]
    fn test_apply_to_without_boxes_keeps_spatial() {
        let mut collection = CollectionMetadata::new("c");
        collection.extent.spatial.bbox = vec![vec![0.0, 0.0, 1.0, 1.0]];
        summary(None).apply_to(&mut collection);
        assert_eq!(collection.extent.spatial.bbox, vec![vec![0.0, 0.0, 1.0, 1.0]]);
        assert_eq!(collection.extent.temporal.interval.len(), 1);
    }
}
