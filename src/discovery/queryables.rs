//! Queryables discovery
//!
//! Samples a collection's items, folds each property into a descriptor and
//! emits one [`QueryableRecord`] per property, plus the spatial `bbox`
//! queryable from stored item bounding boxes.

use std::collections::BTreeSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use super::Discoverer;
use super::error::{DiscoveryError, DiscoveryResult};
use super::extent::{BBOX_QUERYABLE, BboxAccumulator};
use super::scan::PropertyScan;
use crate::catalog::CatalogSource;
use crate::schema::{Descriptor, JsonSchema, clean};

/// How a property is cast when used in filter predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastHint {
    ToFloat,
    ToTextArray,
    ToText,
}

impl CastHint {
    /// Cast hint for a published definition; objects get none
    pub fn for_schema(schema: &JsonSchema) -> Option<CastHint> {
        match schema.schema_type.as_deref() {
            Some("number") | Some("integer") => Some(CastHint::ToFloat),
            Some("array") => Some(CastHint::ToTextArray),
            Some("object") => None,
            _ => Some(CastHint::ToText),
        }
    }

    /// SQL wrapper function name
    pub fn wrapper(&self) -> &'static str {
        match self {
            CastHint::ToFloat => "to_float",
            CastHint::ToTextArray => "to_text_array",
            CastHint::ToText => "to_text",
        }
    }
}

/// Shape of a discovered property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyClass {
    /// Finite set of scalar values
    Enum,
    /// Numeric or date-time bounds
    Range,
    Object,
    Array,
    /// Values of several types or shapes
    Mixed,
}

impl PropertyClass {
    /// Classify a folded descriptor
    pub fn of(descriptor: &Descriptor) -> Self {
        match descriptor {
            Descriptor::Enum { .. } => PropertyClass::Enum,
            Descriptor::NumberRange { .. } | Descriptor::DateRange(_) => PropertyClass::Range,
            Descriptor::Object { .. } => PropertyClass::Object,
            Descriptor::Array { .. } => PropertyClass::Array,
            Descriptor::AnyOf { .. } => PropertyClass::Mixed,
        }
    }
}

/// One row of the queryables catalog
///
/// Unique by `(collection_ids, name)`; empty `collection_ids` applies to
/// every collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryableRecord {
    pub collection_ids: BTreeSet<String>,
    pub name: String,
    pub definition: JsonSchema,
    pub cast_hint: Option<CastHint>,
}

impl QueryableRecord {
    /// Record scoped to one collection, cast hint derived from the definition
    pub fn for_collection(
        collection_id: impl Into<String>,
        name: impl Into<String>,
        definition: JsonSchema,
    ) -> Self {
        let cast_hint = CastHint::for_schema(&definition);
        Self {
            collection_ids: BTreeSet::from([collection_id.into()]),
            name: name.into(),
            definition,
            cast_hint,
        }
    }

    /// Record applying to every collection
    pub fn global(name: impl Into<String>, definition: JsonSchema) -> Self {
        let cast_hint = CastHint::for_schema(&definition);
        Self {
            collection_ids: BTreeSet::new(),
            name: name.into(),
            definition,
            cast_hint,
        }
    }

    /// Unique key
    pub fn key(&self) -> (BTreeSet<String>, String) {
        (self.collection_ids.clone(), self.name.clone())
    }

    /// Whether the record applies to any of `collection_ids`
    pub fn applies_to(&self, collection_ids: &BTreeSet<String>) -> bool {
        self.collection_ids.is_empty()
            || collection_ids.is_empty()
            || !self.collection_ids.is_disjoint(collection_ids)
    }
}

impl<S: CatalogSource + ?Sized> Discoverer<'_, S> {
    /// Discover queryables for one collection
    pub fn discover_queryables(
        &self,
        collection_id: &str,
        sampling_percent: f64,
        minimal: bool,
    ) -> DiscoveryResult<Vec<QueryableRecord>> {
        let run_id = Uuid::new_v4();
        let _span = info_span!(
            "queryables_discovery",
            run_id = %run_id,
            collection = %collection_id,
            minimal
        )
        .entered();

        if !self.source.collection_exists(collection_id)? {
            return Err(DiscoveryError::CollectionNotFound(collection_id.to_string()));
        }

        let percent = self.effective_sampling_percent(collection_id, sampling_percent)?;

        let mut scan = PropertyScan::new(&self.config);
        for properties in self.source.sample_item_properties(collection_id, percent)? {
            scan.observe(&properties);
        }
        let items = scan.items_observed();

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (name, descriptor) in scan.finish() {
            let class = PropertyClass::of(&descriptor);
            if minimal && descriptor.is_structured() {
                debug!(property = %name, class = ?class, "Skipping structured property");
                skipped += 1;
                continue;
            }
            if name == BBOX_QUERYABLE {
                continue;
            }
            debug!(property = %name, class = ?class, "Classified property");
            records.push(QueryableRecord::for_collection(
                collection_id,
                name,
                clean(&descriptor),
            ));
        }

        // bbox is array-typed, so minimal runs leave it out
        let mut bboxes = BboxAccumulator::new();
        if !minimal {
            for bbox in self.source.fetch_bboxes(collection_id, percent)? {
                if !bboxes.observe(&bbox) {
                    warn!(len = bbox.len(), "Skipping malformed bbox");
                }
            }
        }
        if let Some(definition) = bboxes.queryable_schema() {
            records.push(QueryableRecord::for_collection(
                collection_id,
                BBOX_QUERYABLE,
                definition,
            ));
        }

        info!(
            items,
            bboxes = bboxes.count(),
            queryables = records.len(),
            skipped,
            sampling_percent = percent,
            "Discovered queryables"
        );
        Ok(records)
    }

    /// Discover queryables for one collection using the configured
    /// sampling percentage and minimal mode
    pub fn discover_configured_queryables(
        &self,
        collection_id: &str,
    ) -> DiscoveryResult<Vec<QueryableRecord>> {
        self.discover_queryables(
            collection_id,
            self.config.sampling_percent,
            self.config.minimal,
        )
    }

    /// [`Self::discover_all_queryables`] with the configured sampling
    /// percentage and minimal mode
    pub fn discover_all_configured_queryables(&self) -> DiscoveryResult<Vec<QueryableRecord>> {
        self.discover_all_queryables(self.config.sampling_percent, self.config.minimal)
    }

    /// Discover queryables for every collection
    ///
    /// Collections removed while the run is in progress are skipped.
    pub fn discover_all_queryables(
        &self,
        sampling_percent: f64,
        minimal: bool,
    ) -> DiscoveryResult<Vec<QueryableRecord>> {
        let ids = self.source.collection_ids()?;

        #[cfg(feature = "parallel")]
        let results: Vec<_> = ids
            .par_iter()
            .map(|id| (id, self.discover_queryables(id, sampling_percent, minimal)))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let results: Vec<_> = ids
            .iter()
            .map(|id| (id, self.discover_queryables(id, sampling_percent, minimal)))
            .collect();

        let mut records = Vec::new();
        for (id, result) in results {
            match result {
                Ok(found) => records.extend(found),
                Err(e) if e.is_not_found() => {
                    warn!(collection = %id, "Collection disappeared during discovery, skipping");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }

    /// Sampling percentage actually used for a collection
    ///
    /// Falls back to a full scan when the expected sample is below
    /// `min_sample_rows` or no row estimate is available.
    pub fn effective_sampling_percent(
        &self,
        collection_id: &str,
        requested: f64,
    ) -> DiscoveryResult<f64> {
        let requested = requested.clamp(f64::MIN_POSITIVE, 100.0);
        let estimate = match self.source.estimate_row_count(collection_id) {
            Ok(estimate) => estimate,
            Err(e) => match DiscoveryError::from(e) {
                not_found @ DiscoveryError::CollectionNotFound(_) => return Err(not_found),
                other => {
                    warn!(error = %other, "Row estimate failed, scanning all items");
                    None
                }
            },
        };

        match estimate {
            Some(rows) if rows as f64 * requested / 100.0 >= self.config.min_sample_rows as f64 => {
                Ok(requested)
            }
            Some(rows) => {
                debug!(
                    rows,
                    requested,
                    min_sample_rows = self.config.min_sample_rows,
                    "Sample too small, scanning all items"
                );
                Ok(100.0)
            }
            None => {
                debug!("No row estimate, scanning all items");
                Ok(100.0)
            }
        }
    }
}
