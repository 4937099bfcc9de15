//! Queryables discovery tests

use std::collections::BTreeSet;

use serde_json::{Value, json};
use stac_discovery::catalog::{
    Bbox, CatalogError, CatalogItem, CatalogSource, MemoryCatalog, PropertyBag,
};
use stac_discovery::discovery::{
    CastHint, Discoverer, DiscoveryConfig, DiscoveryError, QueryableRecord,
};

fn sentinel_catalog() -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new();
    let items = [
        json!({
            "datetime": "2020-01-01T00:00:00Z",
            "eo:cloud_cover": 10,
            "platform": "sat-a",
            "eo:bands": [{"name": "B01"}, {"name": "B02"}],
            "proj:centroid": {"lat": 45.1, "lon": 7.2},
            "mixed": 1
        }),
        json!({
            "datetime": "2021-06-01T00:00:00Z",
            "eo:cloud_cover": 55,
            "platform": "sat-b",
            "mixed": {"a": 1}
        }),
        json!({
            "datetime": "2020-07-15T12:00:00Z",
            "eo:cloud_cover": 80,
            "platform": "sat-a"
        }),
    ];
    for (i, properties) in items.into_iter().enumerate() {
        let offset = i as f64;
        catalog.add_item(
            "sentinel-2",
            CatalogItem::new(format!("S2-{i}"), properties)
                .with_bbox(vec![offset, 40.0 + offset, offset + 1.0, 41.0 + offset]),
        );
    }
    catalog
}

fn find<'a>(records: &'a [QueryableRecord], name: &str) -> &'a QueryableRecord {
    records
        .iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| panic!("Expected queryable {name}"))
}

fn names(records: &[QueryableRecord]) -> BTreeSet<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

#[test]
fn test_cloud_cover_becomes_number_range() -> anyhow::Result<()> {
    let catalog = sentinel_catalog();
    let records = Discoverer::new(&catalog).discover_queryables("sentinel-2", 100.0, false)?;

    let cloud_cover = find(&records, "eo:cloud_cover");
    assert_eq!(
        cloud_cover.definition.to_value(),
        json!({"type": "number", "minimum": 10, "maximum": 80})
    );
    assert_eq!(cloud_cover.cast_hint, Some(CastHint::ToFloat));
    assert_eq!(
        cloud_cover.collection_ids,
        BTreeSet::from(["sentinel-2".to_string()])
    );
    Ok(())
}

#[test]
fn test_platform_becomes_enum() -> anyhow::Result<()> {
    let catalog = sentinel_catalog();
    let records = Discoverer::new(&catalog).discover_queryables("sentinel-2", 100.0, false)?;

    let platform = find(&records, "platform");
    assert_eq!(
        platform.definition.to_value(),
        json!({"type": "string", "enum": ["sat-a", "sat-b"]})
    );
    assert_eq!(platform.cast_hint, Some(CastHint::ToText));
    Ok(())
}

#[test]
fn test_datetime_uses_epoch_range() -> anyhow::Result<()> {
    let catalog = sentinel_catalog();
    let records = Discoverer::new(&catalog).discover_queryables("sentinel-2", 100.0, false)?;

    let datetime = find(&records, "datetime").definition.to_value();
    assert_eq!(datetime["type"], "string");
    assert_eq!(datetime["format"], "date-time");
    assert_eq!(datetime["minimum"], 1_577_836_800);
    assert_eq!(datetime["maximum"], 1_622_505_600);
    Ok(())
}

#[test]
fn test_structured_properties_and_cast_hints() -> anyhow::Result<()> {
    let catalog = sentinel_catalog();
    let records = Discoverer::new(&catalog).discover_queryables("sentinel-2", 100.0, false)?;

    assert_eq!(
        names(&records),
        BTreeSet::from([
            "bbox",
            "datetime",
            "eo:bands",
            "eo:cloud_cover",
            "mixed",
            "platform",
            "proj:centroid"
        ])
    );
    assert_eq!(find(&records, "eo:bands").cast_hint, Some(CastHint::ToTextArray));
    assert_eq!(find(&records, "proj:centroid").cast_hint, None);
    assert!(find(&records, "mixed").definition.any_of.is_some());
    Ok(())
}

#[test]
fn test_minimal_mode_drops_structured_properties() -> anyhow::Result<()> {
    let catalog = sentinel_catalog();
    let records = Discoverer::new(&catalog).discover_queryables("sentinel-2", 100.0, true)?;

    assert_eq!(
        names(&records),
        BTreeSet::from(["datetime", "eo:cloud_cover", "platform"])
    );
    assert!(
        records
            .iter()
            .all(|r| r.definition.schema_type.as_deref() != Some("array"))
    );
    Ok(())
}

#[test]
fn test_configured_minimal_mode() -> anyhow::Result<()> {
    let catalog = sentinel_catalog();
    let config = DiscoveryConfig::builder().minimal(true).build();
    let discoverer = Discoverer::with_config(&catalog, config);

    let records = discoverer.discover_configured_queryables("sentinel-2")?;
    assert_eq!(
        names(&records),
        BTreeSet::from(["datetime", "eo:cloud_cover", "platform"])
    );
    assert_eq!(discoverer.discover_all_configured_queryables()?, records);

    let full = Discoverer::new(&catalog).discover_configured_queryables("sentinel-2")?;
    assert!(names(&full).contains("bbox"));
    assert!(names(&full).contains("proj:centroid"));
    Ok(())
}

#[test]
fn test_bbox_queryable_bounds() -> anyhow::Result<()> {
    let catalog = sentinel_catalog();
    let records = Discoverer::new(&catalog).discover_queryables("sentinel-2", 100.0, false)?;

    let bbox = find(&records, "bbox");
    assert_eq!(bbox.cast_hint, Some(CastHint::ToTextArray));
    let schema = bbox.definition.to_value();
    assert_eq!(schema["type"], "array");

    let planar = &schema["anyOf"][0]["prefixItems"];
    assert_eq!(planar[0]["minimum"], 0.0);
    assert_eq!(planar[0]["maximum"], 3.0);
    assert_eq!(planar[1]["minimum"], 40.0);
    assert_eq!(planar[1]["maximum"], 43.0);
    assert_eq!(schema["anyOf"][1]["prefixItems"].as_array().map(Vec::len), Some(6));
    Ok(())
}

#[test]
fn test_no_bbox_queryable_without_boxes() -> anyhow::Result<()> {
    let mut catalog = MemoryCatalog::new();
    catalog.add_item("c", CatalogItem::new("x", json!({"gsd": 10})));
    let records = Discoverer::new(&catalog).discover_queryables("c", 100.0, false)?;
    assert_eq!(names(&records), BTreeSet::from(["gsd"]));
    Ok(())
}

#[test]
fn test_malformed_bboxes_are_skipped() -> anyhow::Result<()> {
    let mut catalog = MemoryCatalog::new();
    catalog
        .add_item("c", CatalogItem::new("a", json!({})).with_bbox(vec![1.0, 2.0, 3.0]))
        .add_item("c", CatalogItem::new("b", json!({})).with_bbox(vec![0.0, 0.0, 2.0, 2.0]));
    let records = Discoverer::new(&catalog).discover_queryables("c", 100.0, false)?;

    let schema = find(&records, "bbox").definition.to_value();
    assert_eq!(schema["anyOf"][0]["prefixItems"][0]["maximum"], 2.0);
    Ok(())
}

#[test]
fn test_array_of_datetimes_folds_into_date_range() -> anyhow::Result<()> {
    let mut catalog = MemoryCatalog::new();
    catalog
        .add_item(
            "c",
            CatalogItem::new("a", json!({"acquisitions": ["2020-01-01T00:00:00Z"]})),
        )
        .add_item(
            "c",
            CatalogItem::new(
                "b",
                json!({"acquisitions": ["2019-06-01T00:00:00Z", "2020-03-01T00:00:00Z"]}),
            ),
        );
    let records = Discoverer::new(&catalog).discover_queryables("c", 100.0, false)?;

    let schema = find(&records, "acquisitions").definition.to_value();
    assert_eq!(schema["type"], "array");
    assert_eq!(schema["items"]["format"], "date-time");
    assert_eq!(schema["items"]["minimum"], 1_559_347_200);
    assert!(schema["items"].get("enum").is_none());
    Ok(())
}

#[test]
fn test_sampling_escalates_for_small_collections() -> anyhow::Result<()> {
    let mut catalog = MemoryCatalog::new();
    for i in 0..50 {
        catalog.add_item("small", CatalogItem::new(format!("s-{i}"), json!({"n": i})));
    }
    for i in 0..1000 {
        catalog.add_item("large", CatalogItem::new(format!("l-{i}"), json!({"n": i})));
    }

    let discoverer = Discoverer::new(&catalog);
    assert_eq!(discoverer.effective_sampling_percent("small", 10.0)?, 100.0);
    assert_eq!(discoverer.effective_sampling_percent("large", 10.0)?, 10.0);

    // 50 items at 10% is below the minimum sample, so every item is seen
    let records = discoverer.discover_queryables("small", 10.0, false)?;
    assert_eq!(
        find(&records, "n").definition.to_value(),
        json!({"type": "number", "minimum": 0, "maximum": 49})
    );
    Ok(())
}

#[test]
fn test_missing_estimate_scans_everything() -> anyhow::Result<()> {
    let mut catalog = MemoryCatalog::new();
    for i in 0..1000 {
        catalog.add_item("c", CatalogItem::new(format!("i-{i}"), json!({"n": i})));
    }
    let catalog = catalog.without_row_estimates();
    let config = DiscoveryConfig::builder().min_sample_rows(1).build();
    let discoverer = Discoverer::with_config(&catalog, config);
    assert_eq!(discoverer.effective_sampling_percent("c", 10.0)?, 100.0);
    Ok(())
}

#[test]
fn test_unknown_collection() {
    let catalog = sentinel_catalog();
    let result = Discoverer::new(&catalog).discover_queryables("landsat", 100.0, false);
    if let Err(DiscoveryError::CollectionNotFound(id)) = result {
        assert_eq!(id, "landsat");
    } else {
        panic!("Expected CollectionNotFound error");
    }
}

/// Lists a collection that is gone by the time it is scanned
struct VanishingCatalog {
    inner: MemoryCatalog,
}

impl CatalogSource for VanishingCatalog {
    fn collection_ids(&self) -> Result<Vec<String>, CatalogError> {
        let mut ids = self.inner.collection_ids()?;
        ids.push("deleted".to_string());
        Ok(ids)
    }

    fn collection_exists(&self, collection_id: &str) -> Result<bool, CatalogError> {
        self.inner.collection_exists(collection_id)
    }

    fn estimate_row_count(&self, collection_id: &str) -> Result<Option<u64>, CatalogError> {
        self.inner.estimate_row_count(collection_id)
    }

    fn sample_item_properties<'a>(
        &'a self,
        collection_id: &str,
        sampling_percent: f64,
    ) -> Result<Box<dyn Iterator<Item = PropertyBag> + 'a>, CatalogError> {
        self.inner
            .sample_item_properties(collection_id, sampling_percent)
    }

    fn fetch_bboxes<'a>(
        &'a self,
        collection_id: &str,
        sampling_percent: f64,
    ) -> Result<Box<dyn Iterator<Item = Bbox> + 'a>, CatalogError> {
        self.inner.fetch_bboxes(collection_id, sampling_percent)
    }
}

#[test]
fn test_all_collections_skip_vanished() -> anyhow::Result<()> {
    let mut inner = sentinel_catalog();
    inner.add_item("landsat", CatalogItem::new("L1", json!({"gsd": 30})));
    let catalog = VanishingCatalog { inner };

    let records = Discoverer::new(&catalog).discover_all_queryables(100.0, false)?;
    let collections: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.collection_ids.iter().map(String::as_str))
        .collect();
    assert_eq!(collections, BTreeSet::from(["landsat", "sentinel-2"]));
    Ok(())
}

#[test]
fn test_reserved_key_with_text_values() -> anyhow::Result<()> {
    let mut catalog = MemoryCatalog::new();
    catalog
        .add_item("c", CatalogItem::new("a", json!({"expires": "2030-01-01T00:00:00Z"})))
        .add_item("c", CatalogItem::new("b", json!({"expires": "never"})));
    let records = Discoverer::new(&catalog).discover_queryables("c", 100.0, false)?;

    let expires = find(&records, "expires").definition.to_value();
    let branches = expires["anyOf"].as_array().cloned().unwrap_or_default();
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0]["format"], "date-time");
    assert_eq!(branches[1], json!({"type": "string", "enum": ["never"]}));
    Ok(())
}

#[test]
fn test_records_serialize_for_storage() -> anyhow::Result<()> {
    let catalog = sentinel_catalog();
    let records = Discoverer::new(&catalog).discover_queryables("sentinel-2", 100.0, false)?;
    let value: Value = serde_json::to_value(find(&records, "eo:cloud_cover"))?;
    assert_eq!(value["castHint"], "to_float");
    assert_eq!(value["collectionIds"], json!(["sentinel-2"]));
    Ok(())
}
