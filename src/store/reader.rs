//! Queryables document assembly

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value, json};

use super::QueryablesStore;
use crate::catalog::CatalogSource;
use crate::discovery::DiscoveryResult;
use crate::schema::JsonSchema;

/// `$schema` of the queryables document
pub const QUERYABLES_SCHEMA_DIALECT: &str = "http://json-schema.org/draft-07/schema#";
/// `$id` of the queryables document
pub const QUERYABLES_SCHEMA_ID: &str = "https://stac-api.example.com/queryables";
/// `title` of the queryables document
pub const QUERYABLES_TITLE: &str = "STAC Queryables.";

/// Build the queryables JSON Schema for some collections
///
/// An empty `collection_ids` selects every collection. Returns `None` when
/// ids were given and none of them exists. Records apply when they are
/// global or name any requested collection; several distinct definitions
/// under one name are published as `anyOf`.
pub fn get_queryables_schema<Q, C>(
    store: &Q,
    catalog: &C,
    collection_ids: &[String],
) -> DiscoveryResult<Option<Value>>
where
    Q: QueryablesStore + ?Sized,
    C: CatalogSource + ?Sized,
{
    let mut requested = BTreeSet::new();
    for id in collection_ids {
        if catalog.collection_exists(id)? {
            requested.insert(id.clone());
        }
    }
    if !collection_ids.is_empty() && requested.is_empty() {
        return Ok(None);
    }

    let mut grouped: BTreeMap<String, Vec<JsonSchema>> = BTreeMap::new();
    for record in store.records()? {
        if !record.applies_to(&requested) {
            continue;
        }
        let definitions = grouped.entry(record.name).or_default();
        if !definitions.contains(&record.definition) {
            definitions.push(record.definition);
        }
    }

    let mut properties = Map::new();
    for (name, mut definitions) in grouped {
        let definition = if definitions.len() == 1 {
            definitions.remove(0)
        } else {
            JsonSchema::any_of(definitions).cleaned()
        };
        properties.insert(name, serde_json::to_value(definition)?);
    }

    Ok(Some(json!({
        "$schema": QUERYABLES_SCHEMA_DIALECT,
        "$id": QUERYABLES_SCHEMA_ID,
        "type": "object",
        "title": QUERYABLES_TITLE,
        "properties": properties,
    })))
}
