//! Refresh operations behind the queryables and summaries update endpoints

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::Discoverer;
use super::config::DiscoveryConfig;
use super::error::{DiscoveryError, DiscoveryResult};
use super::queryables::QueryableRecord;
use crate::catalog::{CatalogSource, CollectionMetadataStore};
use crate::store::QueryablesStore;

/// Outcome of a refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    /// Status message returned to the caller
    pub detail: String,
    /// Collections written
    pub collections: usize,
    /// Queryable records or summaries written
    pub records: usize,
}

/// Rediscover queryables for every collection and replace the stored ones
///
/// Sampling and minimal mode come from `config`. Each collection's records
/// are swapped in one [`QueryablesStore::replace_collection`] call, so a
/// failing store leaves that collection's previous records in place.
/// Records scoped to collections that no longer exist are dropped; records
/// that apply to all collections are kept.
pub fn update_queryables<S, Q>(
    source: &S,
    store: &mut Q,
    config: &DiscoveryConfig,
) -> DiscoveryResult<RefreshReport>
where
    S: CatalogSource + ?Sized,
    Q: QueryablesStore + ?Sized,
{
    if !config.custom_queryables {
        return Err(DiscoveryError::Disabled(
            "Custom queryables discovery".to_string(),
        ));
    }

    let discoverer = Discoverer::with_config(source, config.clone());
    let discovered = discoverer.discover_all_configured_queryables()?;

    let mut by_collection: BTreeMap<String, Vec<QueryableRecord>> = source
        .collection_ids()?
        .into_iter()
        .map(|id| (id, Vec::new()))
        .collect();
    for record in discovered {
        let Some(id) = record.collection_ids.iter().next().cloned() else {
            continue;
        };
        by_collection.entry(id).or_default().push(record);
    }

    let stale: BTreeSet<String> = store
        .records()?
        .into_iter()
        .filter(|r| r.collection_ids.len() == 1)
        .flat_map(|r| r.collection_ids)
        .filter(|id| !by_collection.contains_key(id))
        .collect();

    let collections = by_collection.len();
    let mut written = 0usize;
    for (id, records) in by_collection {
        written += records.len();
        store.replace_collection(&id, records)?;
    }
    for id in &stale {
        let removed = store.replace_collection(id, Vec::new())?;
        debug!(collection = %id, removed, "Dropped queryables of deleted collection");
    }

    let detail = if config.minimal {
        "Updated minimal queryables"
    } else {
        "Updated queryables"
    };
    info!(
        collections,
        records = written,
        pruned = stale.len(),
        minimal = config.minimal,
        "{detail}"
    );
    Ok(RefreshReport {
        detail: detail.to_string(),
        collections,
        records: written,
    })
}

/// Rediscover summaries and extents and write them into collection metadata
pub fn update_summaries_and_extents<C>(
    catalog: &mut C,
    config: &DiscoveryConfig,
) -> DiscoveryResult<RefreshReport>
where
    C: CatalogSource + CollectionMetadataStore,
{
    if !config.custom_summaries {
        return Err(DiscoveryError::Disabled(
            "Custom summaries discovery".to_string(),
        ));
    }

    let discovered =
        Discoverer::with_config(&*catalog, config.clone()).discover_all_summaries_and_extents()?;

    let mut collections = 0usize;
    let mut records = 0usize;
    for summary in discovered {
        let Some(mut metadata) = catalog.collection(&summary.collection_id)? else {
            warn!(collection = %summary.collection_id, "Collection metadata missing, skipping");
            continue;
        };
        summary.apply_to(&mut metadata);
        catalog.put_collection(metadata)?;
        collections += 1;
        records += summary.summaries.len();
    }

    info!(collections, summaries = records, "Updated summaries");
    Ok(RefreshReport {
        detail: "Updated summaries".to_string(),
        collections,
        records,
    })
}
