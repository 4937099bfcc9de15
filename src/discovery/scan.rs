//! Per-property scan shared by queryables and summaries discovery

use std::collections::BTreeMap;

use super::config::DiscoveryConfig;
use super::extent::DateAccumulator;
use crate::catalog::PropertyBag;
use crate::schema::{Descriptor, PropertyAggregator};

/// Splits each property bag between the date fast path and the general
/// aggregator
#[derive(Debug)]
pub(crate) struct PropertyScan<'c> {
    config: &'c DiscoveryConfig,
    dates: BTreeMap<String, DateAccumulator>,
    general: PropertyAggregator,
    items: usize,
}

impl<'c> PropertyScan<'c> {
    pub(crate) fn new(config: &'c DiscoveryConfig) -> Self {
        Self {
            config,
            dates: BTreeMap::new(),
            general: PropertyAggregator::new(),
            items: 0,
        }
    }

    pub(crate) fn observe(&mut self, properties: &PropertyBag) {
        self.items += 1;
        for (key, value) in properties {
            if self.config.is_datetime_key(key)
                && self.dates.entry(key.clone()).or_default().observe(value)
            {
                continue;
            }
            self.general.observe_property(key, value);
        }
    }

    pub(crate) fn items_observed(&self) -> usize {
        self.items
    }

    /// One descriptor per key; reserved keys that also carried non-date
    /// values get the date range as an extra `anyOf` branch
    pub(crate) fn finish(self) -> BTreeMap<String, Descriptor> {
        let mut descriptors = self.general.finish();
        for (key, dates) in self.dates {
            let Some(range) = dates.finish() else {
                continue;
            };
            let combined = match descriptors.remove(&key) {
                None => range,
                Some(Descriptor::AnyOf { mut branches }) => {
                    branches.insert(0, range);
                    Descriptor::AnyOf { branches }
                }
                Some(other) => Descriptor::AnyOf {
                    branches: vec![range, other],
                },
            };
            descriptors.insert(key, combined);
        }
        descriptors
    }
}
