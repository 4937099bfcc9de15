//! Folding streams of values into descriptors

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::merge::merge;
use super::types::Descriptor;
use super::unit::construct_unit;

/// One fold step starting from an optional accumulator
pub fn step(accumulator: Option<Descriptor>, value: &Value) -> Descriptor {
    match accumulator {
        Some(descriptor) => merge(descriptor, value),
        None => construct_unit(value),
    }
}

/// Fold `values` into an existing (possibly absent) accumulator
pub fn fold_into<'a, I>(initial: Option<Descriptor>, values: I) -> Option<Descriptor>
where
    I: IntoIterator<Item = &'a Value>,
{
    values
        .into_iter()
        .fold(initial, |acc, value| Some(step(acc, value)))
}

/// Fold a sequence of values into one descriptor
///
/// Returns `None` for an empty sequence.
pub fn aggregate<'a, I>(values: I) -> Option<Descriptor>
where
    I: IntoIterator<Item = &'a Value>,
{
    fold_into(None, values)
}

/// Builds one descriptor per property key from a stream of property bags
///
/// Each key is folded independently, in the order bags are observed.
#[derive(Debug, Clone, Default)]
pub struct PropertyAggregator {
    descriptors: BTreeMap<String, Descriptor>,
    bags_observed: usize,
}

impl PropertyAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold every property of one bag
    pub fn observe(&mut self, properties: &Map<String, Value>) {
        self.bags_observed += 1;
        for (key, value) in properties {
            self.observe_property(key, value);
        }
    }

    /// Fold a single property value
    pub fn observe_property(&mut self, key: &str, value: &Value) {
        let accumulator = self.descriptors.remove(key);
        self.descriptors
            .insert(key.to_string(), step(accumulator, value));
    }

    /// Number of property bags observed so far
    pub fn bags_observed(&self) -> usize {
        self.bags_observed
    }

    /// Number of distinct keys seen so far
    pub fn property_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Finish and return the descriptor for every key
    pub fn finish(self) -> BTreeMap<String, Descriptor> {
        self.descriptors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_aggregate_empty() {
        let values: Vec<Value> = Vec::new();
        assert_eq!(aggregate(&values), None);
    }

    #[test]
    fn test_aggregate_numbers_any_order() {
        let values = vec![json!(55), json!(10), json!(80), json!(23)];
        let mut reversed = values.clone();
        reversed.reverse();

        let expected = Descriptor::number_range(10.into(), 80.into());
        assert_eq!(aggregate(&values), Some(expected.clone()));
        assert_eq!(aggregate(&reversed), Some(expected));
    }

    #[test]
    fn test_property_aggregator_per_key() {
        let mut aggregator = PropertyAggregator::new();
        let bags = [
            json!({"cloud_cover": 10, "platform": "sat-a"}),
            json!({"cloud_cover": 80}),
            json!({"platform": "sat-b", "instruments": ["msi"]}),
        ];
        for bag in &bags {
            aggregator.observe(bag.as_object().unwrap());
        }
        assert_eq!(aggregator.bags_observed(), 3);
        assert_eq!(aggregator.property_count(), 3);

        let descriptors = aggregator.finish();
        assert_eq!(
            descriptors["cloud_cover"],
            Descriptor::number_range(10.into(), 80.into())
        );
        assert!(matches!(
            descriptors["platform"],
            Descriptor::Enum { ref values, .. } if values.len() == 2
        ));
        assert!(matches!(
            descriptors["instruments"],
            Descriptor::Array { items: Some(_) }
        ));
    }
}
