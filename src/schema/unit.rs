//! Minimal descriptor for a single observed value

use std::collections::BTreeMap;

use serde_json::Value;

use super::aggregate::aggregate;
use super::types::Descriptor;

/// Build the smallest descriptor that covers `value`
///
/// Scalars become single-value enums (numbers and date-time strings keep
/// their type tag so a later merge can promote them to ranges), objects get
/// one unit per field, and arrays fold their own elements into one item
/// descriptor.
pub fn construct_unit(value: &Value) -> Descriptor {
    match value {
        Value::Object(fields) => Descriptor::Object {
            properties: fields
                .iter()
                .map(|(key, field)| (key.clone(), construct_unit(field)))
                .collect::<BTreeMap<_, _>>(),
        },
        Value::Array(elements) => Descriptor::Array {
            items: aggregate(elements).map(Box::new),
        },
        scalar => Descriptor::literal(scalar.clone()),
    }
}
