//! Conversion of descriptors into publishable JSON Schema
//!
//! Descriptors carry bookkeeping the merge needs (value-type tags, textual
//! date bounds, variant tags). None of it survives cleaning: the result only
//! holds standard JSON Schema keywords.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::types::{Descriptor, ValueType};

/// JSON Schema subset produced by discovery
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSchema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, JsonSchema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<JsonSchema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_items: Option<Vec<JsonSchema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<JsonSchema>>,
}

impl JsonSchema {
    /// Schema with only a `type`
    pub fn typed(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Default::default()
        }
    }

    /// Schema matching any of the given alternatives
    pub fn any_of(branches: Vec<JsonSchema>) -> Self {
        Self {
            any_of: Some(branches),
            ..Default::default()
        }
    }

    /// Numeric schema bounded by `minimum` and `maximum`
    pub fn number_range(minimum: Number, maximum: Number) -> Self {
        Self {
            minimum: Some(minimum),
            maximum: Some(maximum),
            ..Self::typed("number")
        }
    }

    /// Normalize `anyOf` throughout the tree
    ///
    /// Nested `anyOf` lists are flattened, duplicate branches dropped and a
    /// single remaining branch replaces its wrapper. An empty list is
    /// removed, leaving the accept-anything schema. Idempotent.
    pub fn cleaned(mut self) -> JsonSchema {
        self.properties = self.properties.map(|props| {
            props
                .into_iter()
                .map(|(key, value)| (key, value.cleaned()))
                .collect()
        });
        self.items = self.items.map(|item| Box::new((*item).cleaned()));
        self.prefix_items = self
            .prefix_items
            .map(|tuple| tuple.into_iter().map(JsonSchema::cleaned).collect());

        let Some(branches) = self.any_of.take() else {
            return self;
        };

        let mut flat: Vec<JsonSchema> = Vec::with_capacity(branches.len());
        for branch in branches.into_iter().map(JsonSchema::cleaned) {
            if branch.is_bare_any_of() {
                for inner in branch.any_of.unwrap_or_default() {
                    push_unique(&mut flat, inner);
                }
            } else {
                push_unique(&mut flat, branch);
            }
        }

        if flat.is_empty() {
            return self;
        }
        if flat.len() == 1 && self == JsonSchema::default() {
            return flat.remove(0);
        }
        self.any_of = Some(flat);
        self
    }

    /// True when the schema holds nothing but an `anyOf`
    fn is_bare_any_of(&self) -> bool {
        self.any_of.is_some()
            && JsonSchema {
                any_of: None,
                ..self.clone()
            } == JsonSchema::default()
    }

    /// Render as a `serde_json::Value`
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn push_unique(branches: &mut Vec<JsonSchema>, branch: JsonSchema) {
    if !branches.contains(&branch) {
        branches.push(branch);
    }
}

/// Strip bookkeeping from a descriptor and produce its public schema
pub fn clean(descriptor: &Descriptor) -> JsonSchema {
    to_schema(descriptor).cleaned()
}

fn to_schema(descriptor: &Descriptor) -> JsonSchema {
    match descriptor {
        Descriptor::Enum { values, value_type } => JsonSchema {
            format: (*value_type == ValueType::DateTime).then(|| "date-time".to_string()),
            enum_values: Some(values.clone()),
            ..JsonSchema::typed(value_type.json_type())
        },
        Descriptor::NumberRange { minimum, maximum } => {
            JsonSchema::number_range(minimum.clone(), maximum.clone())
        }
        Descriptor::DateRange(bounds) => JsonSchema {
            format: Some("date-time".to_string()),
            description: Some(bounds.description()),
            minimum: Some(bounds.minimum_epoch.into()),
            maximum: Some(bounds.maximum_epoch.into()),
            ..JsonSchema::typed("string")
        },
        Descriptor::Object { properties } => JsonSchema {
            properties: Some(
                properties
                    .iter()
                    .map(|(key, value)| (key.clone(), to_schema(value)))
                    .collect(),
            ),
            ..JsonSchema::typed("object")
        },
        Descriptor::Array { items } => JsonSchema {
            items: items.as_ref().map(|item| Box::new(to_schema(item))),
            ..JsonSchema::typed("array")
        },
        Descriptor::AnyOf { branches } => {
            JsonSchema::any_of(branches.iter().map(to_schema).collect())
        }
    }
}
