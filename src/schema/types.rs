//! Schema descriptors built up while observing property values

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::formats;

/// Runtime type of an observed scalar
///
/// `DateTime` is a string that parses as a timestamp; it is tracked
/// separately so that two of them can be promoted to a date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    Null,
    Boolean,
    Number,
    String,
    DateTime,
    Array,
    Object,
}

impl ValueType {
    /// Classify an observed value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Boolean,
            Value::Number(_) => ValueType::Number,
            Value::String(s) if formats::is_datetime(s) => ValueType::DateTime,
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
        }
    }

    /// JSON Schema type name; date-times are strings on the wire
    pub fn json_type(&self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::String | ValueType::DateTime => "string",
            ValueType::Array => "array",
            ValueType::Object => "object",
        }
    }
}

/// Textual and epoch bounds of a date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateBounds {
    pub minimum_text: String,
    pub maximum_text: String,
    pub minimum_epoch: i64,
    pub maximum_epoch: i64,
    #[serde(default)]
    pub minimum_nanos: u32,
    #[serde(default)]
    pub maximum_nanos: u32,
}

impl DateBounds {
    /// Bounds covering a single normalized timestamp
    pub fn single(ts: &formats::Timestamp) -> Self {
        Self {
            minimum_text: ts.text.clone(),
            maximum_text: ts.text.clone(),
            minimum_epoch: ts.epoch,
            maximum_epoch: ts.epoch,
            minimum_nanos: ts.nanos,
            maximum_nanos: ts.nanos,
        }
    }

    /// Widen the bounds to include another normalized timestamp
    ///
    /// Bounds are compared at full precision; the text follows whichever
    /// bound changed.
    pub fn include(&mut self, ts: &formats::Timestamp) {
        if ts.sort_key() < (self.minimum_epoch, self.minimum_nanos) {
            self.minimum_text = ts.text.clone();
            self.minimum_epoch = ts.epoch;
            self.minimum_nanos = ts.nanos;
        }
        if ts.sort_key() > (self.maximum_epoch, self.maximum_nanos) {
            self.maximum_text = ts.text.clone();
            self.maximum_epoch = ts.epoch;
            self.maximum_nanos = ts.nanos;
        }
    }

    /// Human readable summary embedding both textual bounds
    pub fn description(&self) -> String {
        format!(
            "Observed date-time values from {} to {}",
            self.minimum_text, self.maximum_text
        )
    }
}

/// Schema descriptor summarizing every value observed for a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Descriptor {
    /// Finite set of observed literals sharing one runtime type
    Enum {
        values: Vec<Value>,
        value_type: ValueType,
    },
    /// Numeric bounds
    NumberRange { minimum: Number, maximum: Number },
    /// Timestamp bounds
    DateRange(DateBounds),
    /// Object with one descriptor per observed key
    Object {
        properties: BTreeMap<String, Descriptor>,
    },
    /// Array whose elements are all folded into a single item descriptor
    Array { items: Option<Box<Descriptor>> },
    /// Alternatives for values that disagree in type or shape
    AnyOf { branches: Vec<Descriptor> },
}

impl Descriptor {
    /// Single-value enum
    pub fn literal(value: Value) -> Self {
        let value_type = ValueType::of(&value);
        Descriptor::Enum {
            values: vec![value],
            value_type,
        }
    }

    /// Numeric range spanning two numbers, in either order
    pub fn number_range(a: Number, b: Number) -> Self {
        if as_f64(&b) < as_f64(&a) {
            Descriptor::NumberRange {
                minimum: b,
                maximum: a,
            }
        } else {
            Descriptor::NumberRange {
                minimum: a,
                maximum: b,
            }
        }
    }

    /// JSON Schema type name of this descriptor, `None` for `AnyOf`
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            Descriptor::Enum { value_type, .. } => Some(value_type.json_type()),
            Descriptor::NumberRange { .. } => Some("number"),
            Descriptor::DateRange(_) => Some("string"),
            Descriptor::Object { .. } => Some("object"),
            Descriptor::Array { .. } => Some("array"),
            Descriptor::AnyOf { .. } => None,
        }
    }

    /// Whether values described here are objects or arrays
    pub fn is_structured(&self) -> bool {
        match self {
            Descriptor::Object { .. } | Descriptor::Array { .. } => true,
            Descriptor::AnyOf { branches } => branches.iter().any(Descriptor::is_structured),
            _ => false,
        }
    }

    /// Size of the compact JSON encoding, used to compare merge candidates
    pub fn size(&self) -> usize {
        serde_json::to_vec(self)
            .map(|bytes| bytes.len())
            .unwrap_or(usize::MAX)
    }
}

pub(crate) fn as_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}
