//! Pairwise merging of a descriptor with a newly observed value
//!
//! `merge` is one fold step: the accumulator summarizes everything seen so
//! far and is widened to also cover `next`. Rules are tried in order and the
//! first one that applies wins:
//!
//! 1. object into object: per-key merge over the union of keys
//! 2. number into a numeric range (or numeric literal): widen min/max
//! 3. date-time into a date range (or date-time literal): widen min/max on
//!    normalized text
//! 4. array into array: fold every element into the item descriptor
//! 5. literal into an enum of the same JSON type: set union
//! 6. anything into `AnyOf`: grow the closest branch (see [`condense`])
//! 7. otherwise: `AnyOf` of the accumulator and the new unit
//!
//! Merging is not commutative once `AnyOf` is involved: feeding the same
//! values in a different order can group them into different, equally
//! valid branches.

use serde_json::{Number, Value};

use super::aggregate::fold_into;
use super::formats::{self, Timestamp};
use super::types::{DateBounds, Descriptor, ValueType, as_f64};
use super::unit::construct_unit;

/// Widen `accumulator` so that it also describes `next`
pub fn merge(accumulator: Descriptor, next: &Value) -> Descriptor {
    let next_date = match next {
        Value::String(s) => formats::parse_datetime(s),
        _ => None,
    };

    match (accumulator, next, next_date) {
        (Descriptor::Object { mut properties }, Value::Object(fields), _) => {
            for (key, value) in fields {
                let merged = match properties.remove(key) {
                    Some(existing) => merge(existing, value),
                    None => construct_unit(value),
                };
                properties.insert(key.clone(), merged);
            }
            Descriptor::Object { properties }
        }

        (Descriptor::NumberRange { minimum, maximum }, Value::Number(n), _) => {
            widen_numbers([minimum, maximum].into_iter(), n)
        }
        (
            Descriptor::Enum {
                values,
                value_type: ValueType::Number,
            },
            Value::Number(n),
            _,
        ) => widen_numbers(
            values.into_iter().filter_map(|v| match v {
                Value::Number(n) => Some(n),
                _ => None,
            }),
            n,
        ),

        (Descriptor::DateRange(mut bounds), _, Some(ts)) => {
            bounds.include(&ts);
            Descriptor::DateRange(bounds)
        }
        (
            Descriptor::Enum {
                values,
                value_type: ValueType::DateTime,
            },
            _,
            Some(ts),
        ) => Descriptor::DateRange(widen_dates(&values, &ts)),

        (Descriptor::Array { items }, Value::Array(elements), _) => Descriptor::Array {
            items: fold_into(items.map(|b| *b), elements).map(Box::new),
        },

        (
            Descriptor::Enum {
                mut values,
                value_type,
            },
            next,
            _,
        ) if value_type.json_type() == ValueType::of(next).json_type() => {
            if !values.contains(next) {
                values.push(next.clone());
            }
            let next_type = ValueType::of(next);
            let value_type = if value_type == ValueType::DateTime && next_type != value_type {
                ValueType::String
            } else {
                value_type
            };
            Descriptor::Enum { values, value_type }
        }

        (Descriptor::AnyOf { branches }, next, _) => Descriptor::AnyOf {
            branches: condense(branches, next),
        },

        (accumulator, next, _) => Descriptor::AnyOf {
            branches: vec![accumulator, construct_unit(next)],
        },
    }
}

/// Fold `next` into the branch it fits best
///
/// Every branch is tentatively merged with `next`; the branch whose encoded
/// size changes least is replaced by its merged result. Ties go to the
/// lowest index. When the winning merge could not absorb `next` (it produced
/// an `AnyOf` itself) its alternatives are spliced in place, so `AnyOf`
/// never nests directly.
pub fn condense(mut branches: Vec<Descriptor>, next: &Value) -> Vec<Descriptor> {
    if branches.is_empty() {
        return vec![construct_unit(next)];
    }

    let mut best: Option<(usize, usize, Descriptor)> = None;
    for (index, branch) in branches.iter().enumerate() {
        let before = branch.size();
        let merged = merge(branch.clone(), next);
        let growth = merged.size().abs_diff(before);
        let better = match &best {
            Some((_, best_growth, _)) => growth < *best_growth,
            None => true,
        };
        if better {
            best = Some((index, growth, merged));
        }
    }

    if let Some((index, _, merged)) = best {
        match merged {
            Descriptor::AnyOf { branches: split } => {
                branches.splice(index..=index, split);
            }
            merged => branches[index] = merged,
        }
    }
    branches
}

fn widen_numbers(existing: impl Iterator<Item = Number>, next: &Number) -> Descriptor {
    let mut minimum = next.clone();
    let mut maximum = next.clone();
    for n in existing {
        if as_f64(&n) < as_f64(&minimum) {
            minimum = n.clone();
        }
        if as_f64(&n) > as_f64(&maximum) {
            maximum = n;
        }
    }
    Descriptor::number_range(minimum, maximum)
}

fn widen_dates(values: &[Value], next: &Timestamp) -> DateBounds {
    let mut bounds = DateBounds::single(next);
    for value in values {
        if let Some(ts) = value.as_str().and_then(formats::parse_datetime) {
            bounds.include(&ts);
        }
    }
    bounds
}
