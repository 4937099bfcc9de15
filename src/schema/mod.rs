//! Schema inference by example
//!
//! Observed property values are folded into compact [`Descriptor`]s, one per
//! property, and cleaned into publishable [`JsonSchema`] documents.
//!
//! ## Features
//!
//! - **Unit construction** - the smallest descriptor covering one value
//! - **Pairwise merge** - widen a descriptor to cover one more value, with
//!   numeric and date-time ranges, array item folding and `anyOf` fallback
//! - **AnyOf condensation** - grow the closest alternative instead of adding
//!   a branch per document
//! - **Cleaning** - strip internal bookkeeping and normalize `anyOf`
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use stac_discovery::schema::{aggregate, clean};
//!
//! let values = [json!(10), json!(55), json!(80)];
//! let descriptor = aggregate(&values).unwrap();
//! let schema = clean(&descriptor);
//! assert_eq!(
//!     schema.to_value(),
//!     json!({"type": "number", "minimum": 10, "maximum": 80})
//! );
//! ```

mod aggregate;
mod clean;
mod formats;
mod merge;
mod types;
mod unit;

pub use aggregate::{PropertyAggregator, aggregate, fold_into, step};
pub use clean::{JsonSchema, clean};
pub use formats::{Timestamp, is_datetime, parse_datetime};
pub use merge::{condense, merge};
pub use types::{DateBounds, Descriptor, ValueType};
pub use unit::construct_unit;
