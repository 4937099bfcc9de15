//! Fast paths for timestamps and bounding boxes
//!
//! Reserved timestamp keys and stored item bboxes are far more regular than
//! arbitrary properties, so they skip the general merge and keep running
//! bounds instead.

use serde_json::{Number, Value};

use crate::schema::{DateBounds, Descriptor, JsonSchema, parse_datetime};

/// Name of the spatial queryable
pub const BBOX_QUERYABLE: &str = "bbox";

/// Running bounds over date-time strings
#[derive(Debug, Clone, Default)]
pub struct DateAccumulator {
    bounds: Option<DateBounds>,
}

impl DateAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a value into the bounds
    ///
    /// Returns `false` when the value is neither a date-time string nor
    /// null; nulls are absorbed without widening anything.
    pub fn observe(&mut self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(text) => match parse_datetime(text) {
                Some(ts) => {
                    match &mut self.bounds {
                        Some(bounds) => bounds.include(&ts),
                        None => self.bounds = Some(DateBounds::single(&ts)),
                    }
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    /// Earliest normalized timestamp seen
    pub fn minimum(&self) -> Option<&str> {
        self.bounds.as_ref().map(|b| b.minimum_text.as_str())
    }

    /// Latest normalized timestamp seen
    pub fn maximum(&self) -> Option<&str> {
        self.bounds.as_ref().map(|b| b.maximum_text.as_str())
    }

    /// Date range descriptor, `None` if no timestamp was seen
    pub fn finish(self) -> Option<Descriptor> {
        self.bounds.map(Descriptor::DateRange)
    }
}

/// Per-axis bounds over stored item bboxes
///
/// 2D boxes are `[minx, miny, maxx, maxy]`, 3D boxes
/// `[minx, miny, minz, maxx, maxy, maxz]`.
#[derive(Debug, Clone)]
pub struct BboxAccumulator {
    min: [f64; 3],
    max: [f64; 3],
    boxes: usize,
    boxes_3d: usize,
}

impl Default for BboxAccumulator {
    fn default() -> Self {
        Self {
            min: [f64::INFINITY; 3],
            max: [f64::NEG_INFINITY; 3],
            boxes: 0,
            boxes_3d: 0,
        }
    }
}

impl BboxAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a box into the bounds; `false` if it is malformed
    pub fn observe(&mut self, bbox: &[f64]) -> bool {
        if bbox.iter().any(|v| !v.is_finite()) {
            return false;
        }
        let dims = match bbox.len() {
            4 => 2,
            6 => 3,
            _ => return false,
        };
        for axis in 0..dims {
            let (lo, hi) = (bbox[axis], bbox[axis + dims]);
            self.min[axis] = self.min[axis].min(lo.min(hi));
            self.max[axis] = self.max[axis].max(lo.max(hi));
        }
        self.boxes += 1;
        if dims == 3 {
            self.boxes_3d += 1;
        }
        true
    }

    /// Number of well-formed boxes observed
    pub fn count(&self) -> usize {
        self.boxes
    }

    /// Overall box; 6 numbers if any 3D box was seen
    pub fn bbox(&self) -> Option<Vec<f64>> {
        if self.boxes == 0 {
            return None;
        }
        if self.boxes_3d > 0 {
            Some(vec![
                self.min[0], self.min[1], self.min[2], self.max[0], self.max[1], self.max[2],
            ])
        } else {
            Some(vec![self.min[0], self.min[1], self.max[0], self.max[1]])
        }
    }

    /// Queryable definition for `bbox`: a 2D or a 3D tuple, each position
    /// bounded by its axis
    pub fn queryable_schema(&self) -> Option<JsonSchema> {
        if self.boxes == 0 {
            return None;
        }
        let x = self.axis_schema(0);
        let y = self.axis_schema(1);
        let z = if self.boxes_3d > 0 {
            self.axis_schema(2)
        } else {
            JsonSchema::typed("number")
        };

        let planar = tuple(vec![x.clone(), y.clone(), x.clone(), y.clone()]);
        let volume = tuple(vec![x.clone(), y.clone(), z.clone(), x, y, z]);

        Some(JsonSchema {
            any_of: Some(vec![planar, volume]),
            ..JsonSchema::typed("array")
        })
    }

    fn axis_schema(&self, axis: usize) -> JsonSchema {
        match (
            Number::from_f64(self.min[axis]),
            Number::from_f64(self.max[axis]),
        ) {
            (Some(min), Some(max)) => JsonSchema::number_range(min, max),
            _ => JsonSchema::typed("number"),
        }
    }
}

fn tuple(positions: Vec<JsonSchema>) -> JsonSchema {
    let len = positions.len();
    JsonSchema {
        prefix_items: Some(positions),
        min_items: Some(len),
        max_items: Some(len),
        ..JsonSchema::typed("array")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_date_accumulator_bounds() {
        let mut dates = DateAccumulator::new();
        assert!(dates.observe(&json!("2020-03-01T00:00:00Z")));
        assert!(dates.observe(&json!("2019-01-01T12:00:00+02:00")));
        assert!(dates.observe(&json!(null)));
        assert!(!dates.observe(&json!("unknown")));
        assert!(!dates.observe(&json!(42)));

        assert_eq!(dates.minimum(), Some("2019-01-01T10:00:00Z"));
        assert_eq!(dates.maximum(), Some("2020-03-01T00:00:00Z"));
        assert!(matches!(dates.finish(), Some(Descriptor::DateRange(_))));
    }

    #[test]
    fn test_date_accumulator_keeps_milliseconds() {
        let mut dates = DateAccumulator::new();
        for text in [
            "2020-01-01T00:00:00.500Z",
            "2020-01-01T00:00:00Z",
            "2020-01-01T00:00:00.100Z",
        ] {
            assert!(dates.observe(&json!(text)));
        }
        assert_eq!(dates.minimum(), Some("2020-01-01T00:00:00Z"));
        assert_eq!(dates.maximum(), Some("2020-01-01T00:00:00.500Z"));
    }

    #[test]
    fn test_date_accumulator_empty() {
        let mut dates = DateAccumulator::new();
        dates.observe(&json!(null));
        assert_eq!(dates.minimum(), None);
        assert_eq!(dates.finish(), None);
    }

    #[test]
    fn test_bbox_2d_bounds() {
        let mut bboxes = BboxAccumulator::new();
        assert!(bboxes.observe(&[10.0, 40.0, 11.0, 41.0]));
        assert!(bboxes.observe(&[-5.0, 42.0, 2.0, 43.5]));
        assert_eq!(bboxes.count(), 2);
        assert_eq!(bboxes.bbox(), Some(vec![-5.0, 40.0, 11.0, 43.5]));
    }

    #[test]
    fn test_bbox_3d_widens_to_six() {
        let mut bboxes = BboxAccumulator::new();
        bboxes.observe(&[0.0, 0.0, 1.0, 1.0]);
        bboxes.observe(&[-1.0, 0.5, 100.0, 0.5, 2.0, 250.0]);
        assert_eq!(
            bboxes.bbox(),
            Some(vec![-1.0, 0.0, 100.0, 1.0, 2.0, 250.0])
        );
    }

    #[test]
    fn test_bbox_rejects_malformed() {
        let mut bboxes = BboxAccumulator::new();
        assert!(!bboxes.observe(&[1.0, 2.0, 3.0]));
        assert!(!bboxes.observe(&[0.0, 0.0, f64::NAN, 1.0]));
        assert_eq!(bboxes.bbox(), None);
        assert_eq!(bboxes.queryable_schema(), None);
    }

    #[test]
    fn test_bbox_queryable_schema_shapes() {
        let mut bboxes = BboxAccumulator::new();
        bboxes.observe(&[-10.5, 20.0, 30.0, 45.5]);
        let schema = bboxes.queryable_schema().unwrap().to_value();

        assert_eq!(schema["type"], "array");
        let shapes = schema["anyOf"].as_array().unwrap();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0]["minItems"], 4);
        assert_eq!(shapes[1]["maxItems"], 6);

        let planar = shapes[0]["prefixItems"].as_array().unwrap();
        assert_eq!(planar[0], json!({"type": "number", "minimum": -10.5, "maximum": 30.0}));
        assert_eq!(planar[3], json!({"type": "number", "minimum": 20.0, "maximum": 45.5}));

        // no elevation observed
        assert_eq!(shapes[1]["prefixItems"][2], json!({"type": "number"}));
    }
}
