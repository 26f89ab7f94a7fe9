//! Structural summary of every record seen in a run
//!
//! Records are first reduced to exemplar form (every scalar replaced by a
//! stand-in for its type class), then folded into one accumulated `Shape`.
//! Arrays are always summarized as a single combined element.

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Exemplar stored for numeric leaves; non-integral so columns infer as FLOAT
pub const NUMBER_EXEMPLAR: f64 = 1.1;

/// Exemplar stored for text and any other non-numeric scalar
pub const TEXT_EXEMPLAR: &str = "-";

/// Recursive structural summary of one or more records.
///
/// Equality is deep; object field order does not matter.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Null,
    Bool(bool),
    Number,
    Text,
    /// Object fields in first-seen order
    Object(IndexMap<String, Shape>),
    /// Raw element list while normalizing; at most one combined element once merged
    Array(Vec<Shape>),
}

impl Shape {
    pub fn empty_object() -> Self {
        Shape::Object(IndexMap::new())
    }

    /// Replace every scalar leaf with its type-class exemplar.
    ///
    /// Works on a borrowed value and builds a new tree, so the record is
    /// never touched.
    pub fn normalize(value: &Value) -> Self {
        match value {
            Value::Null => Shape::Null,
            Value::Bool(b) => Shape::Bool(*b),
            Value::Number(_) => Shape::Number,
            Value::String(_) => Shape::Text,
            Value::Array(items) => Shape::Array(items.iter().map(Shape::normalize).collect()),
            Value::Object(obj) => Shape::normalize_object(obj),
        }
    }

    pub fn normalize_object(obj: &Map<String, Value>) -> Self {
        Shape::Object(
            obj.iter()
                .map(|(key, value)| (key.clone(), Shape::normalize(value)))
                .collect(),
        )
    }

    /// Merge `source` into `self`.
    ///
    /// Object keys are unioned, objects on both sides merge recursively, and
    /// arrays on both sides are concatenated, de-duplicated and folded into a
    /// single exemplar element. Any other combination is last-write-wins:
    /// the incoming value replaces what was accumulated.
    pub fn merge(&mut self, source: Shape) {
        match (self, source) {
            (Shape::Object(target), Shape::Object(fields)) => {
                for (key, value) in fields {
                    match target.get_mut(&key) {
                        Some(slot) => slot.merge(value),
                        None => {
                            target.insert(key, value.canonical());
                        }
                    }
                }
            }
            (Shape::Array(target), Shape::Array(items)) => {
                let mut combined = std::mem::take(target);
                combined.extend(items);
                *target = fold_elements(combined);
            }
            (target, source) => *target = source.canonical(),
        }
    }

    /// Collapse every array in the tree to its combined single element
    fn canonical(self) -> Shape {
        match self {
            Shape::Object(fields) => Shape::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, value.canonical()))
                    .collect(),
            ),
            Shape::Array(items) => Shape::Array(fold_elements(items)),
            scalar => scalar,
        }
    }

    /// Look up a direct field of an object shape
    pub fn field(&self, name: &str) -> Option<&Shape> {
        match self {
            Shape::Object(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Render the shape back into exemplar JSON, e.g. for debugging dumps
    pub fn to_value(&self) -> Value {
        match self {
            Shape::Null => Value::Null,
            Shape::Bool(b) => Value::Bool(*b),
            Shape::Number => serde_json::json!(NUMBER_EXEMPLAR),
            Shape::Text => Value::String(TEXT_EXEMPLAR.to_string()),
            Shape::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_value()))
                    .collect(),
            ),
            Shape::Array(items) => Value::Array(items.iter().map(Shape::to_value).collect()),
        }
    }
}

impl Default for Shape {
    fn default() -> Self {
        Shape::empty_object()
    }
}

/// Drop exact duplicates (keeping first occurrences), then merge the
/// survivors left to right into one element
fn fold_elements(items: Vec<Shape>) -> Vec<Shape> {
    let mut distinct: Vec<Shape> = Vec::with_capacity(items.len());
    for item in items {
        if !distinct.contains(&item) {
            distinct.push(item);
        }
    }

    let mut distinct = distinct.into_iter();
    let Some(first) = distinct.next() else {
        return Vec::new();
    };

    let mut combined = first.canonical();
    for item in distinct {
        combined.merge(item);
    }
    vec![combined]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shape_of(value: Value) -> Shape {
        Shape::normalize(&value)
    }

    #[test]
    fn test_normalize_replaces_scalars() {
        let shape = shape_of(json!({
            "count": 42,
            "ratio": 0.5,
            "name": "Alice",
            "active": false,
            "missing": null
        }));

        assert_eq!(
            shape.to_value(),
            json!({
                "count": 1.1,
                "ratio": 1.1,
                "name": "-",
                "active": false,
                "missing": null
            })
        );
    }

    #[test]
    fn test_normalize_walks_arrays_elementwise() {
        let shape = shape_of(json!({"tags": ["a", 1, {"x": true}]}));
        assert_eq!(shape.to_value(), json!({"tags": ["-", 1.1, {"x": true}]}));
    }

    #[test]
    fn test_normalize_leaves_input_untouched() {
        let input = json!({"a": 3, "b": {"c": "text"}});
        let before = input.clone();
        let _ = Shape::normalize(&input);
        assert_eq!(input, before);
    }

    #[test]
    fn test_merge_unions_keys_in_first_seen_order() {
        let mut acc = Shape::empty_object();
        acc.merge(shape_of(json!({"b": 1, "a": {"x": "s"}})));
        acc.merge(shape_of(json!({"c": true, "a": {"y": 2}})));

        assert_eq!(
            acc.to_value(),
            json!({"b": 1.1, "a": {"x": "-", "y": 1.1}, "c": true})
        );
        let keys: Vec<_> = acc.to_value().as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_scalar_conflict_is_last_write_wins() {
        let mut acc = Shape::empty_object();
        acc.merge(shape_of(json!({"a": 1})));
        acc.merge(shape_of(json!({"a": "x"})));
        assert_eq!(acc.field("a"), Some(&Shape::Text));

        acc.merge(shape_of(json!({"a": 2})));
        assert_eq!(acc.field("a"), Some(&Shape::Number));
    }

    #[test]
    fn test_object_replaced_by_scalar() {
        let mut acc = Shape::empty_object();
        acc.merge(shape_of(json!({"a": {"b": 1}})));
        acc.merge(shape_of(json!({"a": "flat"})));
        assert_eq!(acc.field("a"), Some(&Shape::Text));
    }

    #[test]
    fn test_first_seen_array_collapses_to_singleton() {
        let mut acc = Shape::empty_object();
        acc.merge(shape_of(json!({"d": [1, 2, 2]})));
        assert_eq!(acc.field("d"), Some(&Shape::Array(vec![Shape::Number])));
    }

    #[test]
    fn test_array_elements_fold_across_records() {
        let mut acc = Shape::empty_object();
        acc.merge(shape_of(json!({"items": [{"id": 1}, {"name": "a"}]})));
        acc.merge(shape_of(json!({"items": [{"price": 2.5}]})));

        assert_eq!(
            acc.to_value(),
            json!({"items": [{"id": 1.1, "name": "-", "price": 1.1}]})
        );
    }

    #[test]
    fn test_duplicate_array_elements_are_deduplicated() {
        let mut acc = Shape::empty_object();
        acc.merge(shape_of(json!({"tags": [{"a": 1}, {"a": 1}]})));
        acc.merge(shape_of(json!({"tags": [{"a": 1}, {"a": 1}]})));

        assert_eq!(acc.field("tags"), Some(&Shape::Array(vec![shape_of(json!({"a": 1}))])));
    }

    #[test]
    fn test_nested_arrays_inside_array_elements_collapse() {
        let mut acc = Shape::empty_object();
        acc.merge(shape_of(json!({"rows": [{"cells": [1, 2]}, {"cells": ["x"]}]})));
        assert_eq!(acc.to_value(), json!({"rows": [{"cells": ["-"]}]}));
    }

    #[test]
    fn test_empty_array_stays_empty_until_elements_arrive() {
        let mut acc = Shape::empty_object();
        acc.merge(shape_of(json!({"list": []})));
        assert_eq!(acc.field("list"), Some(&Shape::Array(vec![])));

        acc.merge(shape_of(json!({"list": [true]})));
        assert_eq!(acc.field("list"), Some(&Shape::Array(vec![Shape::Bool(true)])));
    }

    #[test]
    fn test_wide_records_merge_in_first_seen_order() {
        let mut acc = Shape::empty_object();
        let first: Map<String, Value> = (0..2000).map(|i| (format!("f{}", i), json!(i))).collect();
        let second: Map<String, Value> = (1000..3000).rev().map(|i| (format!("f{}", i), json!("s"))).collect();

        acc.merge(Shape::normalize_object(&first));
        acc.merge(Shape::normalize_object(&second));

        let Shape::Object(fields) = &acc else {
            panic!("expected object shape");
        };
        assert_eq!(fields.len(), 3000);
        assert_eq!(fields.get_index(0).map(|(k, _)| k.as_str()), Some("f0"));
        assert_eq!(fields.get_index(2000).map(|(k, _)| k.as_str()), Some("f2999"));
        assert_eq!(acc.field("f999"), Some(&Shape::Number));
        assert_eq!(acc.field("f1000"), Some(&Shape::Text));
    }

    #[test]
    fn test_equality_ignores_field_order() {
        assert_eq!(
            shape_of(json!({"a": 1, "b": "x"})),
            shape_of(json!({"b": "y", "a": 2}))
        );
        assert_ne!(shape_of(json!({"a": 1})), shape_of(json!({"a": 1, "b": 1})));
    }
}
