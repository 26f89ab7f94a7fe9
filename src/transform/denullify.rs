use crate::error::StageError;
use crate::transform::RecordStage;
use crate::types::Record;
use serde_json::{Map, Value};

/// Remove null-valued keys from the record.
///
/// A nested object left empty once its nulls are gone is removed with the
/// key holding it, and so is an array that arrives empty. Arrays keep their
/// positions: objects inside them are cleaned, null elements stay, and an
/// element object that ends up empty becomes null. The top-level record
/// itself is kept even when it ends up empty.
pub fn denullify(obj: Map<String, Value>) -> Map<String, Value> {
    obj.into_iter()
        .filter_map(|(key, value)| prune(value).map(|value| (key, value)))
        .collect()
}

/// `None` when the key holding the value should disappear
fn prune(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(obj) => {
            let obj = denullify(obj);
            (!obj.is_empty()).then_some(Value::Object(obj))
        }
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => Some(Value::Array(items.into_iter().map(clean_element).collect())),
        scalar => Some(scalar),
    }
}

/// Array elements are cleaned in place; a vanished element leaves a null
fn clean_element(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(clean_element).collect()),
        other => prune(other).unwrap_or(Value::Null),
    }
}

#[derive(Default)]
pub struct DenullifyStage;

impl RecordStage for DenullifyStage {
    fn name(&self) -> &str {
        "denullify"
    }

    fn apply(&mut self, record: Record) -> Result<Record, StageError> {
        Ok(denullify(record))
    }
}
