use crate::error::StageError;
use crate::transform::RecordStage;
use crate::types::Record;
use serde_json::{Map, Value};

/// Collapse nested objects into a single level of dot-joined keys.
///
/// Arrays are descended into key-wise (`tags.0`, `tags.1`) unless
/// `skip_arrays` is set, in which case they are kept as they are. Empty
/// objects and arrays contribute no keys.
pub fn flatten(obj: Map<String, Value>, skip_arrays: bool) -> Map<String, Value> {
    let mut out = Map::with_capacity(obj.len());
    for (key, value) in obj {
        flatten_into(&mut out, key, value, skip_arrays);
    }
    out
}

fn flatten_into(out: &mut Map<String, Value>, path: String, value: Value, skip_arrays: bool) {
    match value {
        Value::Object(obj) => {
            for (key, child) in obj {
                flatten_into(out, format!("{}.{}", path, key), child, skip_arrays);
            }
        }
        Value::Array(items) if !skip_arrays => {
            for (idx, child) in items.into_iter().enumerate() {
                flatten_into(out, format!("{}.{}", path, idx), child, skip_arrays);
            }
        }
        leaf => {
            out.insert(path, leaf);
        }
    }
}

pub struct FlattenStage {
    skip_arrays: bool,
}

impl FlattenStage {
    pub fn new(skip_arrays: bool) -> Self {
        FlattenStage { skip_arrays }
    }
}

impl RecordStage for FlattenStage {
    fn name(&self) -> &str {
        "flatten"
    }

    fn apply(&mut self, record: Record) -> Result<Record, StageError> {
        Ok(flatten(record, self.skip_arrays))
    }
}
