use crate::error::StageError;
use crate::transform::RecordStage;
use crate::types::Record;
use serde_json::Value;

/// Replaces the source's native identifier with a flat text `id` field
pub struct IdentityStage {
    field: String,
}

impl IdentityStage {
    pub fn new(field: impl Into<String>) -> Self {
        IdentityStage { field: field.into() }
    }
}

impl Default for IdentityStage {
    fn default() -> Self {
        IdentityStage::new("_id")
    }
}

impl RecordStage for IdentityStage {
    fn name(&self) -> &str {
        "id"
    }

    fn apply(&mut self, mut record: Record) -> Result<Record, StageError> {
        if let Some(native) = record.shift_remove(&self.field) {
            record.insert("id".to_string(), Value::String(id_text(native)));
        }
        Ok(record)
    }
}

/// Text form of a native identifier. Extended JSON `{"$oid": ...}` unwraps
/// to the hex string; anything else that is not already text is rendered as
/// compact JSON.
fn id_text(native: Value) -> String {
    match native {
        Value::String(s) => s,
        Value::Object(mut obj) => match obj.remove("$oid") {
            Some(Value::String(oid)) if obj.is_empty() => oid,
            Some(oid) => {
                obj.insert("$oid".to_string(), oid);
                Value::Object(obj).to_string()
            }
            None => Value::Object(obj).to_string(),
        },
        other => other.to_string(),
    }
}
