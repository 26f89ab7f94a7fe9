use crate::error::StageError;
use crate::transform::RecordStage;
use crate::types::Record;
use chrono::{DateTime, SecondsFormat};
use serde_json::Value;

/// Adds `createdOn`, the creation time embedded in an ObjectId `id`.
///
/// The first four bytes of an ObjectId are its creation time in seconds
/// since the epoch. Runs after the identity stage, so it reads the flat
/// text `id` rather than the native field.
#[derive(Default)]
pub struct CreatedOnStage;

impl CreatedOnStage {
    pub const NAME: &'static str = "created_on";

    fn timestamp(id: &str) -> Option<String> {
        if id.len() != 24 || !id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let seconds = i64::from_str_radix(&id[..8], 16).ok()?;
        DateTime::from_timestamp(seconds, 0)
            .map(|created| created.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl RecordStage for CreatedOnStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn apply(&mut self, mut record: Record) -> Result<Record, StageError> {
        let created = match record.get("id") {
            Some(Value::String(id)) => Self::timestamp(id).ok_or_else(|| {
                StageError::new(Self::NAME, format!("'{}' is not an ObjectId", id))
            })?,
            Some(other) => {
                return Err(StageError::new(
                    Self::NAME,
                    format!("expected text id, found {}", other),
                ))
            }
            None => return Err(StageError::new(Self::NAME, "record has no id")),
        };

        record.insert("createdOn".to_string(), Value::String(created));
        Ok(record)
    }
}
