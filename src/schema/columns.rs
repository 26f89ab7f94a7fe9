//! Column definitions for the destination table
//!
//! Turns an accumulated [`Shape`] into a warehouse column list. The JSON form
//! matches the `{"name", "type", "mode", "fields"}` layout load jobs accept,
//! so a generated list can be saved and later supplied as a precomputed schema.

use crate::error::SchemaError;
use crate::schema::shape::Shape;
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    String,
    Float,
    Integer,
    Boolean,
    Timestamp,
    Record,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnMode {
    Required,
    Nullable,
    Repeated,
}

/// One destination column; `fields` is only populated for RECORD columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,

    #[serde(rename = "type")]
    pub column_type: ColumnType,

    #[serde(default = "default_mode")]
    pub mode: ColumnMode,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<ColumnDefinition>,
}

fn default_mode() -> ColumnMode {
    ColumnMode::Nullable
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, column_type: ColumnType, mode: ColumnMode) -> Self {
        ColumnDefinition {
            name: name.into(),
            column_type,
            mode,
            fields: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<ColumnDefinition>) -> Self {
        self.fields = fields;
        self
    }
}

/// Generate columns for every field of the root shape, in first-seen order.
///
/// A root that is not an object (or is empty) yields no columns.
pub fn generate_columns(shape: &Shape) -> Result<Vec<ColumnDefinition>, SchemaError> {
    match shape {
        Shape::Object(fields) => fields
            .iter()
            .map(|(name, value)| column_for(name, name, value))
            .collect(),
        _ => Ok(Vec::new()),
    }
}

fn column_for(name: &str, path: &str, shape: &Shape) -> Result<ColumnDefinition, SchemaError> {
    match shape {
        Shape::Array(items) => match items.first() {
            None => Ok(ColumnDefinition::new(name, ColumnType::String, ColumnMode::Repeated)),
            Some(Shape::Array(_)) => Err(SchemaError::NestedArray {
                path: path.to_string(),
            }),
            Some(element) => {
                let mut column = column_for(name, path, element)?;
                column.mode = ColumnMode::Repeated;
                Ok(column)
            }
        },
        Shape::Object(fields) => {
            if fields.is_empty() {
                return Err(SchemaError::EmptyRecord {
                    path: path.to_string(),
                });
            }

            let nested = fields
                .iter()
                .map(|(child, value)| column_for(child, &format!("{}.{}", path, child), value))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(ColumnDefinition::new(name, ColumnType::Record, ColumnMode::Nullable)
                .with_fields(nested))
        }
        Shape::Bool(_) => Ok(ColumnDefinition::new(name, ColumnType::Boolean, ColumnMode::Nullable)),
        Shape::Number => Ok(ColumnDefinition::new(name, ColumnType::Float, ColumnMode::Nullable)),
        // Null-only leaves carry no type information; STRING accepts anything
        Shape::Text | Shape::Null => {
            Ok(ColumnDefinition::new(name, ColumnType::String, ColumnMode::Nullable))
        }
    }
}

/// Read a precomputed column list in the same JSON layout `generate_columns` emits
pub fn read_columns<R: Read>(reader: R) -> Result<Vec<ColumnDefinition>, SchemaError> {
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn columns_of(value: Value) -> Result<Vec<ColumnDefinition>, SchemaError> {
        let mut shape = Shape::empty_object();
        shape.merge(Shape::normalize(&value));
        generate_columns(&shape)
    }

    #[test]
    fn test_scalar_columns() {
        let columns = columns_of(json!({
            "id": "abc",
            "score": 7,
            "active": true,
            "note": null
        }))
        .unwrap();

        assert_eq!(
            columns,
            vec![
                ColumnDefinition::new("id", ColumnType::String, ColumnMode::Nullable),
                ColumnDefinition::new("score", ColumnType::Float, ColumnMode::Nullable),
                ColumnDefinition::new("active", ColumnType::Boolean, ColumnMode::Nullable),
                ColumnDefinition::new("note", ColumnType::String, ColumnMode::Nullable),
            ]
        );
    }

    #[test]
    fn test_record_and_repeated_columns() {
        let columns = columns_of(json!({
            "address": {"city": "Oslo", "zip": 1234},
            "tags": ["a", "b"],
            "items": [{"sku": "x", "qty": 1}]
        }))
        .unwrap();

        assert_eq!(columns[0].column_type, ColumnType::Record);
        assert_eq!(columns[0].mode, ColumnMode::Nullable);
        assert_eq!(columns[0].fields.len(), 2);
        assert_eq!(columns[0].fields[1].column_type, ColumnType::Float);

        assert_eq!(columns[1], ColumnDefinition::new("tags", ColumnType::String, ColumnMode::Repeated));

        assert_eq!(columns[2].column_type, ColumnType::Record);
        assert_eq!(columns[2].mode, ColumnMode::Repeated);
        assert_eq!(columns[2].fields[0].name, "sku");
    }

    #[test]
    fn test_empty_array_is_repeated_string() {
        let columns = columns_of(json!({"list": []})).unwrap();
        assert_eq!(columns[0], ColumnDefinition::new("list", ColumnType::String, ColumnMode::Repeated));
    }

    #[test]
    fn test_empty_object_is_rejected() {
        let err = columns_of(json!({"outer": {"inner": {}}})).unwrap_err();
        match err {
            SchemaError::EmptyRecord { path } => assert_eq!(path, "outer.inner"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_array_of_arrays_is_rejected() {
        let err = columns_of(json!({"matrix": [[1, 2], [3]]})).unwrap_err();
        assert!(matches!(err, SchemaError::NestedArray { ref path } if path == "matrix"));
    }

    #[test]
    fn test_serialized_layout() {
        let columns = columns_of(json!({"user": {"name": "a"}, "n": 1})).unwrap();
        let rendered = serde_json::to_value(&columns).unwrap();

        assert_eq!(
            rendered,
            json!([
                {"name": "user", "type": "RECORD", "mode": "NULLABLE", "fields": [
                    {"name": "name", "type": "STRING", "mode": "NULLABLE"}
                ]},
                {"name": "n", "type": "FLOAT", "mode": "NULLABLE"}
            ])
        );
    }

    #[test]
    fn test_read_precomputed_columns() {
        let input = br#"[
            {"name": "id", "type": "STRING", "mode": "REQUIRED"},
            {"name": "created", "type": "TIMESTAMP"}
        ]"#;

        let columns = read_columns(&input[..]).unwrap();
        assert_eq!(columns[0].mode, ColumnMode::Required);
        assert_eq!(columns[1].column_type, ColumnType::Timestamp);
        assert_eq!(columns[1].mode, ColumnMode::Nullable);
    }

    #[test]
    fn test_read_rejects_unknown_type() {
        let input = br#"[{"name": "id", "type": "BLOB"}]"#;
        assert!(matches!(
            read_columns(&input[..]),
            Err(SchemaError::InvalidColumns(_))
        ));
    }
}
