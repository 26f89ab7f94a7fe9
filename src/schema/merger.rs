use crate::error::SchemaError;
use crate::schema::columns::{generate_columns, ColumnDefinition};
use crate::schema::shape::Shape;
use crate::types::Record;

/// Accumulates the structural union of every record in one run.
///
/// Owned by a single run and fed strictly in record order; it is not
/// meant to be shared between runs or written from more than one place.
#[derive(Debug, Default)]
pub struct SchemaAccumulator {
    shape: Shape,
    record_count: usize,
}

impl SchemaAccumulator {
    pub fn new() -> Self {
        SchemaAccumulator {
            shape: Shape::empty_object(),
            record_count: 0,
        }
    }

    /// Normalize a record to exemplar form and fold it into the shape
    pub fn add(&mut self, record: &Record) {
        self.shape.merge(Shape::normalize_object(record));
        self.record_count += 1;
    }

    /// Derive the ordered column list from everything added so far
    pub fn get(&self) -> Result<Vec<ColumnDefinition>, SchemaError> {
        generate_columns(&self.shape)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }
}
