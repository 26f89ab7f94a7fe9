//! Schema inference for the destination table
//!
//! Records are normalized into exemplar form and folded into a single
//! [`Shape`]; the column generator turns that shape into an ordered list of
//! warehouse columns once the run has finished.

pub mod columns;
pub mod merger;
pub mod shape;

pub use columns::{generate_columns, read_columns, ColumnDefinition, ColumnMode, ColumnType};
pub use merger::SchemaAccumulator;
pub use shape::Shape;
