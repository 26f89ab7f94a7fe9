//! # Kiln - Document to Warehouse Loader Core
//!
//! Moves semi-structured records into a columnar warehouse in one pass:
//! each record is sanitized, folded into an inferred schema, and written out
//! as gzip-compressed NDJSON ready for a load job.
//!
//! ## Modules
//!
//! - **transform**: 1:1 record stages (id rewrite, name sanitizing, null
//!   removal, flattening) and the registry for custom stages
//! - **schema**: structural merge of records and column generation
//! - **pipeline**: the pull loop that feeds both the schema and the sink
//!
//! ## Quick Start
//!
//! ```rust
//! use kiln::pipeline::MemorySink;
//! use kiln::PipelineConfig;
//!
//! # fn main() -> anyhow::Result<()> {
//! let input = r#"{"_id": {"$oid": "5a0b1c2d3e4f5a6b7c8d9e0f"}, "first name": "Ada", "age": null}
//! {"_id": {"$oid": "5a0b1c2d3e4f5a6b7c8d9e10"}, "first name": "Alan", "age": 41}
//! "#;
//!
//! let mut sink = MemorySink::new();
//! let summary = kiln::load_ndjson(input.as_bytes(), &mut sink, &PipelineConfig::default(), None)?;
//!
//! assert_eq!(summary.records, 2);
//! // columns: first_name STRING, id STRING, age FLOAT
//! assert_eq!(summary.columns.len(), 3);
//! assert!(sink.finished);
//! # Ok(())
//! # }
//! ```

use std::io::BufRead;

pub mod error;
pub mod pipeline;
pub mod schema;
pub mod transform;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{LoadError, Result, SchemaError, SinkError, SourceError, StageError};
pub use pipeline::{ChunkSink, LoadSummary, NdjsonSource, Pipeline, RecordSource};
pub use schema::{ColumnDefinition, ColumnMode, ColumnType, SchemaAccumulator, Shape};
pub use transform::{RecordStage, StageRegistry};
pub use types::{PipelineConfig, Record};

/// Main entry point: load an NDJSON stream into a sink using the built-in
/// stage registry, inferring columns unless `precomputed` is given
pub fn load_ndjson<R: BufRead, K: ChunkSink>(
    reader: R,
    sink: K,
    config: &PipelineConfig,
    precomputed: Option<Vec<ColumnDefinition>>,
) -> Result<LoadSummary> {
    let pipeline = Pipeline::new(config, &StageRegistry::with_builtins())?;
    let mut source = NdjsonSource::new(reader);
    pipeline.load(&mut source, sink, precomputed)
}
