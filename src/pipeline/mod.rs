//! Streaming pipeline: source -> stage chain -> {schema capture, NDJSON + gzip sink}
//!
//! The run is a single pull loop. Each record is fully delivered to both
//! branches before the next one is requested, so memory in flight does not
//! grow with the size of the input.

pub mod orchestrator;
pub mod sink;
pub mod source;

pub use orchestrator::{LoadSummary, Pipeline, RunStats};
pub use sink::{ChunkSink, FileSink, MemorySink, NdjsonWriter};
pub use source::{from_records, NdjsonSource, RecordIter, RecordSource};
