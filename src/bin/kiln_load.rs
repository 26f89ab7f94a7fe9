//! kiln-load: Prepare an NDJSON document dump for a warehouse load job
//!
//! Sanitizes every record, writes the result as gzip-compressed NDJSON and
//! infers the table's column definitions in the same pass.
//!
//! Usage:
//!   # Read from file, write data and inferred schema
//!   kiln-load dump.jsonl --output data.json.gz --schema-out schema.json
//!
//!   # Read from stdin, flatten nested objects, only print the schema
//!   cat dump.jsonl | kiln-load --transform-flatten-objects --dump-schema
//!
//!   # Skip inference and reuse an existing column list
//!   kiln-load dump.jsonl --output data.json.gz --schema schema.json

// Use MiMalloc allocator for better performance
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use kiln::pipeline::{FileSink, MemorySink};
use kiln::schema::read_columns;
use kiln::{ChunkSink, LoadSummary, PipelineConfig, StageRegistry};
use std::fs::File;
use std::io::{stdin, BufRead, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kiln-load")]
#[command(about = "Sanitize documents and infer a warehouse schema in one pass", long_about = None)]
struct Args {
    /// Input NDJSON file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Gzip NDJSON output file
    #[arg(long, short = 'o')]
    output: Option<String>,

    /// Write the column definitions to this file
    #[arg(long)]
    schema_out: Option<String>,

    /// Use a precomputed column list instead of inferring one
    #[arg(long, value_name = "FILE")]
    schema: Option<String>,

    /// Print the column definitions to stdout
    #[arg(long)]
    dump_schema: bool,

    /// Native identifier field rewritten to `id`
    #[arg(long, default_value = "_id")]
    id_field: String,

    /// Flatten nested objects into dot-joined columns
    #[arg(long)]
    transform_flatten_objects: bool,

    /// Keep arrays intact while flattening
    #[arg(long, requires = "transform_flatten_objects")]
    transform_skip_arrays: bool,

    /// Keep null values instead of removing them
    #[arg(long)]
    no_transform_remove_nulls: bool,

    /// Add a registered custom stage (repeatable, applied in order)
    #[arg(long = "transform", value_name = "NAME")]
    transforms: Vec<String>,

    /// Gzip compression level (0-9)
    #[arg(long, default_value_t = 6)]
    compression_level: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kiln=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let registry = StageRegistry::with_builtins();
    for name in &args.transforms {
        if !registry.contains(name) {
            bail!(
                "unknown transform '{}', available: {}",
                name,
                registry.names().join(", ")
            );
        }
    }

    let config = PipelineConfig {
        id_field: args.id_field.clone(),
        remove_nulls: !args.no_transform_remove_nulls,
        flatten_objects: args.transform_flatten_objects,
        skip_arrays: args.transform_skip_arrays,
        custom_stages: args.transforms.clone(),
        compression_level: args.compression_level,
    };

    let precomputed = match &args.schema {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("Failed to open schema: {}", path))?;
            Some(read_columns(BufReader::new(file)).context("Failed to read schema")?)
        }
        None => None,
    };

    if args.output.is_none() && !args.dump_schema && args.schema_out.is_none() {
        bail!("nothing to do: pass --output, --schema-out or --dump-schema");
    }

    let reader: Box<dyn BufRead> = if let Some(file_path) = &args.input {
        let file = File::open(file_path).with_context(|| format!("Failed to open input: {}", file_path))?;
        Box::new(BufReader::new(file))
    } else {
        Box::new(BufReader::new(stdin()))
    };

    let summary = match &args.output {
        Some(path) => {
            let sink = FileSink::create(path).with_context(|| format!("Failed to create output: {}", path))?;
            run(reader, sink, &config, precomputed)?
        }
        // Schema only: the compressed stream is still produced but discarded
        None => run(reader, MemorySink::new(), &config, precomputed)?,
    };

    info!(
        records = summary.records,
        bytes = summary.bytes_written,
        columns = summary.columns.len(),
        "load prepared"
    );

    if let Some(path) = &args.schema_out {
        let file = File::create(path).with_context(|| format!("Failed to create schema file: {}", path))?;
        serde_json::to_writer_pretty(file, &summary.columns)?;
    }

    if args.dump_schema {
        println!("{}", serde_json::to_string_pretty(&summary.columns)?);
    }

    Ok(())
}

fn run<K: ChunkSink>(
    reader: Box<dyn BufRead>,
    sink: K,
    config: &PipelineConfig,
    precomputed: Option<Vec<kiln::ColumnDefinition>>,
) -> Result<LoadSummary> {
    kiln::load_ndjson(reader, sink, config, precomputed).map_err(|e| {
        warn!(error = %e, "load aborted; output written so far is incomplete and should be removed");
        anyhow::Error::new(e)
    })
}
