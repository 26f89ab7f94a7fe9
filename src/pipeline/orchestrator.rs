use crate::error::{LoadError, Result};
use crate::pipeline::sink::{ChunkSink, NdjsonWriter};
use crate::pipeline::source::RecordSource;
use crate::schema::{ColumnDefinition, SchemaAccumulator};
use crate::transform::{
    DenullifyStage, FlattenStage, IdentityStage, RecordStage, SanitizeNamesStage, StageRegistry,
};
use crate::types::{PipelineConfig, Record};
use tracing::{debug, info, warn};

const PROGRESS_INTERVAL: usize = 10_000;

/// Counters for one finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub records: usize,
    pub bytes_written: u64,
}

/// Everything a caller needs to submit a load job
#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub records: usize,
    pub bytes_written: u64,
    pub columns: Vec<ColumnDefinition>,
}

/// The stage chain plus the two branches it feeds.
///
/// A pipeline drives exactly one run: records are pulled one at a time,
/// passed through every stage, then handed to the schema-capture branch
/// and the serialization branch before the next record is pulled.
pub struct Pipeline {
    stages: Vec<Box<dyn RecordStage>>,
    compression_level: u32,
}

impl Pipeline {
    /// Compose the stage chain in its fixed order: identity rewrite, name
    /// sanitizer, null removal, flattening, then custom stages as listed.
    pub fn new(config: &PipelineConfig, registry: &StageRegistry) -> Result<Self> {
        if config.compression_level > 9 {
            return Err(LoadError::Config(format!(
                "compression level must be 0-9, got {}",
                config.compression_level
            )));
        }

        let mut stages: Vec<Box<dyn RecordStage>> = vec![
            Box::new(IdentityStage::new(config.id_field.clone())),
            Box::new(SanitizeNamesStage),
        ];
        if config.remove_nulls {
            stages.push(Box::new(DenullifyStage));
        }
        if config.flatten_objects {
            stages.push(Box::new(FlattenStage::new(config.skip_arrays)));
        }
        stages.extend(registry.build(&config.custom_stages)?);

        Ok(Pipeline {
            stages,
            compression_level: config.compression_level,
        })
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run the pipeline, inferring the schema unless `precomputed` is given.
    ///
    /// With a precomputed column list the schema-capture branch is skipped
    /// entirely and the list is returned unchanged.
    pub fn load<S, K>(
        self,
        source: &mut S,
        sink: K,
        precomputed: Option<Vec<ColumnDefinition>>,
    ) -> Result<LoadSummary>
    where
        S: RecordSource,
        K: ChunkSink,
    {
        let (stats, columns) = match precomputed {
            Some(columns) => {
                info!(columns = columns.len(), "using precomputed schema");
                (self.run(source, sink, None)?, columns)
            }
            None => {
                let mut accumulator = SchemaAccumulator::new();
                let stats = self.run(source, sink, Some(&mut accumulator))?;
                (stats, accumulator.get()?)
            }
        };

        Ok(LoadSummary {
            records: stats.records,
            bytes_written: stats.bytes_written,
            columns,
        })
    }

    /// Drive the run to completion.
    ///
    /// The accumulator, when given, sees every record in order; it is final
    /// once this returns `Ok`. The first error stops the run and the sink is
    /// never told the stream finished. Stages are closed before returning in
    /// either case.
    pub fn run<S, K>(
        mut self,
        source: &mut S,
        sink: K,
        accumulator: Option<&mut SchemaAccumulator>,
    ) -> Result<RunStats>
    where
        S: RecordSource,
        K: ChunkSink,
    {
        info!(
            stages = ?self.stage_names(),
            infer_schema = accumulator.is_some(),
            "starting pipeline"
        );

        let mut writer = NdjsonWriter::new(sink, self.compression_level);
        let result = match self.drive(source, accumulator, &mut writer) {
            Ok(records) => writer
                .finish()
                .map(|bytes_written| RunStats {
                    records,
                    bytes_written,
                })
                .map_err(LoadError::from),
            Err(e) => {
                writer.abort();
                Err(e)
            }
        };

        for stage in &mut self.stages {
            stage.close();
        }

        match &result {
            Ok(stats) => info!(
                records = stats.records,
                bytes = stats.bytes_written,
                "pipeline finished"
            ),
            Err(e) => warn!(error = %e, "pipeline aborted"),
        }
        result
    }

    fn drive<S, K>(
        &mut self,
        source: &mut S,
        mut accumulator: Option<&mut SchemaAccumulator>,
        writer: &mut NdjsonWriter<K>,
    ) -> Result<usize>
    where
        S: RecordSource,
        K: ChunkSink,
    {
        let mut count = 0;

        while let Some(record) = source.next_record()? {
            let record = self.transform(record)?;

            if let Some(acc) = accumulator.as_deref_mut() {
                acc.add(&record);
            }
            writer.write_record(&record)?;

            count += 1;
            if count % PROGRESS_INTERVAL == 0 {
                debug!(records = count, bytes = writer.bytes_written(), "progress");
            }
        }

        Ok(count)
    }

    fn transform(&mut self, mut record: Record) -> Result<Record> {
        for stage in &mut self.stages {
            record = stage.apply(record)?;
        }
        Ok(record)
    }
}
