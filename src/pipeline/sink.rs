//! Serialization branch: records become NDJSON lines, the byte stream is
//! gzip-compressed and pushed chunk by chunk into a [`ChunkSink`].

use crate::error::SinkError;
use crate::types::Record;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Push interface to the destination of the serialized stream
pub trait ChunkSink {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()>;

    /// Signal that the stream is complete. Not called when a run aborts.
    fn finish(&mut self) -> io::Result<()>;
}

impl<K: ChunkSink + ?Sized> ChunkSink for &mut K {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        (**self).write_chunk(chunk)
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}

/// Writes the stream to a local file
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(FileSink {
            writer: BufWriter::new(File::create(path)?),
        })
    }
}

impl ChunkSink for FileSink {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.writer.write_all(chunk)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()
    }
}

/// Collects the stream in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub bytes: Vec<u8>,
    pub finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChunkSink for MemorySink {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.bytes.extend_from_slice(chunk);
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.finished = true;
        Ok(())
    }
}

/// `Write` adapter counting the compressed bytes handed to the sink
struct ChunkWriter<K> {
    sink: K,
    written: u64,
    /// Set on abort; anything the encoder flushes afterwards is dropped
    discard: bool,
}

impl<K: ChunkSink> Write for ChunkWriter<K> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.discard {
            return Ok(buf.len());
        }
        self.sink.write_chunk(buf)?;
        self.written += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Serializes records as NDJSON through a gzip encoder into a sink
pub struct NdjsonWriter<K: ChunkSink> {
    encoder: GzEncoder<ChunkWriter<K>>,
    line: Vec<u8>,
}

impl<K: ChunkSink> NdjsonWriter<K> {
    pub fn new(sink: K, level: u32) -> Self {
        NdjsonWriter {
            encoder: GzEncoder::new(
                ChunkWriter {
                    sink,
                    written: 0,
                    discard: false,
                },
                Compression::new(level),
            ),
            line: Vec::new(),
        }
    }

    /// Serialize one record as a single line
    pub fn write_record(&mut self, record: &Record) -> Result<(), SinkError> {
        self.line.clear();
        serde_json::to_writer(&mut self.line, record)?;
        self.line.push(b'\n');
        self.encoder.write_all(&self.line)?;
        Ok(())
    }

    /// Compressed bytes handed to the sink so far
    pub fn bytes_written(&self) -> u64 {
        self.encoder.get_ref().written
    }

    /// Flush the gzip trailer, then tell the sink the stream is complete.
    ///
    /// Returns the total number of compressed bytes written.
    pub fn finish(self) -> Result<u64, SinkError> {
        let mut inner = self.encoder.finish()?;
        inner.sink.finish()?;
        Ok(inner.written)
    }

    /// Drop the writer without completing the stream.
    ///
    /// Neither the pending compressed data nor the gzip trailer reach the
    /// sink, so what was written so far never decodes as a whole stream.
    pub fn abort(mut self) {
        self.encoder.get_mut().discard = true;
    }
}
