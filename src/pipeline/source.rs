use crate::error::SourceError;
use crate::types::Record;
use serde_json::Value;
use std::io::BufRead;

/// Pull interface to whatever produces records
pub trait RecordSource {
    /// The next record, or `None` once the source is exhausted
    fn next_record(&mut self) -> Result<Option<Record>, SourceError>;
}

/// Reads newline-delimited JSON, one object per line; blank lines are skipped
pub struct NdjsonSource<R: BufRead> {
    reader: R,
    buffer: String,
    line: usize,
}

impl<R: BufRead> NdjsonSource<R> {
    pub fn new(reader: R) -> Self {
        NdjsonSource {
            reader,
            buffer: String::new(),
            line: 0,
        }
    }

    /// Number of lines consumed so far
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> RecordSource for NdjsonSource<R> {
    fn next_record(&mut self) -> Result<Option<Record>, SourceError> {
        loop {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let trimmed = self.buffer.trim();
            if trimmed.is_empty() {
                continue;
            }

            // simd-json parses in place, so it needs an owned, mutable copy
            let mut bytes = trimmed.as_bytes().to_vec();
            let value: Value = simd_json::serde::from_slice(&mut bytes).map_err(|e| {
                SourceError::Malformed {
                    line: self.line,
                    message: e.to_string(),
                }
            })?;

            return match value {
                Value::Object(record) => Ok(Some(record)),
                _ => Err(SourceError::NotAnObject { line: self.line }),
            };
        }
    }
}

/// Adapts any iterator of records (or record results) into a source
pub struct RecordIter<I> {
    inner: I,
}

impl<I> RecordIter<I>
where
    I: Iterator<Item = Result<Record, SourceError>>,
{
    pub fn new(inner: I) -> Self {
        RecordIter { inner }
    }
}

impl<I> RecordSource for RecordIter<I>
where
    I: Iterator<Item = Result<Record, SourceError>>,
{
    fn next_record(&mut self) -> Result<Option<Record>, SourceError> {
        self.inner.next().transpose()
    }
}

/// Source over records that are already in memory
pub fn from_records<I>(records: I) -> RecordIter<impl Iterator<Item = Result<Record, SourceError>>>
where
    I: IntoIterator<Item = Record>,
{
    RecordIter::new(records.into_iter().map(Ok))
}
