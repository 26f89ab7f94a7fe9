use thiserror::Error;

/// Failure pulling the next record from the source
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error reading source: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed record on line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("line {line} is not a JSON object")]
    NotAnObject { line: usize },

    #[error("source failed: {0}")]
    Other(String),
}

/// A sanitizing or custom stage rejected a record
#[derive(Error, Debug)]
#[error("stage '{stage}' failed: {message}")]
pub struct StageError {
    pub stage: String,
    pub message: String,
}

impl StageError {
    pub fn new(stage: impl Into<String>, message: impl Into<String>) -> Self {
        StageError {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

/// The sink rejected a chunk or failed to complete
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// The column generator rejected the accumulated shape, or a precomputed
/// column list could not be read
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("field '{path}' is an object with no fields")]
    EmptyRecord { path: String },

    #[error("field '{path}' is an array nested directly in an array")]
    NestedArray { path: String },

    #[error("invalid column definitions: {0}")]
    InvalidColumns(#[from] serde_json::Error),
}

/// The single error a pipeline run surfaces to its caller
#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("unknown custom stage '{0}'")]
    UnknownStage(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LoadError>;
