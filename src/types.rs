use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One document pulled from the source: an insertion-ordered mapping
pub type Record = Map<String, Value>;

/// Configuration for the sanitizing stage chain and serialization branch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Name of the source's native unique-identifier field
    pub id_field: String,

    /// Whether null values (and branches emptied by removing them) are dropped
    pub remove_nulls: bool,

    /// Whether nested objects are collapsed into dot-joined columns
    pub flatten_objects: bool,

    /// Leave array-valued fields intact while flattening
    pub skip_arrays: bool,

    /// Registered custom stages, applied in this order after the built-ins
    pub custom_stages: Vec<String>,

    /// Gzip level for the serialized output (0-9)
    pub compression_level: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            id_field: String::from("_id"),
            remove_nulls: true,
            flatten_objects: false,
            skip_arrays: false,
            custom_stages: vec![],
            compression_level: 6,
        }
    }
}

impl PipelineConfig {
    pub fn with_custom_stage(mut self, name: impl Into<String>) -> Self {
        self.custom_stages.push(name.into());
        self
    }
}
