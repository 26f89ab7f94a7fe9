//! Record sanitizing stages
//!
//! Every stage is a 1:1 transformer: one record in, one record out. The
//! built-in stages never fail on well-formed records; custom stages may, and
//! a failure aborts the whole run.

pub mod created_on;
pub mod denullify;
pub mod flatten;
pub mod identity;
pub mod names;
pub mod registry;

use crate::error::StageError;
use crate::types::Record;

pub use created_on::CreatedOnStage;
pub use denullify::{denullify, DenullifyStage};
pub use flatten::{flatten, FlattenStage};
pub use identity::IdentityStage;
pub use names::{sanitize_key, sanitize_names, SanitizeNamesStage};
pub use registry::{StageFactory, StageRegistry};

/// A single step of the record chain
pub trait RecordStage {
    /// Identifier used in logs and errors
    fn name(&self) -> &str;

    fn apply(&mut self, record: Record) -> Result<Record, StageError>;

    /// Release anything the stage holds open. Called once when the run
    /// ends, whether it succeeded or aborted.
    fn close(&mut self) {}
}
