//! Named factories for custom stages.
//!
//! Custom stages are looked up by name when a pipeline is built, so an
//! unknown name fails before any record is pulled.

use crate::error::LoadError;
use crate::transform::{CreatedOnStage, RecordStage};
use std::collections::HashMap;

/// Builds a fresh stage instance for one run
pub type StageFactory = Box<dyn Fn() -> Box<dyn RecordStage>>;

pub struct StageRegistry {
    factories: HashMap<String, StageFactory>,
}

impl StageRegistry {
    /// An empty registry
    pub fn new() -> Self {
        StageRegistry {
            factories: HashMap::new(),
        }
    }

    /// A registry holding the stages shipped with the crate
    pub fn with_builtins() -> Self {
        let mut registry = StageRegistry::new();
        registry.register(CreatedOnStage::NAME, || Box::new(CreatedOnStage));
        registry
    }

    /// Register a factory under `name`, replacing any previous one
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn RecordStage> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Instantiate the named stages in order.
    ///
    /// Every name is checked before any stage is constructed.
    pub fn build(&self, names: &[String]) -> Result<Vec<Box<dyn RecordStage>>, LoadError> {
        if let Some(unknown) = names.iter().find(|name| !self.contains(name)) {
            return Err(LoadError::UnknownStage(unknown.clone()));
        }

        Ok(names
            .iter()
            .filter_map(|name| self.factories.get(name))
            .map(|factory| factory())
            .collect())
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
