//! Job execution contract: the `ExecutableJob` trait and the name ->
//! factory registry workers resolve against.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{ConveyorError, JobName, Parameters};

/// A unit of executable work.
///
/// Implementations receive the task's parameters and report success or
/// a failure cause; they never see or mutate the task itself.
#[async_trait]
pub trait ExecutableJob: Send + Sync {
    async fn run(&self, parameters: &Parameters) -> Result<(), ConveyorError>;
}

/// Factory producing a fresh job instance per execution.
pub type JobFactory = Box<dyn Fn() -> Box<dyn ExecutableJob> + Send + Sync>;

/// Registry of job factories (stable name -> factory).
///
/// Design:
/// - Built during process startup (mutable).
/// - Used during runtime (immutable, behind an `Arc`).
/// This avoids locks and keeps resolution a plain map lookup.
#[derive(Default)]
pub struct JobRegistry {
    factories: HashMap<String, JobFactory>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory under a stable name.
    ///
    /// Registering the same name twice is a programmer error, not a
    /// "last wins" overwrite.
    pub fn register<F>(&mut self, name: impl Into<JobName>, factory: F) -> Result<(), ConveyorError>
    where
        F: Fn() -> Box<dyn ExecutableJob> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(name.as_str()) {
            return Err(ConveyorError::DuplicateJob(name));
        }
        self.factories.insert(name.as_str().to_string(), Box::new(factory));
        Ok(())
    }

    /// Materialize an executable instance for a job name.
    pub fn resolve(&self, name: &JobName) -> Result<Box<dyn ExecutableJob>, ConveyorError> {
        let factory = self
            .factories
            .get(name.as_str())
            .ok_or_else(|| ConveyorError::UnresolvableJob(name.clone()))?;
        Ok(factory())
    }

    pub fn contains(&self, name: &JobName) -> bool {
        self.factories.contains_key(name.as_str())
    }

    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
