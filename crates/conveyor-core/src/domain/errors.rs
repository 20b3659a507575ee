use std::time::Duration;

use thiserror::Error;

use super::{JobName, TaskId};

/// Error kinds of the task queue core.
///
/// Propagation policy:
/// - `NotFound` and malformed input surface directly to the API/CLI
///   caller.
/// - `UnresolvableJob`, `ExecutionFailure` and `ExecutionTimeout` are
///   captured per task (recorded as a Failed status) so the worker loop
///   keeps running.
/// - `Serialization` is fatal for the single stored record it concerns,
///   never for the loop or the API process.
#[derive(Debug, Error)]
pub enum ConveyorError {
    #[error("no task found for identifier={0}")]
    NotFound(TaskId),

    #[error("no job registered for name={0}")]
    UnresolvableJob(JobName),

    #[error("duplicate job registration for name={0}")]
    DuplicateJob(JobName),

    #[error("job execution failed: {0}")]
    ExecutionFailure(String),

    #[error("job execution exceeded {}s", .0.as_secs())]
    ExecutionTimeout(Duration),

    #[error("malformed stored task: {0}")]
    Serialization(String),
}

impl ConveyorError {
    /// Shorthand for job implementations reporting a failure cause.
    pub fn execution(cause: impl Into<String>) -> Self {
        Self::ExecutionFailure(cause.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_offending_name() {
        let err = ConveyorError::UnresolvableJob(JobName::new("GhostJob"));
        assert_eq!(err.to_string(), "no job registered for name=GhostJob");

        let err = ConveyorError::ExecutionTimeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "job execution exceeded 30s");
    }
}
