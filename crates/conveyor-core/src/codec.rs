//! Storage codec: the round-trip form a task takes when it crosses a
//! process boundary through the queue.
//!
//! This is one of two serialization paths. The other, the read-only
//! external form in [`crate::view`], is never decoded back into a task;
//! keep the two apart.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ConveyorError, JobName, Parameters, Profile, Status, Tags, Task, TaskId};
use crate::runtime::JobRegistry;

/// Version tag leading every stored record. Bump on any layout change;
/// decode rejects versions it does not know instead of misreading them.
pub const STORAGE_VERSION: u8 = 1;

/// The ordered on-wire tuple:
/// `(version, identifier, status, profile, job, created_at, parameters, tags)`.
#[derive(Serialize, Deserialize)]
struct StoredTask(
    u8,
    TaskId,
    Status,
    Profile,
    JobName,
    DateTime<Utc>,
    Parameters,
    Tags,
);

/// Encodes tasks for storage and reconstructs them on the far side.
///
/// Decoding consults the job registry: a stored record whose job name
/// is not registered in this process cannot be executed, and failing
/// here with a distinct error beats handing out an unusable task.
#[derive(Clone)]
pub struct TaskCodec {
    registry: Arc<JobRegistry>,
}

impl TaskCodec {
    pub fn new(registry: Arc<JobRegistry>) -> Self {
        Self { registry }
    }

    pub fn encode(&self, task: &Task) -> Result<Vec<u8>, ConveyorError> {
        let stored = StoredTask(
            STORAGE_VERSION,
            task.id(),
            task.status(),
            task.profile().clone(),
            task.job().clone(),
            task.created_at(),
            task.parameters().clone(),
            task.tags().clone(),
        );
        serde_json::to_vec(&stored).map_err(|e| ConveyorError::Serialization(e.to_string()))
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Task, ConveyorError> {
        let StoredTask(version, id, status, profile, job, created_at, parameters, tags) =
            serde_json::from_slice(bytes)
                .map_err(|e| ConveyorError::Serialization(e.to_string()))?;

        if version != STORAGE_VERSION {
            return Err(ConveyorError::Serialization(format!(
                "unsupported storage version {version} (expected {STORAGE_VERSION})"
            )));
        }
        if !self.registry.contains(&job) {
            return Err(ConveyorError::UnresolvableJob(job));
        }

        Ok(Task::restore(
            id, status, profile, job, created_at, parameters, tags,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn registry_with(names: &[&str]) -> Arc<JobRegistry> {
        struct Noop;

        #[async_trait::async_trait]
        impl crate::runtime::ExecutableJob for Noop {
            async fn run(&self, _parameters: &Parameters) -> Result<(), ConveyorError> {
                Ok(())
            }
        }

        let mut registry = JobRegistry::new();
        for name in names {
            registry.register(*name, || Box::new(Noop)).unwrap();
        }
        Arc::new(registry)
    }

    fn assert_field_equal(a: &Task, b: &Task) {
        assert_eq!(a.id(), b.id());
        assert_eq!(a.status(), b.status());
        assert_eq!(a.profile(), b.profile());
        assert_eq!(a.job(), b.job());
        assert_eq!(a.created_at(), b.created_at());
        assert_eq!(a.parameters(), b.parameters());
        assert_eq!(a.tags(), b.tags());
    }

    #[rstest]
    #[case::waiting(Status::Waiting)]
    #[case::running(Status::Running)]
    #[case::succeeded(Status::Succeeded)]
    #[case::failed(Status::Failed)]
    fn round_trips_in_every_status(#[case] status: Status) {
        let codec = TaskCodec::new(registry_with(&["SendEmailJob"]));

        let mut task = Task::new(
            Profile::new("exports"),
            JobName::new("SendEmailJob"),
            [("to", json!("a@b.com")), ("retries", json!(2))]
                .into_iter()
                .collect(),
            ["email", "reporting"].into_iter().collect(),
        );
        task.set_status(status);

        let decoded = codec.decode(&codec.encode(&task).unwrap()).unwrap();
        assert_field_equal(&task, &decoded);
    }

    #[test]
    fn round_trips_with_empty_bags() {
        let codec = TaskCodec::new(registry_with(&["Cleanup"]));

        let task = Task::new(
            Profile::default(),
            JobName::new("Cleanup"),
            Parameters::new(),
            Tags::new(),
        );

        let decoded = codec.decode(&codec.encode(&task).unwrap()).unwrap();
        assert_field_equal(&task, &decoded);
        assert!(decoded.parameters().is_empty());
        assert!(decoded.tags().is_empty());
    }

    #[test]
    fn encoded_form_is_the_ordered_tuple() {
        let codec = TaskCodec::new(registry_with(&["Cleanup"]));
        let task = Task::new(
            Profile::default(),
            JobName::new("Cleanup"),
            Parameters::new(),
            Tags::new(),
        );

        let value: serde_json::Value =
            serde_json::from_slice(&codec.encode(&task).unwrap()).unwrap();
        let tuple = value.as_array().unwrap();

        assert_eq!(tuple.len(), 8);
        assert_eq!(tuple[0], json!(STORAGE_VERSION));
        assert_eq!(tuple[1], json!(task.id().to_string()));
        assert_eq!(tuple[2], json!("waiting"));
        assert_eq!(tuple[3], json!("default"));
        assert_eq!(tuple[4], json!("Cleanup"));
    }

    #[test]
    fn unregistered_job_name_fails_with_a_distinct_error() {
        let writer = TaskCodec::new(registry_with(&["SendEmailJob"]));
        let reader = TaskCodec::new(registry_with(&["Cleanup"]));

        let task = Task::new(
            Profile::default(),
            JobName::new("SendEmailJob"),
            Parameters::new(),
            Tags::new(),
        );

        let err = reader.decode(&writer.encode(&task).unwrap()).unwrap_err();
        assert!(matches!(err, ConveyorError::UnresolvableJob(_)));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let codec = TaskCodec::new(registry_with(&["Cleanup"]));
        let task = Task::new(
            Profile::default(),
            JobName::new("Cleanup"),
            Parameters::new(),
            Tags::new(),
        );

        let mut value: serde_json::Value =
            serde_json::from_slice(&codec.encode(&task).unwrap()).unwrap();
        value[0] = json!(99);

        let err = codec
            .decode(&serde_json::to_vec(&value).unwrap())
            .unwrap_err();
        assert!(matches!(err, ConveyorError::Serialization(_)));
    }

    #[test]
    fn garbage_is_a_serialization_error() {
        let codec = TaskCodec::new(registry_with(&[]));
        let err = codec.decode(b"not json at all").unwrap_err();
        assert!(matches!(err, ConveyorError::Serialization(_)));
    }
}
