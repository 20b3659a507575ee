//! The task aggregate.

use chrono::{DateTime, Utc};
use std::fmt;
use std::hash::{Hash, Hasher};

use super::{JobName, Parameters, Profile, Status, Tags, TaskId};

/// A unit of work exchanged between producer, queue and worker.
///
/// Every field except `status` is fixed at construction. The status
/// setter performs no transition validation on purpose: legality is the
/// worker loop's responsibility, which keeps `Task` a plain value
/// holder that can cross process boundaries through the codec.
#[derive(Debug, Clone)]
pub struct Task {
    id: TaskId,
    status: Status,
    profile: Profile,
    job: JobName,
    created_at: DateTime<Utc>,
    parameters: Parameters,
    tags: Tags,
}

impl Task {
    /// Construct a new task: fresh identifier, Waiting status, current
    /// timestamp.
    pub fn new(profile: Profile, job: JobName, parameters: Parameters, tags: Tags) -> Self {
        Self {
            id: TaskId::generate(),
            status: Status::Waiting,
            profile,
            job,
            created_at: Utc::now(),
            parameters,
            tags,
        }
    }

    /// Rebuild a task from its stored fields. Codec use only; producers
    /// go through [`Task::new`].
    pub(crate) fn restore(
        id: TaskId,
        status: Status,
        profile: Profile,
        job: JobName,
        created_at: DateTime<Utc>,
        parameters: Parameters,
        tags: Tags,
    ) -> Self {
        Self {
            id,
            status,
            profile,
            job,
            created_at,
            parameters,
            tags,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Replace the status. No validation here; callers must only invoke
    /// legal transitions.
    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn job(&self) -> &JobName {
        &self.job
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Creation timestamp rendered with a chrono format string.
    pub fn created_at_formatted(&self, format: &str) -> String {
        self.created_at.format(format).to_string()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameter(&self, key: &str) -> Option<&serde_json::Value> {
        self.parameters.get(key)
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.has(tag)
    }
}

/// Two instances are the same logical task iff their identifiers are
/// equal; no structural equality is defined.
impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Task {}

impl Hash for Task {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.id.fmt(f)
    }
}
