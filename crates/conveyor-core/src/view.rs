//! External task form served by the control-plane.
//!
//! Serialize-only by design: this shape is for operators' eyes and must
//! never be fed back into [`crate::codec`].

use serde::Serialize;

use crate::domain::{Parameters, Tags, Task};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Read-only representation of a task for API and CLI output.
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    pub identifier: String,
    pub status: String,
    pub profile: String,
    /// Raw job reference name, unchanged.
    pub job: String,
    pub date: String,
    pub parameters: Parameters,
    pub tags: Tags,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            identifier: task.id().to_string(),
            status: task.status().to_string(),
            profile: task.profile().to_string(),
            job: task.job().to_string(),
            date: task.created_at_formatted(DATE_FORMAT),
            parameters: task.parameters().clone(),
            tags: task.tags().clone(),
        }
    }
}
