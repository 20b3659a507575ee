//! Queue port and the in-memory implementation.

mod memory;

pub use memory::InMemoryQueue;

use async_trait::async_trait;

use crate::domain::{ConveyorError, Profile, Status, Task, TaskId};
use crate::observability::QueueCounts;

/// Filter for task enumeration.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub profile: Option<Profile>,
    pub status: Option<Status>,
    pub tag: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(profile) = &self.profile
            && task.profile() != profile
        {
            return false;
        }
        if let Some(status) = self.status
            && task.status() != status
        {
            return false;
        }
        if let Some(tag) = &self.tag
            && !task.has_tag(tag)
        {
            return false;
        }
        true
    }
}

/// Queue port (interface).
///
/// The in-memory implementation below is the development backend; this
/// trait is the seam for swapping in a real broker later. Implementors
/// must provide:
/// - exclusive reservation (no two workers receive the same task),
/// - atomic per-task writes for `enqueue` and `update`.
#[async_trait]
pub trait Queue: Send + Sync {
    /// Store a new task and make it reservable.
    async fn enqueue(&self, task: Task) -> Result<(), ConveyorError>;

    /// Claim the next waiting task, restricted to one lane when
    /// `profile` is given. Suspends until a task is available; returns
    /// `None` once the queue has shut down.
    async fn reserve(&self, profile: Option<&Profile>) -> Option<Task>;

    /// Persist a status transition. A stored terminal status is never
    /// overwritten; such writes are ignored.
    async fn update(&self, task: &Task) -> Result<(), ConveyorError>;

    /// Look a task up by identifier.
    async fn find(&self, id: TaskId) -> Result<Task, ConveyorError>;

    /// Enumerate stored tasks, oldest first.
    async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>, ConveyorError>;

    /// Observability hook: task counts by status.
    async fn counts(&self) -> Result<QueueCounts, ConveyorError>;
}
