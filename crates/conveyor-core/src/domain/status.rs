//! Task lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle phase of a task.
///
/// Transitions:
/// - Waiting -> Running (a reservation succeeded; exclusive claim)
/// - Running -> Succeeded (job returned normally)
/// - Running -> Failed (job errored, was unresolvable, or timed out)
///
/// The enum itself performs no transition validation; legality is owned
/// by the worker loop, and the queue guards terminal statuses on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Enqueued, not yet claimed by any worker.
    Waiting,

    /// Claimed and currently being executed by exactly one worker.
    Running,

    /// Executed to normal completion.
    Succeeded,

    /// Execution errored, timed out, or the job was unresolvable.
    Failed,
}

impl Status {
    /// Terminal statuses are never overwritten by a non-terminal one.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Succeeded | Status::Failed)
    }

    /// Is this task eligible for reservation?
    pub fn is_runnable(self) -> bool {
        matches!(self, Status::Waiting)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Waiting => "waiting",
            Status::Running => "running",
            Status::Succeeded => "succeeded",
            Status::Failed => "failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_lowercase_names() {
        assert_eq!(serde_json::to_string(&Status::Waiting).unwrap(), "\"waiting\"");
        assert_eq!(serde_json::to_string(&Status::Running).unwrap(), "\"running\"");
        assert_eq!(serde_json::to_string(&Status::Succeeded).unwrap(), "\"succeeded\"");
        assert_eq!(serde_json::to_string(&Status::Failed).unwrap(), "\"failed\"");
    }

    #[test]
    fn round_trips_through_serde() {
        for status in [Status::Waiting, Status::Running, Status::Succeeded, Status::Failed] {
            let json = serde_json::to_string(&status).unwrap();
            let back: Status = serde_json::from_str(&json).unwrap();
            assert_eq!(status, back);
        }
    }

    #[test]
    fn terminal_statuses() {
        assert!(!Status::Waiting.is_terminal());
        assert!(!Status::Running.is_terminal());
        assert!(Status::Succeeded.is_terminal());
        assert!(Status::Failed.is_terminal());
    }

    #[test]
    fn only_waiting_is_runnable() {
        assert!(Status::Waiting.is_runnable());
        assert!(!Status::Running.is_runnable());
        assert!(!Status::Succeeded.is_runnable());
        assert!(!Status::Failed.is_runnable());
    }
}
