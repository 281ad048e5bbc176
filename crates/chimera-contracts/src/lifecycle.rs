//! Per-node lifecycle states tracked by the orchestrator.
//!
//! State lives on the graph node, never on the manifest.

use serde::{Deserialize, Serialize};

use crate::result::ResultStatus;

/// Lifecycle of one task node.
///
/// `Pending → Ready → Dispatched → {Succeeded, Failed, Escalated, TimedOut}`.
/// `Cancelled` is reachable from any non-terminal state by abort or replan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Pending,
    Ready,
    Dispatched,
    Succeeded,
    Failed,
    Escalated,
    TimedOut,
    Cancelled,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Succeeded
                | TaskState::Failed
                | TaskState::Escalated
                | TaskState::TimedOut
                | TaskState::Cancelled
        )
    }

    /// Terminal states other than `Succeeded` keep dependents from advancing.
    pub fn blocks_dependents(self) -> bool {
        self.is_terminal() && self != TaskState::Succeeded
    }

    /// The terminal state a validated result moves a dispatched task into.
    pub fn from_status(status: ResultStatus) -> Self {
        match status {
            ResultStatus::Success => TaskState::Succeeded,
            ResultStatus::Failed => TaskState::Failed,
            ResultStatus::Escalated => TaskState::Escalated,
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskState::Pending => "PENDING",
            TaskState::Ready => "READY",
            TaskState::Dispatched => "DISPATCHED",
            TaskState::Succeeded => "SUCCEEDED",
            TaskState::Failed => "FAILED",
            TaskState::Escalated => "ESCALATED",
            TaskState::TimedOut => "TIMED_OUT",
            TaskState::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}
