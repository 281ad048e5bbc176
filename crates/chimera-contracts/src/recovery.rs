//! Recovery decision types.
//!
//! When a task ends in a blocking terminal state the orchestrator asks its
//! recovery policy what to do with the rest of the campaign.

use serde::{Deserialize, Serialize};

use crate::{
    campaign::CampaignId,
    task::{TaskId, TaskType},
};

/// The blocking terminal outcome that triggered a recovery decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureOutcome {
    Failed,
    TimedOut,
    Escalated,
}

impl std::fmt::Display for FailureOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureOutcome::Failed => f.write_str("failed"),
            FailureOutcome::TimedOut => f.write_str("timed-out"),
            FailureOutcome::Escalated => f.write_str("escalated"),
        }
    }
}

/// What the orchestrator should do after a blocking outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryAction {
    /// Leave dependents `PENDING`. They stay blocked until an external actor intervenes.
    Block,
    /// Cancel every non-terminal task of the campaign.
    Abort { reason: String },
    /// Cancel the transitive dependents so the surrounding system can re-plan them.
    Replan { reason: String },
}

/// Everything a recovery policy needs to decide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryContext {
    pub campaign_id: CampaignId,
    pub task_id: TaskId,
    pub task_type: TaskType,
    pub outcome: FailureOutcome,
    /// Number of tasks that directly depend on the blocked task.
    pub dependent_count: usize,
}
