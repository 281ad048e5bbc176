//! Structured events the orchestrator hands to its telemetry sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    campaign::CampaignId,
    task::{TaskId, WorkerId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryEventKind {
    OrchestratorStarted,
    TaskClaimed,
    TaskCompleted,
    TaskFailed,
    TaskEscalated,
    TaskTimedOut,
    TaskCancelled,
    CampaignAborted,
    OrchestratorStopped,
}

/// One lifecycle event. Emission is best effort and never gates a transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub kind: TelemetryEventKind,
    pub campaign_id: CampaignId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<WorkerId>,
    /// Event-specific fields (confidence, error code, reason, ...).
    pub detail: Value,
    pub timestamp: DateTime<Utc>,
}

impl TelemetryEvent {
    pub fn campaign(
        kind: TelemetryEventKind,
        campaign_id: CampaignId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            campaign_id,
            task_id: None,
            worker_id: None,
            detail: Value::Null,
            timestamp,
        }
    }

    pub fn task(
        kind: TelemetryEventKind,
        campaign_id: CampaignId,
        task_id: TaskId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id: Some(task_id),
            ..Self::campaign(kind, campaign_id, timestamp)
        }
    }

    pub fn with_worker(mut self, worker_id: WorkerId) -> Self {
        self.worker_id = Some(worker_id);
        self
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }
}
