//! Task results: the single terminal outcome a worker submits per task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::{ChimeraError, ChimeraResult},
    payload::TaskOutput,
    task::{TaskId, WorkerId},
};

/// Worker-reported outcome of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultStatus {
    Success,
    Failed,
    Escalated,
}

impl std::fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultStatus::Success => f.write_str("SUCCESS"),
            ResultStatus::Failed => f.write_str("FAILED"),
            ResultStatus::Escalated => f.write_str("ESCALATED"),
        }
    }
}

/// Why a task did not succeed. Present whenever the status is not `SUCCESS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskError {
    pub code: String,
    pub message: String,
}

impl TaskError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// The terminal record a worker submits for a task it claimed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTaskResult {
    pub task_id: TaskId,
    #[serde(rename = "worker_soul_id")]
    pub worker_id: WorkerId,
    pub status: ResultStatus,
    pub completed_at: DateTime<Utc>,
    /// Worker's confidence in the result, recorded on every path.
    pub confidence: f64,
    pub output: Map<String, Value>,
    /// Evidence bundle for judge review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TaskError>,
}

impl AgentTaskResult {
    pub fn success(
        task_id: TaskId,
        worker_id: WorkerId,
        completed_at: DateTime<Utc>,
        confidence: f64,
        output: TaskOutput,
    ) -> ChimeraResult<Self> {
        Ok(Self {
            task_id,
            worker_id,
            status: ResultStatus::Success,
            completed_at,
            confidence,
            output: output.into_object()?,
            proof: None,
            error: None,
        })
    }

    /// A `FAILED` result with an empty output object.
    pub fn failed(
        task_id: TaskId,
        worker_id: WorkerId,
        completed_at: DateTime<Utc>,
        confidence: f64,
        error: TaskError,
    ) -> Self {
        Self {
            task_id,
            worker_id,
            status: ResultStatus::Failed,
            completed_at,
            confidence,
            output: Map::new(),
            proof: None,
            error: Some(error),
        }
    }

    /// An `ESCALATED` result. The output is kept so the reviewer can inspect it.
    pub fn escalated(
        task_id: TaskId,
        worker_id: WorkerId,
        completed_at: DateTime<Utc>,
        confidence: f64,
        output: TaskOutput,
        error: TaskError,
    ) -> ChimeraResult<Self> {
        Ok(Self {
            task_id,
            worker_id,
            status: ResultStatus::Escalated,
            completed_at,
            confidence,
            output: output.into_object()?,
            proof: None,
            error: Some(error),
        })
    }

    pub fn with_proof(mut self, proof: Map<String, Value>) -> Self {
        self.proof = Some(proof);
        self
    }

    /// The wire form of this result, as fed to the schema validator.
    pub fn to_value(&self) -> ChimeraResult<Value> {
        serde_json::to_value(self).map_err(|e| ChimeraError::MalformedInput {
            reason: format!("result for '{}' could not be serialized: {e}", self.task_id),
        })
    }
}

/// What a skill capability hands back to the worker that invoked it.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillOutcome {
    pub output: TaskOutput,
    pub confidence: f64,
    pub proof: Option<Map<String, Value>>,
}

impl SkillOutcome {
    pub fn new(output: TaskOutput, confidence: f64) -> Self {
        Self {
            output,
            confidence,
            proof: None,
        }
    }
}
