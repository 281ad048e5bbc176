//! Task manifest: the immutable unit of work the planner emits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    campaign::CampaignId,
    error::{ChimeraError, ChimeraResult},
    payload::TaskPayload,
};

/// Globally unique task identifier, generated when the manifest is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of the planner agent that created a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlannerId(pub String);

/// Identity of a worker agent that claims and executes tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerId(pub String);

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed set of task kinds a worker can be asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    ContentGeneration,
    ContentReview,
    SocialPublish,
    AnalyticsFetch,
    TransactionExecute,
}

impl TaskType {
    /// Every variant, in wire order.
    pub const ALL: [TaskType; 5] = [
        TaskType::ContentGeneration,
        TaskType::ContentReview,
        TaskType::SocialPublish,
        TaskType::AnalyticsFetch,
        TaskType::TransactionExecute,
    ];

    /// The wire spelling of this task type.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::ContentGeneration => "content_generation",
            TaskType::ContentReview => "content_review",
            TaskType::SocialPublish => "social_publish",
            TaskType::AnalyticsFetch => "analytics_fetch",
            TaskType::TransactionExecute => "transaction_execute",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheduling priority. `High` is served first among simultaneously ready tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

impl Priority {
    /// Sort key: lower ranks are dispatched first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Normal => 1,
            Priority::Low => 2,
        }
    }
}

/// Smallest accepted `timeout_seconds`.
pub const MIN_TIMEOUT_SECONDS: u32 = 1;
/// Largest accepted `timeout_seconds`.
pub const MAX_TIMEOUT_SECONDS: u32 = 3600;

/// One unit of work. Created once by the planner and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTaskManifest {
    pub task_id: TaskId,
    pub campaign_id: CampaignId,
    pub task_type: TaskType,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "planner_soul_id")]
    pub planner_id: PlannerId,
    #[serde(default)]
    pub priority: Priority,
    pub timeout_seconds: u32,
    /// Task-specific input. Its inner shape is owned by the skill, not the envelope.
    pub payload: Map<String, Value>,
    /// Tasks in the same batch that must succeed before this one may run.
    pub dependencies: Vec<TaskId>,
}

impl AgentTaskManifest {
    /// Create a manifest with a fresh id, `NORMAL` priority, a 300 second
    /// timeout and no dependencies. The task type is taken from the payload.
    pub fn new(
        campaign_id: CampaignId,
        planner_id: PlannerId,
        created_at: DateTime<Utc>,
        payload: TaskPayload,
    ) -> ChimeraResult<Self> {
        let task_type = payload.task_type();
        Ok(Self {
            task_id: TaskId::generate(),
            campaign_id,
            task_type,
            created_at,
            planner_id,
            priority: Priority::Normal,
            timeout_seconds: 300,
            payload: payload.into_object()?,
            dependencies: Vec::new(),
        })
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_timeout(mut self, timeout_seconds: u32) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Record `task_id` as a dependency. Repeated ids are ignored.
    pub fn depends_on(mut self, task_id: &TaskId) -> Self {
        if !self.dependencies.contains(task_id) {
            self.dependencies.push(task_id.clone());
        }
        self
    }

    /// Decode the payload into its typed variant, falling back to `Opaque`.
    pub fn typed_payload(&self) -> TaskPayload {
        TaskPayload::decode(self.task_type, &self.payload)
    }

    /// The wire form of this manifest, as fed to the schema validator.
    pub fn to_value(&self) -> ChimeraResult<Value> {
        serde_json::to_value(self).map_err(|e| ChimeraError::MalformedInput {
            reason: format!("manifest '{}' could not be serialized: {e}", self.task_id),
        })
    }
}
