//! Typed task payloads and outputs, keyed by task type.
//!
//! The manifest and result envelopes carry payloads and outputs as plain JSON
//! objects. These unions give each task type its own shape while keeping an
//! `Opaque` fallback for objects that do not match, so new fields or
//! experimental shapes still flow through the pipeline.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::{ChimeraError, ChimeraResult},
    task::{TaskId, TaskType},
};

// ── Payloads ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsFetchPayload {
    pub platform: String,
    pub category: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentGenerationPayload {
    pub prompt: String,
    pub content_type: String,
    /// Tasks whose outputs the generator should read as context.
    #[serde(default)]
    pub context_ids: Vec<TaskId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentReviewPayload {
    pub content_task_id: TaskId,
    #[serde(default)]
    pub guidelines: Map<String, Value>,
}

/// Audit trail linking a published post back to its campaign and generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub campaign_id: String,
    pub generator_task_id: TaskId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPublishPayload {
    pub platform: String,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPayload {
    pub amount_usd: f64,
    pub memo: String,
}

/// Task input, one variant per task type.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskPayload {
    AnalyticsFetch(AnalyticsFetchPayload),
    ContentGeneration(ContentGenerationPayload),
    ContentReview(ContentReviewPayload),
    SocialPublish(SocialPublishPayload),
    TransactionExecute(TransactionPayload),
    /// Any object that does not match the typed shape for its task type.
    Opaque {
        task_type: TaskType,
        body: Map<String, Value>,
    },
}

impl TaskPayload {
    pub fn task_type(&self) -> TaskType {
        match self {
            TaskPayload::AnalyticsFetch(_) => TaskType::AnalyticsFetch,
            TaskPayload::ContentGeneration(_) => TaskType::ContentGeneration,
            TaskPayload::ContentReview(_) => TaskType::ContentReview,
            TaskPayload::SocialPublish(_) => TaskType::SocialPublish,
            TaskPayload::TransactionExecute(_) => TaskType::TransactionExecute,
            TaskPayload::Opaque { task_type, .. } => *task_type,
        }
    }

    /// Decode `body` as the typed payload for `task_type`.
    pub fn decode(task_type: TaskType, body: &Map<String, Value>) -> Self {
        let typed = match task_type {
            TaskType::AnalyticsFetch => decode_object(body).map(TaskPayload::AnalyticsFetch),
            TaskType::ContentGeneration => {
                decode_object(body).map(TaskPayload::ContentGeneration)
            }
            TaskType::ContentReview => decode_object(body).map(TaskPayload::ContentReview),
            TaskType::SocialPublish => decode_object(body).map(TaskPayload::SocialPublish),
            TaskType::TransactionExecute => {
                decode_object(body).map(TaskPayload::TransactionExecute)
            }
        };
        typed.unwrap_or_else(|| TaskPayload::Opaque {
            task_type,
            body: body.clone(),
        })
    }

    /// The JSON object carried in the manifest envelope.
    pub fn into_object(self) -> ChimeraResult<Map<String, Value>> {
        match self {
            TaskPayload::AnalyticsFetch(p) => encode_object(&p),
            TaskPayload::ContentGeneration(p) => encode_object(&p),
            TaskPayload::ContentReview(p) => encode_object(&p),
            TaskPayload::SocialPublish(p) => encode_object(&p),
            TaskPayload::TransactionExecute(p) => encode_object(&p),
            TaskPayload::Opaque { body, .. } => Ok(body),
        }
    }
}

// ── Outputs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub topic: String,
    pub volume: u64,
    pub sentiment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub platform: String,
    pub trends: Vec<Trend>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub content: String,
    pub confidence: f64,
    #[serde(default)]
    pub citations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewVerdict {
    pub is_valid: bool,
    pub confidence: f64,
    #[serde(default)]
    pub violations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub post_id: String,
    pub post_url: String,
    pub receipt_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    pub balance: f64,
    pub currency: String,
}

/// Task output, one variant per task type.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutput {
    Trends(TrendReport),
    GeneratedContent(GeneratedContent),
    ReviewVerdict(ReviewVerdict),
    PublishReceipt(PublishReceipt),
    WalletBalance(WalletBalance),
    Opaque(Map<String, Value>),
}

impl TaskOutput {
    /// Decode `body` as the typed output produced by `task_type`.
    pub fn decode(task_type: TaskType, body: &Map<String, Value>) -> Self {
        let typed = match task_type {
            TaskType::AnalyticsFetch => decode_object(body).map(TaskOutput::Trends),
            TaskType::ContentGeneration => decode_object(body).map(TaskOutput::GeneratedContent),
            TaskType::ContentReview => decode_object(body).map(TaskOutput::ReviewVerdict),
            TaskType::SocialPublish => decode_object(body).map(TaskOutput::PublishReceipt),
            TaskType::TransactionExecute => decode_object(body).map(TaskOutput::WalletBalance),
        };
        typed.unwrap_or_else(|| TaskOutput::Opaque(body.clone()))
    }

    pub fn into_object(self) -> ChimeraResult<Map<String, Value>> {
        match self {
            TaskOutput::Trends(o) => encode_object(&o),
            TaskOutput::GeneratedContent(o) => encode_object(&o),
            TaskOutput::ReviewVerdict(o) => encode_object(&o),
            TaskOutput::PublishReceipt(o) => encode_object(&o),
            TaskOutput::WalletBalance(o) => encode_object(&o),
            TaskOutput::Opaque(body) => Ok(body),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn decode_object<T: DeserializeOwned>(body: &Map<String, Value>) -> Option<T> {
    serde_json::from_value(Value::Object(body.clone())).ok()
}

fn encode_object<T: Serialize>(value: &T) -> ChimeraResult<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ChimeraError::MalformedInput {
            reason: format!("expected a JSON object, got {other}"),
        }),
        Err(e) => Err(ChimeraError::MalformedInput {
            reason: format!("could not encode payload: {e}"),
        }),
    }
}
