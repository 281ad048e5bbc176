//! Trait seams of the Chimera pipeline.
//!
//! - `ContractValidator`: stateless gate for manifests and results
//! - `DecompositionStrategy`: turns a campaign into a task batch for one intent
//! - `TelemetrySink`: receives lifecycle events, best effort
//! - `RecoveryPolicy`: decides what a blocking outcome does to the campaign
//! - `SkillGateway`: executes a task's capability on behalf of a worker
//! - `Clock`: source of time for timestamps and timeouts
//!
//! The planner and orchestrator are written against these traits only; every
//! implementation lives in its own crate or in the hosting application.

use chrono::{DateTime, Utc};
use serde_json::Value;

use chimera_contracts::{
    campaign::{CampaignId, CampaignManifest},
    error::ChimeraResult,
    recovery::{RecoveryAction, RecoveryContext},
    result::SkillOutcome,
    task::{AgentTaskManifest, PlannerId},
    telemetry::TelemetryEvent,
    validation::ValidationReport,
};

/// Structural and constraint validation of the task contracts.
///
/// Implementations must be pure: no side effects, safe to call concurrently,
/// and they never fail for well-formed JSON. Every violation is reported.
pub trait ContractValidator: Send + Sync {
    fn validate_manifest(&self, manifest: &Value) -> ValidationReport;

    fn validate_result(&self, result: &Value) -> ValidationReport;
}

/// Inputs shared by every decomposition strategy for one planning call.
#[derive(Debug, Clone)]
pub struct PlanningContext<'a> {
    pub campaign_id: &'a CampaignId,
    pub planner_id: &'a PlannerId,
    /// Creation timestamp for the batch.
    pub now: DateTime<Utc>,
}

/// A graph-building function for one campaign intent.
///
/// Strategies only build manifests. Validation, graph checks and atomic
/// publication are the planner's job.
pub trait DecompositionStrategy: Send + Sync {
    fn decompose(
        &self,
        campaign: &CampaignManifest,
        ctx: &PlanningContext<'_>,
    ) -> ChimeraResult<Vec<AgentTaskManifest>>;
}

/// Destination for orchestrator lifecycle events.
///
/// Opened when the orchestrator starts and flushed then closed at shutdown.
/// A failing sink never blocks or rolls back a state transition: the
/// orchestrator logs the error and moves on.
pub trait TelemetrySink: Send + Sync {
    fn open(&self) -> ChimeraResult<()>;

    fn emit(&self, event: &TelemetryEvent) -> ChimeraResult<()>;

    fn flush(&self) -> ChimeraResult<()>;

    fn close(&self) -> ChimeraResult<()>;
}

/// Decides how a `FAILED`, `TIMED_OUT` or `ESCALATED` task affects its campaign.
pub trait RecoveryPolicy: Send + Sync {
    fn decide(&self, ctx: &RecoveryContext) -> ChimeraResult<RecoveryAction>;
}

/// The external capability boundary: one skill per task type.
///
/// The gateway owns the inner payload/output shapes; the core only checks
/// the manifest and result envelopes.
pub trait SkillGateway: Send + Sync {
    fn invoke(&self, task: &AgentTaskManifest) -> ChimeraResult<SkillOutcome>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
