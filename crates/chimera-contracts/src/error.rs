//! Error taxonomy for the Chimera planning and orchestration pipeline.
//!
//! Structural and contract violations are always errors. Business outcomes
//! (`FAILED`, `ESCALATED`, `TIMED_OUT`) are not: they are terminal task
//! states and never appear here.

use thiserror::Error;

/// The unified error type for the Chimera crates.
#[derive(Debug, Error)]
pub enum ChimeraError {
    /// A manifest or result violated its schema contract.
    ///
    /// Carries the full, ordered list of field-level errors.
    #[error("schema validation failed: {}", errors.join("; "))]
    Validation { errors: Vec<String> },

    /// The campaign manifest is missing a structural precondition.
    #[error("invalid campaign: {reason}")]
    InvalidCampaign { reason: String },

    /// The planner could not produce a valid batch. Nothing was published.
    #[error("decomposition failed: {}", failures.join("; "))]
    Decomposition { failures: Vec<String> },

    /// The dependency edges of a batch do not admit a topological order.
    #[error("dependency cycle detected at task '{task_id}'")]
    Cycle { task_id: String },

    /// A task depends on an identifier that is not part of its batch.
    #[error("task '{task_id}' depends on '{missing}' which is not in the batch")]
    DanglingDependency { task_id: String, missing: String },

    /// Two manifests in one batch share a task identifier.
    #[error("task '{task_id}' appears more than once in the batch")]
    DuplicateTask { task_id: String },

    /// A second result with a different status arrived for a terminal task.
    #[error("task '{task_id}' already recorded {recorded}; conflicting {submitted} rejected")]
    DuplicateResult {
        task_id: String,
        recorded: String,
        submitted: String,
    },

    /// A result or claim referenced a task the orchestrator does not know.
    #[error("unknown task '{task_id}'")]
    UnknownTask { task_id: String },

    /// A lifecycle transition was requested from a state that does not allow it.
    #[error("task '{task_id}' cannot move from {from} to {to}")]
    InvalidTransition {
        task_id: String,
        from: String,
        to: String,
    },

    /// Input at an intake boundary could not be parsed as a structured object.
    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },

    /// A skill capability rejected its input or failed to execute.
    #[error("skill '{skill}' failed: {reason}")]
    Skill { skill: String, reason: String },

    /// The telemetry sink could not accept an event.
    #[error("telemetry error: {reason}")]
    Telemetry { reason: String },

    /// Shared orchestration state could not be accessed (poisoned lock).
    #[error("orchestration state unavailable: {reason}")]
    StateUnavailable { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

/// Convenience alias used throughout the Chimera crates.
pub type ChimeraResult<T> = Result<T, ChimeraError>;
