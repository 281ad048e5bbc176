//! Recovery rule types and configuration schema.
//!
//! A `RecoveryConfig` is deserialized from TOML and holds an ordered list of
//! `RecoveryRule`s. Rules are evaluated in declaration order and the first
//! match wins. If no rule matches, dependents stay blocked.

use serde::{Deserialize, Serialize};

/// What a matching rule tells the orchestrator to do, as written in TOML:
///
/// ```toml
/// action = "block"
/// action = "abort"
/// action = "replan"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleAction {
    Block,
    Abort,
    Replan,
}

/// A single recovery rule loaded from TOML.
///
/// `task_type` and `outcome` accept the wildcard `"*"`. Task types use their
/// wire spelling (`analytics_fetch`); outcomes are `failed`, `timed-out` or
/// `escalated`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryRule {
    /// Stable identifier, echoed in logs and generated reasons.
    pub id: String,

    #[serde(default)]
    pub description: String,

    pub task_type: String,

    pub outcome: String,

    /// Only match when the blocked task has at least this many direct
    /// dependents.
    #[serde(default)]
    pub min_dependents: usize,

    pub action: RuleAction,

    /// Recorded on the abort or replan decision.
    pub reason: Option<String>,
}

impl RecoveryRule {
    /// `"*"` matches anything; otherwise both fields must match exactly.
    pub fn matches(&self, task_type: &str, outcome: &str, dependents: usize) -> bool {
        let type_matches = self.task_type == "*" || self.task_type == task_type;
        let outcome_matches = self.outcome == "*" || self.outcome == outcome;
        type_matches && outcome_matches && dependents >= self.min_dependents
    }
}

/// Top-level structure of a recovery policy file.
///
/// ```toml
/// [[rules]]
/// id = "abort-on-failed-fetch"
/// description = "Without trend data nothing downstream is meaningful"
/// task_type = "analytics_fetch"
/// outcome = "failed"
/// action = "abort"
/// reason = "trend data unavailable"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecoveryConfig {
    #[serde(default)]
    pub rules: Vec<RecoveryRule>,
}
