//! TOML-driven recovery policy.
//!
//! Evaluation:
//!
//! 1. Iterate rules in declaration order.
//! 2. The first rule matching the task type, outcome and dependent count
//!    produces the decision.
//! 3. If nothing matched, `Block`: dependents stay PENDING until someone
//!    intervenes.

use std::path::Path;

use tracing::{debug, info};

use chimera_contracts::{
    error::{ChimeraError, ChimeraResult},
    recovery::{RecoveryAction, RecoveryContext},
};
use chimera_core::traits::RecoveryPolicy;

use crate::rule::{RecoveryConfig, RuleAction};

const OUTCOMES: [&str; 3] = ["failed", "timed-out", "escalated"];

/// A `RecoveryPolicy` that reads rules from a TOML document.
#[derive(Debug, Default)]
pub struct TomlRecoveryPolicy {
    config: RecoveryConfig,
}

impl TomlRecoveryPolicy {
    /// Parse `s` as TOML.
    ///
    /// Returns `ConfigError` if the TOML is malformed, does not match
    /// `RecoveryConfig`, or names an outcome that does not exist.
    pub fn from_toml_str(s: &str) -> ChimeraResult<Self> {
        let config: RecoveryConfig = toml::from_str(s).map_err(|e| ChimeraError::ConfigError {
            reason: format!("failed to parse recovery policy TOML: {e}"),
        })?;

        for rule in &config.rules {
            if rule.outcome != "*" && !OUTCOMES.contains(&rule.outcome.as_str()) {
                return Err(ChimeraError::ConfigError {
                    reason: format!(
                        "rule '{}' names unknown outcome '{}' (expected one of {:?} or \"*\")",
                        rule.id, rule.outcome, OUTCOMES
                    ),
                });
            }
        }
        Ok(Self { config })
    }

    pub fn from_file(path: &Path) -> ChimeraResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ChimeraError::ConfigError {
            reason: format!("failed to read recovery policy '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn rule_count(&self) -> usize {
        self.config.rules.len()
    }
}

impl RecoveryPolicy for TomlRecoveryPolicy {
    fn decide(&self, ctx: &RecoveryContext) -> ChimeraResult<RecoveryAction> {
        let task_type = ctx.task_type.as_str();
        let outcome = ctx.outcome.to_string();

        for rule in &self.config.rules {
            if !rule.matches(task_type, &outcome, ctx.dependent_count) {
                continue;
            }
            debug!(rule_id = %rule.id, task_id = %ctx.task_id, task_type, %outcome, "recovery rule matched");

            let reason = || {
                rule.reason
                    .clone()
                    .unwrap_or_else(|| format!("{task_type} {outcome} (rule '{}')", rule.id))
            };
            let action = match rule.action {
                RuleAction::Block => RecoveryAction::Block,
                RuleAction::Abort => RecoveryAction::Abort { reason: reason() },
                RuleAction::Replan => RecoveryAction::Replan { reason: reason() },
            };
            return Ok(action);
        }

        info!(
            campaign_id = %ctx.campaign_id,
            task_id = %ctx.task_id,
            task_type,
            %outcome,
            "no recovery rule matched; blocking dependents"
        );
        Ok(RecoveryAction::Block)
    }
}
